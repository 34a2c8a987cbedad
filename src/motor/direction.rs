//! Rotation direction.

/// Direction of shaft rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise (step count increases).
    #[default]
    Clockwise,
    /// Counter-clockwise (step count decreases).
    CounterClockwise,
}

impl Direction {
    /// Direction from a clockwise flag.
    #[inline]
    pub fn from_clockwise(clockwise: bool) -> Self {
        if clockwise {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }

    /// Direction the background loop travels to drain a signed target:
    /// positive targets run counter-clockwise, negative ones clockwise.
    #[inline]
    pub fn for_target(target_steps: i64) -> Self {
        if target_steps > 0 {
            Direction::CounterClockwise
        } else {
            Direction::Clockwise
        }
    }

    /// Get the step count increment.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }

    /// Whether this is clockwise.
    #[inline]
    pub fn is_clockwise(self) -> bool {
        self == Direction::Clockwise
    }

    /// DIR line level: high for clockwise unless the wiring is inverted.
    #[inline]
    pub fn dir_level(self, inverted: bool) -> bool {
        self.is_clockwise() != inverted
    }
}
