//! Driver pin bundle.

/// Output lines of a step/dir driver with two microstep select lines.
#[derive(Debug)]
pub struct DriverPins<P> {
    /// STEP pulse line.
    pub step: P,
    /// DIR line.
    pub dir: P,
    /// Active-low sleep line; held high while the motor exists.
    pub sleep: P,
    /// First microstep select line.
    pub ms1: P,
    /// Second microstep select line.
    pub ms2: P,
}
