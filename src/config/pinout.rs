//! GPIO line assignment for one driver.

use serde::Deserialize;

use crate::error::PinRole;

/// GPIO lines wired to a step/dir driver (BCM numbering on a Raspberry Pi).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PinoutConfig {
    /// STEP input of the driver.
    pub step: u8,

    /// DIR input of the driver.
    pub dir: u8,

    /// Active-low sleep input.
    #[serde(alias = "nsleep")]
    pub sleep: u8,

    /// First microstep select line.
    pub ms1: u8,

    /// Second microstep select line.
    pub ms2: u8,

    /// Limit switch pulled up and closing to ground (linear axes only).
    #[serde(default)]
    pub homing_switch: Option<u8>,
}

impl PinoutConfig {
    /// Role/line pairs for every assigned pin.
    pub fn assignments(&self) -> impl Iterator<Item = (PinRole, u8)> + '_ {
        [
            (PinRole::Step, Some(self.step)),
            (PinRole::Dir, Some(self.dir)),
            (PinRole::Sleep, Some(self.sleep)),
            (PinRole::Ms1, Some(self.ms1)),
            (PinRole::Ms2, Some(self.ms2)),
            (PinRole::HomingSwitch, self.homing_switch),
        ]
        .into_iter()
        .filter_map(|(role, line)| line.map(|line| (role, line)))
    }

    /// First line assigned to more than one role, if any.
    pub fn duplicate(&self) -> Option<u8> {
        self.assignments().enumerate().find_map(|(i, (_, line))| {
            self.assignments()
                .skip(i + 1)
                .any(|(_, other)| other == line)
                .then_some(line)
        })
    }
}
