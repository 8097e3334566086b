#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

/// Tracking command options
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommandOpts {
    /// Allow the carrier NCO of each channel to be driven by the loop
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub carrier_nco: bool,
    /// Allow the code NCO of each channel to be driven by the loop
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub code_nco: bool,
}

impl Default for CommandOpts {
    fn default() -> Self {
        Self {
            carrier_nco: default_true(),
            code_nco: default_true(),
        }
    }
}

impl CommandOpts {
    /// Open loop [CommandOpts]: commands are still emitted but
    /// channels should not apply them.
    pub fn open_loop() -> Self {
        Self {
            carrier_nco: false,
            code_nco: false,
        }
    }
}
