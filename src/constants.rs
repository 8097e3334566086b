/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Number of states estimated by the vector tracking loop:
/// position (3), velocity (3), clock offset and clock drift.
pub const STATE_SIZE: usize = 8;

/// Minimal number of satellites for the state to be observable
pub const MIN_SATELLITES: usize = 4;

/// Index of the clock offset in the state vector
pub(crate) const CLOCK_BIAS_INDEX: usize = 6;

/// Index of the clock drift in the state vector
pub(crate) const CLOCK_DRIFT_INDEX: usize = 7;
