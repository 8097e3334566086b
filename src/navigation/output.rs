use nalgebra::{DVector, Vector3, Vector6};

use crate::{
    navigation::{DilutionOfPrecision, Gain, KfEstimate, Vector8},
    prelude::{Epoch, SV},
};

/// Filter operating [Mode]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Filter state is reset to the external solution on every epoch
    #[default]
    Warmup,
    /// Filter state propagates from one epoch to the next
    Steady,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Warmup => write!(f, "warmup"),
            Self::Steady => write!(f, "steady"),
        }
    }
}

/// Per satellite filtered measurements, obtained by linearizing
/// the model around the corrected state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilteredMeasurement {
    /// Satellite vehicle
    pub sv: SV,
    /// Line of sight unit vector (satellite to receiver)
    pub line_of_sight: Vector3<f64>,
    /// Filtered pseudo range (m)
    pub pseudo_range_m: f64,
    /// Filtered pseudo range rate (m.s⁻¹)
    pub pseudo_range_rate_m_s: f64,
    /// Filtered Doppler shift (Hz)
    pub doppler_hz: f64,
    /// Pseudo range rate predicted prior to correction (m.s⁻¹)
    pub predicted_pseudo_range_rate_m_s: f64,
    /// Post fit pseudo range residual (m)
    pub pseudo_range_residual_m: f64,
    /// Post fit pseudo range rate residual (m.s⁻¹)
    pub pseudo_range_rate_residual_m_s: f64,
}

/// [EpochOutput] of the vector tracking loop
#[derive(Debug, Clone)]
pub struct EpochOutput {
    /// Sampling [Epoch]
    pub t: Epoch,
    /// Sample counter this output corresponds to
    pub sample_counter: u64,
    /// [Mode] used to resolve this epoch
    pub mode: Mode,
    /// Position (m) and velocity (m.s⁻¹), ECEF
    pub pvt: Vector6<f64>,
    /// New [KfEstimate], to be persisted by the caller
    /// and proposed on the next epoch.
    pub estimate: KfEstimate,
    /// Predicted [KfEstimate], prior to the measurement update
    pub prediction: KfEstimate,
    /// Innovation (measured - predicted), pseudo ranges first (2N)
    pub innovation: DVector<f64>,
    /// K gain
    pub gain: Gain,
    /// State correction dx = K * y, in measurement domain
    pub correction: Vector8,
    /// Per satellite [FilteredMeasurement]s, in input order
    pub filtered: Vec<FilteredMeasurement>,
    /// [DilutionOfPrecision] of the current geometry
    pub dop: DilutionOfPrecision,
}

impl EpochOutput {
    /// Number of satellites that contributed
    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    /// True if no satellite contributed
    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    /// Returns estimated clock (offset, drift) in seconds and s.s⁻¹.
    /// The clock is not part of the PVT vector.
    pub fn clock_profile_s(&self) -> (f64, f64) {
        self.estimate.state.clock_profile_s()
    }
}
