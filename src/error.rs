use thiserror::Error;

use crate::cfg::Error as ConfigError;

#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// [Config] rejected at configuration time
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The state vector is not observable with less than 4 satellites.
    #[error("not enough satellites: {0} (need at least 4)")]
    NotEnoughSatellites(usize),

    /// Satellite to receiver range is (nearly) zero: the line of sight
    /// is undefined.
    #[error("degenerate geometry: satellite #{index} range is {range_m:.3E}m")]
    DegenerateGeometry { index: usize, range_m: f64 },

    /// Innovation covariance is singular or not positive definite.
    /// Invalid orbital states or bad signal data may cause the algebric calculations
    /// to wind up here.
    #[error("failed to invert matrix")]
    MatrixInversion,

    /// Filter converged to non finite state
    #[error("filter converged to a non finite state")]
    NonFiniteState,

    /// Covariance is not finite or has negative eigenvalues
    #[error("filter covariance is invalid")]
    InvalidCovariance,

    /// Process noise variances must be finite and positive (or null)
    #[error("invalid process noise variance(s)")]
    InvalidProcessNoise,

    /// Warmup requires a finite prior solution
    #[error("invalid prior solution")]
    InvalidPrior,

    /// Steady state requires the previous epoch estimate to be provided
    #[error("missing or invalid persisted state")]
    StaleState,

    /// The sample counter must strictly increase from one epoch to the next
    #[error("sample counter regression: {current} <= {previous}")]
    NonMonotonicSampleCounter { previous: u64, current: u64 },

    #[error("rejected solution: GDOP limit exceeded ({0:.3})")]
    MaxGdopExceeded(f64),
}

impl Error {
    /// True if this [Error] is caused by a numerical fault of the filter
    /// (as opposed to invalid input or configuration).
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            Self::MatrixInversion | Self::NonFiniteState | Self::InvalidCovariance
        )
    }
}
