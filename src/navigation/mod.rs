use nalgebra::{Dyn, OMatrix, OVector, U8};

mod dop;
mod geometry;
mod input;
mod kalman;
mod output;
mod state;

pub use dop::DilutionOfPrecision;
pub use geometry::{Linearization, MeasurementModel};
pub use input::{EpochInput, Prior, SatelliteMeasurement};
pub use kalman::KfEstimate;
pub use output::{EpochOutput, FilteredMeasurement, Mode};
pub use state::State;

pub(crate) use kalman::Kalman;

/// State vector, or any vector of the state space (8)
pub type Vector8 = OVector<f64, U8>;

/// Square matrix of the state space (8x8)
pub type Matrix8 = OMatrix<f64, U8, U8>;

/// H observation matrix (2N x 8)
pub type ObservationMatrix = OMatrix<f64, Dyn, U8>;

/// K gain matrix (8 x 2N)
pub type Gain = OMatrix<f64, U8, Dyn>;
