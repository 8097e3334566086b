#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod carrier;
mod cfg;
mod engine;
mod error;
mod navigation;
mod tracking;

pub mod constants;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::carrier::Carrier;
    pub use crate::cfg::{CommandOpts, Config, Error as ConfigError, RateResidual};
    pub use crate::engine::Engine;
    pub use crate::navigation::{
        DilutionOfPrecision, EpochInput, EpochOutput, FilteredMeasurement, Gain, KfEstimate,
        Linearization, Matrix8, MeasurementModel, Mode, ObservationMatrix, Prior,
        SatelliteMeasurement, State, Vector8,
    };
    pub use crate::tracking::{
        CommandContext, CommandGenerator, DopplerAiding, NullCommands, TrackingCmd,
    };
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::{Vector3, Vector6};
}

// pub export
pub use error::Error;
