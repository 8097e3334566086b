use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{carrier::Carrier, constants::SPEED_OF_LIGHT_M_S, prelude::Duration};

mod command;
pub use command::CommandOpts;

/// Configuration Error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("sampling period must be positive (got {0})")]
    InvalidSamplingPeriod(Duration),
    #[error("{0} must be finite and strictly positive")]
    NonPositive(&'static str),
    #[error("warmup must last at least one epoch")]
    NullWarmup,
}

/// Pseudo range rate residual formulation
#[derive(Default, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RateResidual {
    /// The estimated clock drift (in m.s⁻¹) is added to the measured
    /// pseudo range rate before the predicted rate is subtracted.
    #[default]
    DriftAided,
    /// Measured pseudo range rate minus predicted pseudo range rate.
    /// Clock drift is then observed through the Doppler measurements.
    Predicted,
}

const fn default_sampling_period() -> Duration {
    Duration::from_parts(0, 100_000_000)
}

const fn default_speed_of_light() -> f64 {
    SPEED_OF_LIGHT_M_S
}

const fn default_warmup_epochs() -> u64 {
    3000
}

const fn default_pseudo_range_variance() -> f64 {
    20.0
}

const fn default_pseudo_range_rate_variance() -> f64 {
    10.0
}

const fn default_initial_covariance_scale() -> f64 {
    1.0
}

const fn default_min_range() -> f64 {
    1.0
}

/// Vector tracking [Config]uration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Time step between two consecutive epochs, used by
    /// the transition model.
    #[cfg_attr(feature = "serde", serde(default = "default_sampling_period"))]
    pub sampling_period: Duration,
    /// Speed of light (m.s⁻¹) used to convert clock states
    /// to the measurement domain.
    #[cfg_attr(feature = "serde", serde(default = "default_speed_of_light"))]
    pub speed_of_light_m_s: f64,
    /// Tracked [Carrier], defines the wavelength of the Doppler measurements.
    #[cfg_attr(feature = "serde", serde(default))]
    pub carrier: Carrier,
    /// Number of epochs during which the filter is reset to the
    /// external a priori solution.
    #[cfg_attr(feature = "serde", serde(default = "default_warmup_epochs"))]
    pub warmup_epochs: u64,
    /// Pseudo range measurement variance (m²)
    #[cfg_attr(feature = "serde", serde(default = "default_pseudo_range_variance"))]
    pub pseudo_range_variance_m2: f64,
    /// Pseudo range rate measurement variance (m².s⁻²)
    #[cfg_attr(
        feature = "serde",
        serde(default = "default_pseudo_range_rate_variance")
    )]
    pub pseudo_range_rate_variance_m2_s2: f64,
    /// Scaling of the identity matrix used as initial covariance,
    /// when no previous estimate exists.
    #[cfg_attr(feature = "serde", serde(default = "default_initial_covariance_scale"))]
    pub initial_covariance_scale: f64,
    /// Satellites closer than this (m) are considered degenerate.
    #[cfg_attr(feature = "serde", serde(default = "default_min_range"))]
    pub min_range_m: f64,
    /// Possible GDOP threshold above which the epoch is rejected
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_gdop: Option<f64>,
    /// [RateResidual] formulation
    #[cfg_attr(feature = "serde", serde(default))]
    pub rate_residual: RateResidual,
    /// Tracking commands customization
    #[cfg_attr(feature = "serde", serde(default))]
    pub commands: CommandOpts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sampling_period: default_sampling_period(),
            speed_of_light_m_s: default_speed_of_light(),
            carrier: Carrier::default(),
            warmup_epochs: default_warmup_epochs(),
            pseudo_range_variance_m2: default_pseudo_range_variance(),
            pseudo_range_rate_variance_m2_s2: default_pseudo_range_rate_variance(),
            initial_covariance_scale: default_initial_covariance_scale(),
            min_range_m: default_min_range(),
            max_gdop: None,
            rate_residual: RateResidual::default(),
            commands: CommandOpts::default(),
        }
    }
}

fn strictly_positive(value: f64, name: &'static str) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::NonPositive(name))
    }
}

impl Config {
    /// Returns a copy of [Config] with updated sampling period
    pub fn with_sampling_period(&self, sampling_period: Duration) -> Self {
        let mut s = self.clone();
        s.sampling_period = sampling_period;
        s
    }

    /// Returns a copy of [Config] with updated tracked [Carrier]
    pub fn with_carrier(&self, carrier: Carrier) -> Self {
        let mut s = self.clone();
        s.carrier = carrier;
        s
    }

    /// Returns a copy of [Config] with updated warmup duration (in epochs)
    pub fn with_warmup_epochs(&self, warmup_epochs: u64) -> Self {
        let mut s = self.clone();
        s.warmup_epochs = warmup_epochs;
        s
    }

    /// Returns a copy of [Config] with updated measurement variances.
    /// ## Input
    /// - pseudo_range_m2: pseudo range variance (m²)
    /// - pseudo_range_rate_m2_s2: pseudo range rate variance (m².s⁻²)
    pub fn with_measurement_variances(
        &self,
        pseudo_range_m2: f64,
        pseudo_range_rate_m2_s2: f64,
    ) -> Self {
        let mut s = self.clone();
        s.pseudo_range_variance_m2 = pseudo_range_m2;
        s.pseudo_range_rate_variance_m2_s2 = pseudo_range_rate_m2_s2;
        s
    }

    /// Returns a copy of [Config] with updated initial covariance scaling
    pub fn with_initial_covariance_scale(&self, scale: f64) -> Self {
        let mut s = self.clone();
        s.initial_covariance_scale = scale;
        s
    }

    /// Returns a copy of [Config] with updated [RateResidual] formulation
    pub fn with_rate_residual(&self, rate_residual: RateResidual) -> Self {
        let mut s = self.clone();
        s.rate_residual = rate_residual;
        s
    }

    /// Returns a copy of [Config] with GDOP rejection threshold
    pub fn with_max_gdop(&self, max_gdop: f64) -> Self {
        let mut s = self.clone();
        s.max_gdop = Some(max_gdop);
        s
    }

    /// Verifies this [Config] is physically meaningful.
    pub fn validate(&self) -> Result<(), Error> {
        if self.sampling_period <= Duration::ZERO {
            return Err(Error::InvalidSamplingPeriod(self.sampling_period));
        }

        strictly_positive(self.speed_of_light_m_s, "speed_of_light_m_s")?;
        strictly_positive(self.pseudo_range_variance_m2, "pseudo_range_variance_m2")?;
        strictly_positive(
            self.pseudo_range_rate_variance_m2_s2,
            "pseudo_range_rate_variance_m2_s2",
        )?;
        strictly_positive(self.initial_covariance_scale, "initial_covariance_scale")?;
        strictly_positive(self.min_range_m, "min_range_m")?;

        if let Some(max_gdop) = self.max_gdop {
            strictly_positive(max_gdop, "max_gdop")?;
        }

        if self.warmup_epochs == 0 {
            return Err(Error::NullWarmup);
        }

        Ok(())
    }

    /// Time step in seconds
    pub(crate) fn dt_s(&self) -> f64 {
        self.sampling_period.to_seconds()
    }

    /// Wavelength of the tracked [Carrier], in meters
    pub(crate) fn wavelength_m(&self) -> f64 {
        self.carrier.wavelength(self.speed_of_light_m_s)
    }
}
