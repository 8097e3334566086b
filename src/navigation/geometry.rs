use log::trace;
use nalgebra::{DMatrix, DVector, Vector3};

use crate::{
    cfg::{Config, RateResidual},
    constants::{CLOCK_BIAS_INDEX, CLOCK_DRIFT_INDEX},
    error::Error,
    navigation::{ObservationMatrix, SatelliteMeasurement, State},
};

/// [Linearization] of the measurement model around one [State]
#[derive(Debug, Clone, PartialEq)]
pub struct Linearization {
    /// Line of sight unit vectors, pointing from each satellite to the receiver
    pub line_of_sight: Vec<Vector3<f64>>,
    /// Geometric ranges (m)
    pub range_m: DVector<f64>,
    /// Predicted pseudo ranges (m)
    pub pseudo_range_m: DVector<f64>,
    /// Predicted pseudo range rates (m.s⁻¹)
    pub pseudo_range_rate_m_s: DVector<f64>,
    /// H observation matrix: pseudo range rows first, then pseudo range rate rows.
    pub h: ObservationMatrix,
}

impl Linearization {
    /// Number of satellites
    pub fn len(&self) -> usize {
        self.line_of_sight.len()
    }

    /// True if no satellites were linearized
    pub fn is_empty(&self) -> bool {
        self.line_of_sight.is_empty()
    }
}

/// Pseudo range and pseudo range rate [MeasurementModel].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementModel {
    speed_of_light_m_s: f64,
    wavelength_m: f64,
    min_range_m: f64,
    pseudo_range_variance_m2: f64,
    pseudo_range_rate_variance_m2_s2: f64,
    rate_residual: RateResidual,
}

impl MeasurementModel {
    /// Builds the [MeasurementModel] from validated [Config]
    pub fn new(cfg: &Config) -> Self {
        Self {
            speed_of_light_m_s: cfg.speed_of_light_m_s,
            wavelength_m: cfg.wavelength_m(),
            min_range_m: cfg.min_range_m,
            pseudo_range_variance_m2: cfg.pseudo_range_variance_m2,
            pseudo_range_rate_variance_m2_s2: cfg.pseudo_range_rate_variance_m2_s2,
            rate_residual: cfg.rate_residual,
        }
    }

    /// Carrier wavelength (m)
    pub fn wavelength_m(&self) -> f64 {
        self.wavelength_m
    }

    /// Linearizes the pseudo range and pseudo range rate equations around
    /// given [State]. This is used both on the predicted state (prior to
    /// correction) and on the corrected state (filtered residuals).
    pub fn linearize(
        &self,
        state: &State,
        satellites: &[SatelliteMeasurement],
    ) -> Result<Linearization, Error> {
        let n = satellites.len();

        let rx_pos_m = state.position_ecef_m();
        let rx_vel_m_s = state.velocity_ecef_m_s();
        let (clock_bias_m, clock_drift_m_s) = state.clock_profile_m(self.speed_of_light_m_s);

        let mut line_of_sight = Vec::with_capacity(n);
        let mut range_m = DVector::<f64>::zeros(n);
        let mut pseudo_range_m = DVector::<f64>::zeros(n);
        let mut pseudo_range_rate_m_s = DVector::<f64>::zeros(n);
        let mut h = ObservationMatrix::zeros(2 * n);

        for (i, sat) in satellites.iter().enumerate() {
            let delta = rx_pos_m - sat.position_ecef_m;
            let d_i = delta.norm();

            if d_i.is_nan() || d_i < self.min_range_m {
                return Err(Error::DegenerateGeometry {
                    index: i,
                    range_m: d_i,
                });
            }

            let a_i = delta / d_i;

            range_m[i] = d_i;
            pseudo_range_m[i] = d_i + clock_bias_m;
            pseudo_range_rate_m_s[i] =
                (rx_vel_m_s - sat.velocity_ecef_m_s).dot(&a_i) + clock_drift_m_s;

            for j in 0..3 {
                h[(i, j)] = a_i[j];
                h[(n + i, 3 + j)] = a_i[j];
            }

            h[(i, CLOCK_BIAS_INDEX)] = 1.0;
            h[(n + i, CLOCK_DRIFT_INDEX)] = 1.0;

            line_of_sight.push(a_i);
        }

        trace!("H: {}", h);

        Ok(Linearization {
            line_of_sight,
            range_m,
            pseudo_range_m,
            pseudo_range_rate_m_s,
            h,
        })
    }

    /// Builds the R measurement noise matrix for n satellites (2n x 2n).
    pub fn measurement_noise(&self, n: usize) -> DMatrix<f64> {
        let mut diag = DVector::<f64>::zeros(2 * n);
        for i in 0..n {
            diag[i] = self.pseudo_range_variance_m2;
            diag[n + i] = self.pseudo_range_rate_variance_m2_s2;
        }
        DMatrix::from_diagonal(&diag)
    }

    /// Converts a Doppler shift (Hz) to a pseudo range rate (m.s⁻¹).
    /// An approaching satellite has a positive Doppler shift and a
    /// negative pseudo range rate.
    pub fn doppler_to_pseudo_range_rate(&self, doppler_hz: f64) -> f64 {
        -doppler_hz * self.wavelength_m
    }

    /// Converts a pseudo range rate (m.s⁻¹) to a Doppler shift (Hz).
    pub fn pseudo_range_rate_to_doppler(&self, pseudo_range_rate_m_s: f64) -> f64 {
        -pseudo_range_rate_m_s / self.wavelength_m
    }

    /// Forms the residual vector (measured - predicted) for given
    /// [Linearization], obtained at [State]. The first n terms are
    /// pseudo range residuals (m), the last n are pseudo range rate
    /// residuals (m.s⁻¹).
    pub fn residuals(
        &self,
        state: &State,
        linearization: &Linearization,
        satellites: &[SatelliteMeasurement],
    ) -> DVector<f64> {
        let n = satellites.len();
        let mut y = DVector::<f64>::zeros(2 * n);

        let drift_term_m_s = match self.rate_residual {
            RateResidual::DriftAided => state.clock_profile_m(self.speed_of_light_m_s).1,
            RateResidual::Predicted => 0.0,
        };

        for (i, sat) in satellites.iter().enumerate() {
            let measured_rate_m_s = self.doppler_to_pseudo_range_rate(sat.doppler_hz);
            y[i] = sat.pseudo_range_m - linearization.pseudo_range_m[i];
            y[n + i] =
                measured_rate_m_s + drift_term_m_s - linearization.pseudo_range_rate_m_s[i];
        }

        y
    }
}
