use nalgebra::{Vector3, Vector6};

use crate::{
    constants::{CLOCK_BIAS_INDEX, CLOCK_DRIFT_INDEX},
    navigation::Vector8,
};

/// Receiver [State]: ECEF position (m), ECEF velocity (m.s⁻¹),
/// clock offset (s) and clock drift (s.s⁻¹).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    /// Internal vector, clock terms expressed in time units
    x: Vector8,
}

impl Default for State {
    fn default() -> Self {
        Self {
            x: Vector8::zeros(),
        }
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pos = self.position_ecef_m();
        let vel = self.velocity_ecef_m_s();
        let (offset, drift) = self.clock_profile_s();
        write!(
            f,
            "pos=({:.3},{:.3},{:.3})m vel=({:.3},{:.3},{:.3})m/s dt={:.11E}s drift={:.11E}s/s",
            pos[0], pos[1], pos[2], vel[0], vel[1], vel[2], offset, drift,
        )
    }
}

impl State {
    /// Creates a new [State]
    pub fn new(
        position_ecef_m: Vector3<f64>,
        velocity_ecef_m_s: Vector3<f64>,
        clock_bias_s: f64,
        clock_drift_s_s: f64,
    ) -> Self {
        let mut x = Vector8::zeros();
        x.fixed_rows_mut::<3>(0).copy_from(&position_ecef_m);
        x.fixed_rows_mut::<3>(3).copy_from(&velocity_ecef_m_s);
        x[CLOCK_BIAS_INDEX] = clock_bias_s;
        x[CLOCK_DRIFT_INDEX] = clock_drift_s_s;
        Self { x }
    }

    /// Returns position in ECEF meters
    pub fn position_ecef_m(&self) -> Vector3<f64> {
        self.x.fixed_rows::<3>(0).into_owned()
    }

    /// Returns velocity in ECEF m.s⁻¹
    pub fn velocity_ecef_m_s(&self) -> Vector3<f64> {
        self.x.fixed_rows::<3>(3).into_owned()
    }

    /// Returns position and velocity in ECEF meters as [Vector6]
    pub fn position_velocity_ecef_m(&self) -> Vector6<f64> {
        self.x.fixed_rows::<6>(0).into_owned()
    }

    /// Returns estimated clock (offset, drift) in seconds and s.s⁻¹.
    pub fn clock_profile_s(&self) -> (f64, f64) {
        (self.x[CLOCK_BIAS_INDEX], self.x[CLOCK_DRIFT_INDEX])
    }

    /// Returns clock (offset, drift) in meters and m.s⁻¹
    pub fn clock_profile_m(&self, speed_of_light_m_s: f64) -> (f64, f64) {
        let (offset, drift) = self.clock_profile_s();
        (offset * speed_of_light_m_s, drift * speed_of_light_m_s)
    }

    /// True if all components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.iter().all(|x| x.is_finite())
    }

    /// Expresses this [State] in the measurement domain, where clock
    /// terms are in meters and m.s⁻¹.
    pub(crate) fn to_distance_domain(&self, speed_of_light_m_s: f64) -> Vector8 {
        let mut x = self.x;
        x[CLOCK_BIAS_INDEX] *= speed_of_light_m_s;
        x[CLOCK_DRIFT_INDEX] *= speed_of_light_m_s;
        x
    }

    /// Builds a [State] from measurement domain vector.
    pub(crate) fn from_distance_domain(x_m: &Vector8, speed_of_light_m_s: f64) -> Self {
        let mut x = *x_m;
        x[CLOCK_BIAS_INDEX] /= speed_of_light_m_s;
        x[CLOCK_DRIFT_INDEX] /= speed_of_light_m_s;
        Self { x }
    }
}
