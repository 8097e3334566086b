use nalgebra::Vector3;

use crate::{
    navigation::{KfEstimate, State, Vector8},
    prelude::{Epoch, SV},
};

/// Observations and orbital state of one tracked satellite,
/// for one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatelliteMeasurement {
    /// Satellite vehicle
    pub sv: SV,
    /// Satellite position, ECEF (m)
    pub position_ecef_m: Vector3<f64>,
    /// Satellite velocity, ECEF (m.s⁻¹)
    pub velocity_ecef_m_s: Vector3<f64>,
    /// Measured pseudo range (m)
    pub pseudo_range_m: f64,
    /// Measured carrier Doppler shift (Hz)
    pub doppler_hz: f64,
}

impl SatelliteMeasurement {
    /// Builds a new [SatelliteMeasurement]
    pub fn new(
        sv: SV,
        position_ecef_m: Vector3<f64>,
        velocity_ecef_m_s: Vector3<f64>,
        pseudo_range_m: f64,
        doppler_hz: f64,
    ) -> Self {
        Self {
            sv,
            position_ecef_m,
            velocity_ecef_m_s,
            pseudo_range_m,
            doppler_hz,
        }
    }
}

/// [Prior] solution, provided by an external (unfiltered) PVT solver.
/// It is used to initialize the filter during warmup.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Prior {
    /// Position, ECEF (m)
    pub position_ecef_m: Vector3<f64>,
    /// Velocity, ECEF (m.s⁻¹)
    pub velocity_ecef_m_s: Vector3<f64>,
    /// Receiver clock offset (s)
    pub clock_bias_s: f64,
}

impl Prior {
    /// Builds a new [Prior]
    pub fn new(
        position_ecef_m: Vector3<f64>,
        velocity_ecef_m_s: Vector3<f64>,
        clock_bias_s: f64,
    ) -> Self {
        Self {
            position_ecef_m,
            velocity_ecef_m_s,
            clock_bias_s,
        }
    }

    /// Converts this [Prior] to initial [State]. Clock drift is not
    /// provided by the external solver and starts at zero.
    pub(crate) fn to_state(&self) -> State {
        State::new(
            self.position_ecef_m,
            self.velocity_ecef_m_s,
            self.clock_bias_s,
            0.0,
        )
    }
}

/// [EpochInput] gathers everything the vector tracking loop consumes
/// for one epoch. It is only borrowed by the engine: the caller keeps
/// ownership of the persisted [KfEstimate] until a new one is produced.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochInput {
    /// Sampling [Epoch]
    pub t: Epoch,
    /// Sample counter of the tracking channels batch
    pub sample_counter: u64,
    /// Tracked satellites. The tracking commands are emitted in the same order.
    pub satellites: Vec<SatelliteMeasurement>,
    /// External [Prior] solution
    pub prior: Prior,
    /// Process noise variances, one per state, expressed in
    /// measurement domain (m², m².s⁻², m² for clock offset, m².s⁻² for drift).
    pub process_noise: Vector8,
    /// [KfEstimate] persisted from the previous epoch, if any.
    pub estimate: Option<KfEstimate>,
}

impl std::fmt::Display for EpochInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} - sample={} n_sat={}",
            self.t,
            self.sample_counter,
            self.satellites.len()
        )?;
        for sat in self.satellites.iter() {
            writeln!(
                f,
                "({}) pos=({:.3},{:.3},{:.3})m vel=({:.3},{:.3},{:.3})m/s pr={:.3}m doppler={:.3}Hz",
                sat.sv,
                sat.position_ecef_m[0],
                sat.position_ecef_m[1],
                sat.position_ecef_m[2],
                sat.velocity_ecef_m_s[0],
                sat.velocity_ecef_m_s[1],
                sat.velocity_ecef_m_s[2],
                sat.pseudo_range_m,
                sat.doppler_hz,
            )?;
        }
        match &self.estimate {
            Some(estimate) => write!(f, "persisted: {}", estimate.state),
            None => write!(f, "persisted: none"),
        }
    }
}

impl EpochInput {
    /// Creates a new [EpochInput] without satellites,
    /// null process noise and no persisted estimate.
    pub fn new(t: Epoch, sample_counter: u64, prior: Prior) -> Self {
        Self {
            t,
            sample_counter,
            prior,
            satellites: Vec::new(),
            process_noise: Vector8::zeros(),
            estimate: None,
        }
    }

    /// Returns [EpochInput] with one more [SatelliteMeasurement]
    pub fn with_satellite(mut self, satellite: SatelliteMeasurement) -> Self {
        self.satellites.push(satellite);
        self
    }

    /// Returns [EpochInput] with given [SatelliteMeasurement]s
    pub fn with_satellites(mut self, satellites: &[SatelliteMeasurement]) -> Self {
        self.satellites = satellites.to_vec();
        self
    }

    /// Returns [EpochInput] with process noise variances
    pub fn with_process_noise(mut self, variances: Vector8) -> Self {
        self.process_noise = variances;
        self
    }

    /// Returns [EpochInput] with persisted [KfEstimate]
    pub fn with_estimate(mut self, estimate: KfEstimate) -> Self {
        self.estimate = Some(estimate);
        self
    }

    /// Number of satellites
    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    /// True if no satellites are proposed
    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }
}
