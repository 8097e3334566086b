//! Vector tracking loop engine
use itertools::{izip, Itertools};
use log::{debug, info, trace, warn};

use crate::{
    cfg::Config,
    constants::MIN_SATELLITES,
    error::Error,
    navigation::{
        DilutionOfPrecision, EpochInput, EpochOutput, FilteredMeasurement, Kalman, KfEstimate,
        Matrix8, MeasurementModel, Mode, State,
    },
    tracking::{emit, CommandContext, CommandGenerator, DopplerAiding, TrackingCmd},
};

/// [Engine] resolves one epoch at a time: it predicts the receiver [State],
/// corrects it with the pseudo range and Doppler measurements of all
/// tracked satellites, and converts the filtered measurements into
/// one [TrackingCmd] per satellite.
///
/// The filter state is not stored internally: each [EpochOutput] hands
/// a new [KfEstimate] over to the caller, which proposes it back on the next epoch.
/// The only state the [Engine] owns across epochs is its epoch counter,
/// which selects the operating [Mode].
#[derive(Debug, Clone)]
pub struct Engine<G: CommandGenerator = DopplerAiding> {
    /// Validated [Config]
    cfg: Config,
    /// [MeasurementModel] derived from [Config]
    model: MeasurementModel,
    /// [Kalman] filter derived from [Config]
    kalman: Kalman,
    /// [CommandGenerator]
    generator: G,
    /// Number of epochs resolved since construction or last reset
    epochs: u64,
}

impl Engine<DopplerAiding> {
    /// Creates a new [Engine] that emits [DopplerAiding] commands.
    pub fn new(cfg: Config) -> Result<Self, Error> {
        Self::with_generator(cfg, DopplerAiding)
    }
}

impl<G: CommandGenerator> Engine<G> {
    /// Creates a new [Engine] with custom [CommandGenerator].
    pub fn with_generator(cfg: Config, generator: G) -> Result<Self, Error> {
        cfg.validate()?;

        info!(
            "vtl engine: dt={} carrier={} warmup={} epochs",
            cfg.sampling_period, cfg.carrier, cfg.warmup_epochs
        );

        Ok(Self {
            model: MeasurementModel::new(&cfg),
            kalman: Kalman::new(cfg.dt_s()),
            generator,
            epochs: 0,
            cfg,
        })
    }

    /// Updates the [Config]uration. The epoch counter is preserved.
    /// The current [Config] is retained if the new one is invalid.
    pub fn configure(&mut self, cfg: Config) -> Result<(), Error> {
        cfg.validate()?;

        info!(
            "vtl engine reconfigured: dt={} carrier={} warmup={} epochs",
            cfg.sampling_period, cfg.carrier, cfg.warmup_epochs
        );

        self.model = MeasurementModel::new(&cfg);
        self.kalman = Kalman::new(cfg.dt_s());
        self.cfg = cfg;
        Ok(())
    }

    /// Resets the epoch counter: the [Engine] returns to [Mode::Warmup].
    pub fn reset(&mut self) {
        info!("vtl engine reset after {} epochs", self.epochs);
        self.epochs = 0;
    }

    /// Current [Config]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Number of epochs resolved since construction or last reset
    pub fn epochs(&self) -> u64 {
        self.epochs
    }

    /// [Mode] the next epoch will be resolved in
    pub fn mode(&self) -> Mode {
        if self.epochs < self.cfg.warmup_epochs {
            Mode::Warmup
        } else {
            Mode::Steady
        }
    }

    /// Initial state and covariance (measurement domain) for this epoch
    fn initial_estimate(
        &self,
        mode: Mode,
        input: &EpochInput,
    ) -> Result<(State, Matrix8), Error> {
        let persisted = input.estimate.as_ref().filter(|estimate| estimate.is_valid());

        match mode {
            Mode::Warmup => {
                let prior = input.prior.to_state();

                if !prior.is_finite() {
                    return Err(Error::InvalidPrior);
                }

                let p = match persisted {
                    Some(estimate) => estimate.p,
                    None => Matrix8::identity() * self.cfg.initial_covariance_scale,
                };
                Ok((prior, p))
            },
            Mode::Steady => match persisted {
                Some(estimate) => Ok((estimate.state, estimate.p)),
                None => Err(Error::StaleState),
            },
        }
    }

    /// Resolves one epoch.
    /// ## Input
    /// - input: [EpochInput], borrowed for the duration of this call.
    /// - commands: one [TrackingCmd] per satellite is appended to this list,
    ///   in the order of [EpochInput::satellites]. Draining it is up to the caller.
    /// ## Returns
    /// - [EpochOutput], which contains the [KfEstimate] to propose on next epoch.
    ///
    /// On failure, neither the epoch counter nor the commands are modified,
    /// and the caller should keep the last valid [KfEstimate].
    pub fn step(
        &mut self,
        input: &EpochInput,
        commands: &mut Vec<TrackingCmd>,
    ) -> Result<EpochOutput, Error> {
        let t = input.t;
        let n = input.satellites.len();

        if n < MIN_SATELLITES {
            warn!("{} - not enough satellites ({})", t, n);
            return Err(Error::NotEnoughSatellites(n));
        }

        if !input
            .process_noise
            .iter()
            .all(|q| q.is_finite() && *q >= 0.0)
        {
            warn!("{} - invalid process noise: {}", t, input.process_noise);
            return Err(Error::InvalidProcessNoise);
        }

        if let Some(estimate) = &input.estimate {
            if input.sample_counter <= estimate.sample_counter {
                warn!(
                    "{} - sample counter regression ({} <= {})",
                    t, input.sample_counter, estimate.sample_counter
                );
                return Err(Error::NonMonotonicSampleCounter {
                    previous: estimate.sample_counter,
                    current: input.sample_counter,
                });
            }
        }

        let mode = self.mode();
        let c = self.cfg.speed_of_light_m_s;

        let (state, p) = self.initial_estimate(mode, input).map_err(|e| {
            warn!("{} ({}) - {}", t, mode, e);
            e
        })?;

        debug!("{} ({}) - n_sat={} initial: {}", t, mode, n, state);

        // time update
        let q = Kalman::process_noise(&input.process_noise);
        let x = state.to_distance_domain(c);
        let (x_k, p_k) = self.kalman.predict(&x, &p, &q);

        let predicted = State::from_distance_domain(&x_k, c);

        // measurement update
        let prefit = self.model.linearize(&predicted, &input.satellites)?;
        let y = self.model.residuals(&predicted, &prefit, &input.satellites);
        let r = self.model.measurement_noise(n);

        trace!("{} - y: {}", t, y);

        let correction = self
            .kalman
            .correct(&x_k, &p_k, &prefit.h, &r, &y)
            .map_err(|e| {
                warn!("{} ({}) - measurement update: {}", t, mode, e);
                e
            })?;

        trace!("{} - K: {}", t, correction.k);
        trace!("{} - P: {}", t, correction.p);

        let corrected = State::from_distance_domain(&correction.x, c);

        // filtered measurements
        let postfit = self.model.linearize(&corrected, &input.satellites)?;
        let residuals = self.model.residuals(&corrected, &postfit, &input.satellites);

        let dop = DilutionOfPrecision::new(&postfit)?;

        if let Some(max_gdop) = self.cfg.max_gdop {
            if dop.gdop > max_gdop {
                warn!("{} ({}) - gdop {:.3} exceeds {:.3}", t, mode, dop.gdop, max_gdop);
                return Err(Error::MaxGdopExceeded(dop.gdop));
            }
        }

        let filtered = izip!(
            input.satellites.iter(),
            postfit.line_of_sight.iter(),
            postfit.pseudo_range_m.iter(),
            postfit.pseudo_range_rate_m_s.iter(),
            prefit.pseudo_range_rate_m_s.iter(),
        )
        .enumerate()
        .map(
            |(i, (sat, los, pseudo_range_m, rate_m_s, predicted_rate_m_s))| FilteredMeasurement {
                sv: sat.sv,
                line_of_sight: *los,
                pseudo_range_m: *pseudo_range_m,
                pseudo_range_rate_m_s: *rate_m_s,
                doppler_hz: self.model.pseudo_range_rate_to_doppler(*rate_m_s),
                predicted_pseudo_range_rate_m_s: *predicted_rate_m_s,
                pseudo_range_residual_m: residuals[i],
                pseudo_range_rate_residual_m_s: residuals[n + i],
            },
        )
        .collect_vec();

        debug!(
            "{} ({}) - |y|={:.3E} |dx|={:.3E} postfit |y|={:.3E} gdop={:.3}",
            t,
            mode,
            y.norm(),
            correction.dx.norm(),
            residuals.norm(),
            dop.gdop
        );

        debug!("{} ({}) - filtered: {}", t, mode, corrected);

        let ctx = CommandContext {
            sample_counter: input.sample_counter,
            dt_s: self.cfg.dt_s(),
            wavelength_m: self.model.wavelength_m(),
            carrier: self.cfg.carrier,
            opts: self.cfg.commands,
        };

        emit(&self.generator, &ctx, &filtered, commands);

        self.epochs = self.epochs.saturating_add(1);

        Ok(EpochOutput {
            t,
            mode,
            sample_counter: input.sample_counter,
            pvt: corrected.position_velocity_ecef_m(),
            estimate: KfEstimate::new(input.sample_counter, corrected, correction.p),
            prediction: KfEstimate::new(input.sample_counter, predicted, p_k),
            innovation: y,
            gain: correction.k,
            correction: correction.dx,
            filtered,
            dop,
        })
    }
}
