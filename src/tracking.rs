//! Tracking loop commands
use crate::{
    carrier::Carrier,
    cfg::CommandOpts,
    navigation::FilteredMeasurement,
    prelude::SV,
};

/// [TrackingCmd] is the correction fed back to one tracking channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingCmd {
    /// Satellite vehicle this command is addressed to
    pub sv: SV,
    /// Carrier frequency correction (Hz)
    pub carrier_freq_hz: f64,
    /// Carrier frequency rate correction (Hz.s⁻¹)
    pub carrier_freq_rate_hz_s: f64,
    /// Code frequency correction (chips.s⁻¹)
    pub code_freq_chips: f64,
    /// Carrier NCO should apply this command
    pub enable_carrier_nco_cmd: bool,
    /// Code NCO should apply this command
    pub enable_code_nco_cmd: bool,
    /// Sample counter of the batch that produced this command
    pub sample_counter: u64,
}

/// Epoch wide context, shared by all satellites
#[derive(Debug, Clone, Copy)]
pub struct CommandContext {
    /// Sample counter of the current batch
    pub sample_counter: u64,
    /// Time step (s)
    pub dt_s: f64,
    /// Carrier wavelength (m)
    pub wavelength_m: f64,
    /// Tracked [Carrier]
    pub carrier: Carrier,
    /// [CommandOpts]
    pub opts: CommandOpts,
}

impl CommandContext {
    /// [TrackingCmd] skeleton with null corrections
    pub fn null_command(&self, sv: SV) -> TrackingCmd {
        TrackingCmd {
            sv,
            carrier_freq_hz: 0.0,
            carrier_freq_rate_hz_s: 0.0,
            code_freq_chips: 0.0,
            enable_carrier_nco_cmd: self.opts.carrier_nco,
            enable_code_nco_cmd: self.opts.code_nco,
            sample_counter: self.sample_counter,
        }
    }
}

/// [CommandGenerator] converts the filtered measurements of one satellite
/// into its [TrackingCmd]. It is called exactly once per satellite and per epoch.
pub trait CommandGenerator {
    fn generate(&self, ctx: &CommandContext, filtered: &FilteredMeasurement) -> TrackingCmd;
}

/// [NullCommands] emits null corrections: the channels keep tracking
/// on their own loop filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCommands;

impl CommandGenerator for NullCommands {
    fn generate(&self, ctx: &CommandContext, filtered: &FilteredMeasurement) -> TrackingCmd {
        ctx.null_command(filtered.sv)
    }
}

/// [DopplerAiding] drives the carrier and code NCOs from the
/// filtered Doppler shift.
#[derive(Debug, Clone, Copy, Default)]
pub struct DopplerAiding;

impl CommandGenerator for DopplerAiding {
    fn generate(&self, ctx: &CommandContext, filtered: &FilteredMeasurement) -> TrackingCmd {
        let mut cmd = ctx.null_command(filtered.sv);

        let predicted_doppler_hz = -filtered.predicted_pseudo_range_rate_m_s / ctx.wavelength_m;

        cmd.carrier_freq_hz = filtered.doppler_hz;
        cmd.carrier_freq_rate_hz_s = (filtered.doppler_hz - predicted_doppler_hz) / ctx.dt_s;
        cmd.code_freq_chips =
            ctx.carrier.chipping_rate() * filtered.doppler_hz / ctx.carrier.frequency();

        cmd
    }
}

/// Emits one [TrackingCmd] per [FilteredMeasurement], preserving their order,
/// and appends them to the caller's list.
pub(crate) fn emit<G: CommandGenerator>(
    generator: &G,
    ctx: &CommandContext,
    filtered: &[FilteredMeasurement],
    commands: &mut Vec<TrackingCmd>,
) {
    commands.reserve(filtered.len());
    for measurement in filtered.iter() {
        commands.push(generator.generate(ctx, measurement));
    }
}
