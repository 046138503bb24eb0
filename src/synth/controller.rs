use rand::{rngs::SmallRng, SeedableRng};

use super::{
    buffers::{FillParams, WaveformBuffers, SAMPLES_PER_WORD},
    clkdiv::{clkdiv_frequency, clock_divider, DividerReadout},
    config::SynthConfig,
    engine::StreamEngine,
    error::{Result, StreamStalledSnafu},
    mode::Mode,
    output::TransmitEnable,
    rational::approximate,
};

/// Abort/poll rounds before a halt is declared stalled. Each round is a couple of
/// register accesses, so this is far beyond what a healthy chain ever needs.
pub const MAX_ABORT_ATTEMPTS: u32 = 1000;

const DITHER_SEED: u64 = 0xbadbeef;

/// Snapshot for the status printer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    pub frequency: f64,
    pub frequency_exact: f64,
    pub mode: Mode,
    pub mode_name: &'static str,
    pub amplitude: f32,
    pub dither_amplitude: f32,
    pub hd3_amplitude: f32,
    pub hd3_phase_degrees: f32,
    pub max_words: u32,
    pub n_words: u32,
    pub n_periods: u32,
    /// Only in CLKDIV mode.
    pub divider: Option<DividerReadout>,
    pub output_enabled: bool,
    pub degraded: bool,
}

/// Owns the synthesizer configuration and turns it into streamed buffers.
///
/// Setters only record the new value; nothing reaches the hardware until
/// [`apply_settings`](Self::apply_settings).
pub struct SynthController<'a, E: StreamEngine, const CAP: usize> {
    engine: E,
    buffers: &'a mut WaveformBuffers<CAP>,
    transmit: &'a TransmitEnable,
    cpu_hz: f64,
    config: SynthConfig,
    n_words: u32,
    n_periods: u32,
    needs_recalculation: bool,
    active_mode: Option<Mode>,
    degraded: bool,
    rng: SmallRng,
}

impl<'a, E: StreamEngine, const CAP: usize> SynthController<'a, E, CAP> {
    /// Starts from the default configuration, dirty and not yet streaming.
    pub fn new(
        engine: E,
        buffers: &'a mut WaveformBuffers<CAP>,
        transmit: &'a TransmitEnable,
        cpu_hz: f64,
    ) -> Self {
        Self {
            engine,
            buffers,
            transmit,
            cpu_hz,
            config: SynthConfig::default(),
            n_words: 0,
            n_periods: 0,
            needs_recalculation: true,
            active_mode: None,
            degraded: false,
            rng: SmallRng::seed_from_u64(DITHER_SEED),
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn buffers(&self) -> &WaveformBuffers<CAP> {
        self.buffers
    }

    pub fn cpu_hz(&self) -> f64 {
        self.cpu_hz
    }

    pub fn needs_recalculation(&self) -> bool {
        self.needs_recalculation
    }

    /// True after a halt gave up; cleared by the next successful `apply_settings`.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn frequency(&self) -> f64 {
        self.config.frequency
    }

    pub fn set_frequency(&mut self, hz: f64) {
        self.config.frequency = hz;
        self.needs_recalculation = true;
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn mode_str(&self) -> &'static str {
        self.config.mode.name()
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.config.mode = mode;
        self.needs_recalculation = true;
    }

    /// Sets the mode from its command-line number. Anything outside 0..=5 is logged and
    /// ignored.
    pub fn set_mode_raw(&mut self, raw: u8) -> Result<()> {
        match Mode::try_from(raw) {
            Ok(mode) => {
                self.set_mode(mode);
                Ok(())
            }
            Err(e) => {
                warn!("Attempted to set invalid mode {}", raw);
                Err(e)
            }
        }
    }

    pub fn amplitude(&self) -> f32 {
        self.config.amplitude
    }

    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.config.amplitude = amplitude;
        self.needs_recalculation = true;
    }

    pub fn dither_amplitude(&self) -> f32 {
        self.config.dither_amplitude
    }

    pub fn set_dither_amplitude(&mut self, amplitude: f32) {
        self.config.dither_amplitude = amplitude;
        self.needs_recalculation = true;
    }

    pub fn hd3_amplitude(&self) -> f32 {
        self.config.hd3_amplitude
    }

    pub fn set_hd3_amplitude(&mut self, amplitude: f32) {
        self.config.hd3_amplitude = amplitude;
        self.needs_recalculation = true;
    }

    /// Radians.
    pub fn hd3_phase(&self) -> f32 {
        self.config.hd3_phase
    }

    pub fn set_hd3_phase(&mut self, radians: f32) {
        self.config.hd3_phase = radians;
        self.needs_recalculation = true;
    }

    pub fn max_words(&self) -> u32 {
        self.config.max_words_limit
    }

    pub fn set_max_words(&mut self, words: u32) {
        self.config.max_words_limit = words;
        self.needs_recalculation = true;
    }

    pub fn n_words(&self) -> u32 {
        self.n_words
    }

    pub fn n_periods(&self) -> u32 {
        self.n_periods
    }

    /// Restores the power-on configuration. The output enable is left alone.
    pub fn reset_to_defaults(&mut self) {
        self.config = SynthConfig::default();
        self.needs_recalculation = true;
    }

    pub fn is_output_enabled(&self) -> bool {
        self.transmit.is_enabled()
    }

    /// Key down. With buffers the switch happens at the next transfer completion;
    /// in CLKDIV mode the pins are driven straight away.
    pub fn enable_output(&mut self) {
        if !self.transmit.is_enabled() && self.active_mode == Some(Mode::ClkDiv) {
            self.engine.set_pins_driven(true);
        }
        self.transmit.enable();
    }

    /// Key up. Honoured by the interrupt handler within one buffer length.
    pub fn disable_output(&mut self) {
        if self.transmit.is_enabled() && self.active_mode == Some(Mode::ClkDiv) {
            self.engine.set_pins_driven(false);
        }
        self.transmit.disable();
    }

    /// Gives the RF pins back to the PIO after a diagnostic mode drove them by hand.
    pub fn restore_out_pins(&mut self) {
        self.engine.restore_out_pins();
    }

    /// Frequency actually produced, which differs from the requested one by the
    /// rational approximation (or the 1/256 divider step in CLKDIV mode). 0 before
    /// the first calculation.
    pub fn frequency_exact(&self) -> f64 {
        if self.config.mode == Mode::ClkDiv {
            clkdiv_frequency(self.cpu_hz, clock_divider(self.cpu_hz, self.config.frequency))
        } else if self.n_words == 0 {
            0.0
        } else {
            self.cpu_hz * f64::from(self.n_periods)
                / (f64::from(SAMPLES_PER_WORD) * f64::from(self.n_words))
        }
    }

    pub fn status(&self) -> StatusReport {
        let divider = (self.config.mode == Mode::ClkDiv).then(|| {
            DividerReadout::from(clock_divider(self.cpu_hz, self.config.frequency))
        });
        StatusReport {
            frequency: self.config.frequency,
            frequency_exact: self.frequency_exact(),
            mode: self.config.mode,
            mode_name: self.config.mode.name(),
            amplitude: self.config.amplitude,
            dither_amplitude: self.config.dither_amplitude,
            hd3_amplitude: self.config.hd3_amplitude,
            hd3_phase_degrees: self.config.hd3_phase * 180.0 / core::f32::consts::PI,
            max_words: self.config.max_words_limit,
            n_words: self.n_words,
            n_periods: self.n_periods,
            divider,
            output_enabled: self.transmit.is_enabled(),
            degraded: self.degraded,
        }
    }

    /// Pushes pending changes to the hardware: halt the stream, swap the PIO program,
    /// regenerate the buffers and re-arm. Does nothing when nothing changed.
    ///
    /// If the stream refuses to halt the controller goes degraded, keeps the change
    /// pending and returns [`SynthError::StreamStalled`](super::SynthError::StreamStalled)
    /// without touching the buffers.
    pub fn apply_settings(&mut self) -> Result<()> {
        if !self.needs_recalculation {
            return Ok(());
        }

        if self.engine.is_streaming() {
            self.halt_stream()?;
        }
        self.degraded = false;

        self.engine.unload_program();
        self.active_mode = None;

        if !self.config.mode.uses_buffers() {
            let divider = clock_divider(self.cpu_hz, self.config.frequency);
            info!(
                "Loading clock divider program, divider {}/256",
                divider.to_bits()
            );
            self.engine.load_clock_divider(divider);
            self.engine.set_pins_driven(self.transmit.is_enabled());
            self.n_words = 0;
            self.n_periods = 0;
            self.needs_recalculation = false;
        } else {
            debug!("Loading serializer program");
            self.engine.load_serializer();
            self.calculate_buffers();
            debug!("Arming DMA, {} words", self.n_words);
            self.engine.arm(self.buffers);
        }
        self.active_mode = Some(self.config.mode);

        info!(
            "{} at {} Hz",
            self.config.mode.name(),
            self.frequency_exact()
        );
        Ok(())
    }

    /// Works out the buffer length and period count for the current frequency, then
    /// regenerates all four buffers. Only called from `apply_settings` once the stream
    /// has halted, since the DMA reads these buffers while armed.
    fn calculate_buffers(&mut self) {
        info!("Calculating buffers...");

        let capacity = CAP as u32;
        let limit = self.config.max_words_limit.min(capacity);
        let periods_per_word = approximate(
            self.config.frequency * f64::from(SAMPLES_PER_WORD) / self.cpu_hz,
            limit,
        );
        debug!(
            "{}/{} periods per word after {} iterations",
            periods_per_word.numerator,
            periods_per_word.denominator,
            periods_per_word.iterations
        );

        // Stretch to the longest buffer that fits, which gives the interrupt the most
        // time per buffer swap.
        let multiplier = (capacity / periods_per_word.denominator).max(1);
        self.n_words = periods_per_word.denominator * multiplier;
        self.n_periods = periods_per_word.numerator * multiplier;
        info!("n_words = {}, n_periods = {}", self.n_words, self.n_periods);

        self.buffers.fill(
            &FillParams {
                n_words: self.n_words,
                n_periods: self.n_periods,
                amplitude: self.config.amplitude,
                dither_amplitude: self.config.dither_amplitude,
                hd3_amplitude: self.config.hd3_amplitude,
                hd3_phase: self.config.hd3_phase,
                mode: self.config.mode,
            },
            &mut self.rng,
        );
        self.needs_recalculation = false;
    }

    /// Disables the chain, then aborts and polls until both channels go idle. Aborting
    /// chained channels is not immediate, so idle has to be observed.
    fn halt_stream(&mut self) -> Result<()> {
        debug!("Waiting for DMAs to stop...");
        self.engine.disable_triggers();
        for _ in 0..MAX_ABORT_ATTEMPTS {
            self.engine.abort();
            if !self.engine.is_busy() {
                self.engine.release();
                return Ok(());
            }
        }

        error!(
            "DMA still busy after {} aborts, output degraded",
            MAX_ABORT_ATTEMPTS
        );
        self.degraded = true;
        StreamStalledSnafu {
            attempts: MAX_ABORT_ATTEMPTS,
        }
        .fail()
    }
}
