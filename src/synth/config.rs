use core::f32::consts::PI;

use super::mode::Mode;

/// Words per sample buffer. Four of these fill most of the RP2040's RAM.
pub const BUFFER_CAPACITY: usize = 15_000;

/// System clock the firmware runs at. The controller is handed the measured value.
pub const DEFAULT_CPU_HZ: f64 = 200_000_000.0;

/// Tunables owned by the synthesizer.
///
/// The derived word/period counts and the dirty flag live next to these in the
/// controller; this record is what gets shown, stored and restored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthConfig {
    pub frequency: f64,
    pub mode: Mode,
    pub amplitude: f32,
    pub dither_amplitude: f32,
    pub hd3_amplitude: f32,
    /// Radians.
    pub hd3_phase: f32,
    /// Cap on the denominator handed to the rational approximation.
    pub max_words_limit: u32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            frequency: 3_579_900.0,
            mode: Mode::ClickFreeTrinarySigmaDelta,
            amplitude: 1.0,
            dither_amplitude: 1.0,
            hd3_amplitude: 0.045,
            hd3_phase: -35.0 * PI / 180.0,
            max_words_limit: BUFFER_CAPACITY as u32,
        }
    }
}

/// Value ranges accepted from the command layer. Nothing inside the synthesizer
/// re-checks these; they are enforced once, here, before a setter is called.
pub mod limits {
    use core::f32::consts::PI;

    use snafu::ensure;

    use crate::synth::{
        error::{OutOfRangeSnafu, Result},
        mode::Mode,
    };

    pub const MIN_FREQUENCY: f64 = 100_000.0;
    pub const MAX_FREQUENCY: f64 = 20_000_000.0;
    pub const MIN_AMPLITUDE: f32 = 0.0;
    pub const MAX_AMPLITUDE: f32 = 2.0;
    pub const MIN_DITHER: f32 = 0.0;
    pub const MAX_DITHER: f32 = 2.0;
    pub const MIN_HD3_AMPLITUDE: f32 = -0.5;
    pub const MAX_HD3_AMPLITUDE: f32 = 0.5;
    pub const MIN_HD3_PHASE_DEGREES: f32 = -400.0;
    pub const MAX_HD3_PHASE_DEGREES: f32 = 400.0;
    pub const MIN_MAX_WORDS: u32 = 2;
    pub const MAX_MAX_WORDS: u32 = 10_000;

    fn check(parameter: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
        // Written so that NaN fails too.
        let in_range = value >= min && value <= max;
        if !in_range {
            warn!("Rejected {} = {}, allowed {} to {}", parameter, value, min, max);
        }
        ensure!(
            in_range,
            OutOfRangeSnafu {
                parameter,
                value,
                min,
                max
            }
        );
        Ok(())
    }

    pub fn validate_frequency(hz: f64) -> Result<f64> {
        check("frequency", hz, MIN_FREQUENCY, MAX_FREQUENCY)?;
        Ok(hz)
    }

    pub fn validate_mode(raw: u8) -> Result<Mode> {
        Mode::try_from(raw)
    }

    pub fn validate_amplitude(amplitude: f32) -> Result<f32> {
        check(
            "amplitude",
            amplitude.into(),
            MIN_AMPLITUDE.into(),
            MAX_AMPLITUDE.into(),
        )?;
        Ok(amplitude)
    }

    pub fn validate_dither(dither: f32) -> Result<f32> {
        check(
            "dither",
            dither.into(),
            MIN_DITHER.into(),
            MAX_DITHER.into(),
        )?;
        Ok(dither)
    }

    pub fn validate_hd3_amplitude(amplitude: f32) -> Result<f32> {
        check(
            "hd3 amplitude",
            amplitude.into(),
            MIN_HD3_AMPLITUDE.into(),
            MAX_HD3_AMPLITUDE.into(),
        )?;
        Ok(amplitude)
    }

    /// Checks a phase given in degrees and returns it in radians.
    pub fn hd3_phase_from_degrees(degrees: f32) -> Result<f32> {
        check(
            "hd3 phase",
            degrees.into(),
            MIN_HD3_PHASE_DEGREES.into(),
            MAX_HD3_PHASE_DEGREES.into(),
        )?;
        Ok(degrees * PI / 180.0)
    }

    pub fn validate_max_words(words: u32) -> Result<u32> {
        check(
            "bufsize",
            words.into(),
            MIN_MAX_WORDS.into(),
            MAX_MAX_WORDS.into(),
        )?;
        Ok(words)
    }
}

#[cfg(test)]
mod tests {
    use super::{limits::*, *};
    use crate::synth::error::SynthError;

    #[test]
    fn defaults_match_power_on_state() {
        let config = SynthConfig::default();
        assert_eq!(config.mode, Mode::ClickFreeTrinarySigmaDelta);
        assert_eq!(config.max_words_limit, 15_000);
        assert!((config.hd3_phase + 0.610_865).abs() < 1e-5);
    }

    #[test]
    fn frequency_band() {
        assert_eq!(validate_frequency(3_579_900.0), Ok(3_579_900.0));
        assert!(validate_frequency(99_999.0).is_err());
        assert!(validate_frequency(20_000_001.0).is_err());
        assert!(validate_frequency(f64::NAN).is_err());
    }

    #[test]
    fn dither_uses_the_conservative_bound() {
        assert!(validate_dither(2.0).is_ok());
        assert_eq!(
            validate_dither(2.5),
            Err(SynthError::OutOfRange {
                parameter: "dither",
                value: 2.5,
                min: 0.0,
                max: 2.0
            })
        );
    }

    #[test]
    fn phase_is_converted_to_radians() {
        let rad = hd3_phase_from_degrees(180.0).unwrap();
        assert!((rad - PI).abs() < 1e-6);
        assert!(hd3_phase_from_degrees(401.0).is_err());
    }

    #[test]
    fn bufsize_range() {
        assert!(validate_max_words(1).is_err());
        assert_eq!(validate_max_words(2), Ok(2));
        assert_eq!(validate_max_words(10_000), Ok(10_000));
        assert!(validate_max_words(10_001).is_err());
        assert!(validate_mode(6).is_err());
    }
}
