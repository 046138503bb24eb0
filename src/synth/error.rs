use snafu::prelude::Snafu;

/// Everything the synthesizer reports back to its callers.
///
/// None of these stop the transmitter on their own. Rejected values leave the
/// configuration untouched; a stalled stream leaves the controller degraded until a
/// later `apply_settings` manages to halt it.
#[derive(Debug, Clone, Copy, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum SynthError {
    #[snafu(display("mode {value} is not one of 0..=5"))]
    InvalidMode { value: u8 },

    #[snafu(display("{parameter} = {value} is outside [{min}, {max}]"))]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[snafu(display("stream engine still busy after {attempts} abort attempts"))]
    StreamStalled { attempts: u32 },
}

#[cfg(feature = "defmt")]
impl defmt::Format for SynthError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            SynthError::InvalidMode { value } => defmt::write!(f, "InvalidMode({})", value),
            SynthError::OutOfRange {
                parameter,
                value,
                min,
                max,
            } => defmt::write!(f, "OutOfRange({}={}, [{}, {}])", parameter, value, min, max),
            SynthError::StreamStalled { attempts } => {
                defmt::write!(f, "StreamStalled(after {} attempts)", attempts)
            }
        }
    }
}

pub type Result<T, E = SynthError> = core::result::Result<T, E>;
