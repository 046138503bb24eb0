use super::error::{InvalidModeSnafu, SynthError};

/// How the RF waveform is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    /// Square wave straight from a PIO clock divider, no sample buffers.
    ClkDiv = 0,
    /// 1-bit hard threshold with dither, no noise shaping.
    Comparator = 1,
    BinarySigmaDelta = 2,
    TrinarySigmaDelta = 3,
    ClickFreeBinarySigmaDelta = 4,
    ClickFreeTrinarySigmaDelta = 5,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::ClkDiv,
        Mode::Comparator,
        Mode::BinarySigmaDelta,
        Mode::TrinarySigmaDelta,
        Mode::ClickFreeBinarySigmaDelta,
        Mode::ClickFreeTrinarySigmaDelta,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mode::ClkDiv => "CLKDIV",
            Mode::Comparator => "Comparator",
            Mode::BinarySigmaDelta => "Binary sigma delta",
            Mode::TrinarySigmaDelta => "Trinary sigma delta",
            Mode::ClickFreeBinarySigmaDelta => "Click-free binary sigma delta",
            Mode::ClickFreeTrinarySigmaDelta => "Click-free trinary sigma delta",
        }
    }

    /// Whether the output is streamed from sample buffers at all.
    pub fn uses_buffers(self) -> bool {
        self != Mode::ClkDiv
    }

    /// Whether key-up and key-down go through tapered ramp buffers.
    pub fn is_click_free(self) -> bool {
        matches!(
            self,
            Mode::ClickFreeBinarySigmaDelta | Mode::ClickFreeTrinarySigmaDelta
        )
    }
}

impl TryFrom<u8> for Mode {
    type Error = SynthError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Mode::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(InvalidModeSnafu { value }.build())
    }
}

impl From<Mode> for u8 {
    fn from(mode: Mode) -> u8 {
        mode as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(Mode::try_from(u8::from(mode)), Ok(mode));
        }
    }

    #[test]
    fn rejects_values_past_five() {
        assert_eq!(Mode::try_from(6), Err(SynthError::InvalidMode { value: 6 }));
        assert_eq!(
            Mode::try_from(255),
            Err(SynthError::InvalidMode { value: 255 })
        );
    }

    #[test]
    fn only_modes_four_and_five_are_click_free() {
        let click_free: usize = Mode::ALL.iter().filter(|m| m.is_click_free()).count();
        assert_eq!(click_free, 2);
        assert!(!Mode::ClkDiv.uses_buffers());
        assert!(Mode::Comparator.uses_buffers());
    }
}
