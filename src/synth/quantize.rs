//! Per-sample quantizers. Each one turns an ideal sample into a differential bit pair:
//! the low bit drives the first RF pin, the high bit the second.

/// `+1`: first pin high.
pub const PAIR_POSITIVE: u32 = 0b01;
/// `-1`: second pin high.
pub const PAIR_NEGATIVE: u32 = 0b10;
/// `0`, encoded as both pins low.
pub const PAIR_ZERO_LOW: u32 = 0b00;
/// `0`, encoded as both pins high.
pub const PAIR_ZERO_HIGH: u32 = 0b11;

const TRINARY_THRESHOLD: f32 = 1.0 / 3.0;

pub trait Quantizer {
    /// Quantizes one sample. `dither` only biases the decision, it never enters the
    /// noise-shaping feedback.
    fn quantize(&mut self, sample: f32, dither: f32) -> u32;
}

/// Hard 1-bit threshold at zero.
#[derive(Debug, Default, Clone)]
pub struct Comparator;

impl Quantizer for Comparator {
    fn quantize(&mut self, sample: f32, dither: f32) -> u32 {
        if sample + dither > 0.0 {
            PAIR_POSITIVE
        } else {
            PAIR_NEGATIVE
        }
    }
}

/// First-order sigma-delta with a two-level output.
#[derive(Debug, Default, Clone)]
pub struct BinarySigmaDelta {
    delta_dly: f32,
}

impl Quantizer for BinarySigmaDelta {
    fn quantize(&mut self, sample: f32, dither: f32) -> u32 {
        let acc = sample + self.delta_dly;
        let (out, pair) = if acc + dither > 0.0 {
            (1.0, PAIR_POSITIVE)
        } else {
            (-1.0, PAIR_NEGATIVE)
        };
        self.delta_dly = acc - out;
        pair
    }
}

/// First-order sigma-delta with a three-level output.
///
/// The middle level alternates between both-low and both-high so that long runs of it
/// stay balanced on the pin pair. The first middle sample is both-low.
#[derive(Debug, Clone)]
pub struct TrinarySigmaDelta {
    delta_dly: f32,
    last_equal_high: bool,
}

impl Default for TrinarySigmaDelta {
    fn default() -> Self {
        Self {
            delta_dly: 0.0,
            last_equal_high: true,
        }
    }
}

impl Quantizer for TrinarySigmaDelta {
    fn quantize(&mut self, sample: f32, dither: f32) -> u32 {
        let acc = sample + self.delta_dly;
        let decision = acc + dither;
        let (out, pair) = if decision > TRINARY_THRESHOLD {
            (1.0, PAIR_POSITIVE)
        } else if decision > -TRINARY_THRESHOLD {
            self.last_equal_high = !self.last_equal_high;
            let pair = if self.last_equal_high {
                PAIR_ZERO_HIGH
            } else {
                PAIR_ZERO_LOW
            };
            (0.0, pair)
        } else {
            (-1.0, PAIR_NEGATIVE)
        };
        self.delta_dly = acc - out;
        pair
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparator_has_no_memory() {
        let mut q = Comparator;
        assert_eq!(q.quantize(0.9, 0.0), PAIR_POSITIVE);
        assert_eq!(q.quantize(0.1, 0.0), PAIR_POSITIVE);
        assert_eq!(q.quantize(-0.1, 0.0), PAIR_NEGATIVE);
        assert_eq!(q.quantize(0.0, 0.0), PAIR_NEGATIVE);
        assert_eq!(q.quantize(-0.1, 0.3), PAIR_POSITIVE);
    }

    #[test]
    fn binary_sigma_delta_tracks_dc_level() {
        // A constant 0.5 input must come out as 3 positives for every negative.
        let mut q = BinarySigmaDelta::default();
        let positives = (0..400)
            .filter(|_| q.quantize(0.5, 0.0) == PAIR_POSITIVE)
            .count();
        assert!((299..=301).contains(&positives), "{positives}");
    }

    #[test]
    fn binary_sigma_delta_feeds_error_back() {
        let mut q = BinarySigmaDelta::default();
        assert_eq!(q.quantize(0.2, 0.0), PAIR_POSITIVE);
        // Error is now -0.8, so the next 0.2 sample lands below zero.
        assert_eq!(q.quantize(0.2, 0.0), PAIR_NEGATIVE);
    }

    #[test]
    fn trinary_middle_level_alternates_starting_low() {
        let mut q = TrinarySigmaDelta::default();
        let pairs: [u32; 4] = core::array::from_fn(|_| q.quantize(0.0, 0.0));
        assert_eq!(
            pairs,
            [PAIR_ZERO_LOW, PAIR_ZERO_HIGH, PAIR_ZERO_LOW, PAIR_ZERO_HIGH]
        );
    }

    #[test]
    fn trinary_uses_third_thresholds() {
        let mut q = TrinarySigmaDelta::default();
        assert_eq!(q.quantize(0.5, 0.0), PAIR_POSITIVE);
        let mut q = TrinarySigmaDelta::default();
        assert_eq!(q.quantize(-0.5, 0.0), PAIR_NEGATIVE);
        let mut q = TrinarySigmaDelta::default();
        assert_eq!(q.quantize(0.3, 0.0), PAIR_ZERO_LOW);
    }
}
