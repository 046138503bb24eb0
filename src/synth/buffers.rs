//! The four DMA sample buffers and the code that fills them.
//!
//! Every 32-bit word carries 16 samples as differential bit pairs, sample `j` in bits
//! `2j` and `2j + 1`, least significant pair first. The PIO shifts words out to the right
//! two bits per clock, so a buffer of `n_words` words lasts `16 * n_words` system clocks.

use core::f32::consts::PI;

use micromath::F32Ext;
use rand::{Rng, RngCore};

use super::{
    mode::Mode,
    quantize::{BinarySigmaDelta, Comparator, Quantizer, TrinarySigmaDelta},
};

pub const SAMPLES_PER_WORD: u32 = 16;

/// Keeps samples off exact zero crossings, where the quantizer decision would be biased.
const ZERO_CROSSING_OFFSET: f32 = 1e-5;

/// Which of the four buffers the DMA streams next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferSlot {
    Silent = 0,
    Steady = 1,
    RampUp = 2,
    RampDown = 3,
}

impl BufferSlot {
    pub const ALL: [BufferSlot; 4] = [
        BufferSlot::Silent,
        BufferSlot::Steady,
        BufferSlot::RampUp,
        BufferSlot::RampDown,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Synthesis parameters for one fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillParams {
    pub n_words: u32,
    pub n_periods: u32,
    pub amplitude: f32,
    pub dither_amplitude: f32,
    pub hd3_amplitude: f32,
    pub hd3_phase: f32,
    pub mode: Mode,
}

/// The silent, steady, ramp-up and ramp-down buffers, `CAP` words each.
///
/// Only the first `n_words()` words of each buffer are streamed; everything past that is
/// kept zero.
#[repr(C, align(4))]
pub struct WaveformBuffers<const CAP: usize> {
    buffers: [[u32; CAP]; 4],
    n_words: usize,
}

impl<const CAP: usize> WaveformBuffers<CAP> {
    pub const fn new() -> Self {
        Self {
            buffers: [[0; CAP]; 4],
            n_words: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Number of meaningful words left by the last fill.
    pub fn n_words(&self) -> usize {
        self.n_words
    }

    /// The whole buffer, tail included.
    pub fn buffer(&self, slot: BufferSlot) -> &[u32; CAP] {
        &self.buffers[slot.index()]
    }

    /// The part of the buffer the DMA streams.
    pub fn words(&self, slot: BufferSlot) -> &[u32] {
        &self.buffers[slot.index()][..self.n_words]
    }

    /// Regenerates all four buffers. The caller must make sure nothing is streaming from
    /// them while this runs.
    ///
    /// `n_words` beyond `CAP` is truncated. In [`Mode::ClkDiv`] everything is zeroed.
    pub fn fill<R: RngCore>(&mut self, params: &FillParams, rng: &mut R) {
        for buffer in self.buffers.iter_mut() {
            buffer.fill(0);
        }
        self.n_words = (params.n_words as usize).min(CAP);

        match params.mode {
            Mode::ClkDiv => self.n_words = 0,
            Mode::Comparator => self.synthesize::<Comparator, R>(params, rng),
            Mode::BinarySigmaDelta | Mode::ClickFreeBinarySigmaDelta => {
                self.synthesize::<BinarySigmaDelta, R>(params, rng)
            }
            Mode::TrinarySigmaDelta | Mode::ClickFreeTrinarySigmaDelta => {
                self.synthesize::<TrinarySigmaDelta, R>(params, rng)
            }
        }
    }

    fn synthesize<Q: Quantizer + Default, R: RngCore>(&mut self, params: &FillParams, rng: &mut R) {
        let n_words = self.n_words;
        if n_words == 0 {
            return;
        }
        let click_free = params.mode.is_click_free();
        let n_samples = n_words as u64 * u64::from(SAMPLES_PER_WORD);
        let phase = PhaseAccumulator::new(params.n_periods, n_samples);

        let mut steady = Q::default();
        let mut ramp_up = Q::default();
        let mut ramp_down = Q::default();

        let [_, steady_buf, ramp_up_buf, ramp_down_buf] = &mut self.buffers;

        for word_index in 0..n_words {
            let mut word = 0u32;
            let mut word_up = 0u32;
            let mut word_down = 0u32;

            for pair in 0..SAMPLES_PER_WORD {
                let i = word_index as u64 * u64::from(SAMPLES_PER_WORD) + u64::from(pair);
                let theta = phase.at(i) + ZERO_CROSSING_OFFSET;
                let sample = params.amplitude * F32Ext::sin(theta)
                    + params.hd3_amplitude * F32Ext::sin(3.0 * theta + params.hd3_phase);
                let dither = (rng.gen::<f32>() - 0.5) * 2.0 * params.dither_amplitude;

                let shift = 2 * pair;
                word |= steady.quantize(sample, dither) << shift;
                if click_free {
                    let x = i as f32 / n_samples as f32;
                    word_up |= ramp_up.quantize(sample * taper(x), dither) << shift;
                    word_down |= ramp_down.quantize(sample * taper(1.0 - x), dither) << shift;
                }
            }

            steady_buf[word_index] = word;
            if click_free {
                ramp_up_buf[word_index] = word_up;
                ramp_down_buf[word_index] = word_down;
            } else {
                // Hard keying: go straight to the carrier and straight to silence.
                ramp_up_buf[word_index] = word;
            }
        }
    }
}

impl<const CAP: usize> Default for WaveformBuffers<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

/// Raised-cosine taper, 0 at `x = 0` rising to 1 at `x = 1`.
pub fn taper(x: f32) -> f32 {
    0.5 * (1.0 - F32Ext::cos(PI * x))
}

/// Phase of sample `i` for `n_periods` whole periods over `n_samples` samples.
///
/// The reduction modulo one period is done in integers so the phase handed to `sin`
/// never grows large enough for `f32` to lose resolution.
struct PhaseAccumulator {
    n_periods: u64,
    n_samples: u64,
}

impl PhaseAccumulator {
    fn new(n_periods: u32, n_samples: u64) -> Self {
        Self {
            n_periods: u64::from(n_periods),
            n_samples,
        }
    }

    fn at(&self, i: u64) -> f32 {
        let position = (i * self.n_periods) % self.n_samples;
        (2.0 * core::f64::consts::PI * position as f64 / self.n_samples as f64) as f32
    }
}
