use foxtx::synth::{
    quantize::{PAIR_NEGATIVE, PAIR_POSITIVE, PAIR_ZERO_HIGH, PAIR_ZERO_LOW},
    BufferSlot, FillParams, Mode, WaveformBuffers, SAMPLES_PER_WORD,
};
use proptest::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};

const CAP: usize = 256;

fn params(mode: Mode) -> FillParams {
    FillParams {
        n_words: 200,
        n_periods: 37,
        amplitude: 1.0,
        dither_amplitude: 0.0,
        hd3_amplitude: 0.0,
        hd3_phase: 0.0,
        mode,
    }
}

fn filled(params: &FillParams) -> Box<WaveformBuffers<CAP>> {
    let mut buffers = Box::new(WaveformBuffers::<CAP>::new());
    buffers.fill(params, &mut SmallRng::seed_from_u64(0x5eed));
    buffers
}

fn pairs(words: &[u32]) -> Vec<u32> {
    words
        .iter()
        .flat_map(|&w| (0..SAMPLES_PER_WORD).map(move |j| (w >> (2 * j)) & 0b11))
        .collect()
}

/// Correlation of the output levels with the carrier, one term per sample.
fn carrier_correlation(pairs: &[u32], first_sample: usize, params: &FillParams) -> f64 {
    let n_samples = u64::from(params.n_words * SAMPLES_PER_WORD);
    pairs
        .iter()
        .enumerate()
        .map(|(k, &pair)| {
            let level = match pair {
                PAIR_POSITIVE => 1.0,
                PAIR_NEGATIVE => -1.0,
                _ => 0.0,
            };
            let i = (first_sample + k) as u64;
            let position = (i * u64::from(params.n_periods)) % n_samples;
            level * (2.0 * std::f64::consts::PI * position as f64 / n_samples as f64).sin()
        })
        .sum()
}

fn active(pairs: &[u32]) -> usize {
    pairs
        .iter()
        .filter(|&&p| p == PAIR_POSITIVE || p == PAIR_NEGATIVE)
        .count()
}

#[test]
fn tail_past_n_words_stays_zero() {
    for mode in Mode::ALL {
        let buffers = filled(&params(mode));
        for slot in BufferSlot::ALL {
            let tail = &buffers.buffer(slot)[buffers.n_words()..];
            assert!(tail.iter().all(|&w| w == 0), "{mode:?} {slot:?}");
        }
    }
}

#[test]
fn silent_buffer_is_all_zero() {
    for mode in Mode::ALL {
        let buffers = filled(&params(mode));
        assert!(buffers.buffer(BufferSlot::Silent).iter().all(|&w| w == 0));
    }
}

#[test]
fn hard_keyed_modes_copy_steady_into_ramp_up() {
    for mode in [
        Mode::Comparator,
        Mode::BinarySigmaDelta,
        Mode::TrinarySigmaDelta,
    ] {
        let buffers = filled(&params(mode));
        assert_eq!(buffers.n_words(), 200);
        assert_eq!(
            buffers.words(BufferSlot::RampUp),
            buffers.words(BufferSlot::Steady)
        );
        assert!(buffers.words(BufferSlot::RampDown).iter().all(|&w| w == 0));
    }
}

#[test]
fn binary_modes_only_emit_full_scale_pairs() {
    for mode in [
        Mode::Comparator,
        Mode::BinarySigmaDelta,
        Mode::ClickFreeBinarySigmaDelta,
    ] {
        let buffers = filled(&params(mode));
        for slot in [BufferSlot::Steady, BufferSlot::RampUp] {
            let all = pairs(buffers.words(slot));
            assert_eq!(active(&all), all.len(), "{mode:?} {slot:?}");
        }
    }
}

#[test]
fn trinary_silence_alternates_both_low_and_both_high() {
    let mut p = params(Mode::ClickFreeTrinarySigmaDelta);
    p.amplitude = 0.0;
    let buffers = filled(&p);
    for slot in [BufferSlot::Steady, BufferSlot::RampUp, BufferSlot::RampDown] {
        let all = pairs(buffers.words(slot));
        for (i, &pair) in all.iter().enumerate() {
            let expected = if i % 2 == 0 {
                PAIR_ZERO_LOW
            } else {
                PAIR_ZERO_HIGH
            };
            assert_eq!(pair, expected, "{slot:?} sample {i}");
        }
    }
}

#[test]
fn click_free_ramps_follow_the_taper() {
    for mode in [
        Mode::ClickFreeTrinarySigmaDelta,
        Mode::ClickFreeBinarySigmaDelta,
    ] {
        let p = params(mode);
        let buffers = filled(&p);
        let n = buffers.n_words();
        let edge = n / 10;

        // The envelope shows up in how strongly each end tracks the carrier.
        let up = pairs(buffers.words(BufferSlot::RampUp));
        let down = pairs(buffers.words(BufferSlot::RampDown));
        let samples = edge * SAMPLES_PER_WORD as usize;
        let tail = up.len() - samples;
        let up_start = carrier_correlation(&up[..samples], 0, &p);
        let up_end = carrier_correlation(&up[tail..], tail, &p);
        let down_start = carrier_correlation(&down[..samples], 0, &p);
        let down_end = carrier_correlation(&down[tail..], tail, &p);
        assert!(up_start.abs() * 4.0 < up_end, "{mode:?}: {up_start} vs {up_end}");
        assert!(
            down_end.abs() * 4.0 < down_start,
            "{mode:?}: {down_start} vs {down_end}"
        );

        if mode == Mode::ClickFreeTrinarySigmaDelta {
            let up_start = active(&up[..samples]);
            let up_end = active(&up[up.len() - samples..]);
            let down_start = active(&down[..samples]);
            let down_end = active(&down[down.len() - samples..]);
            assert!(up_start * 4 < up_end, "{up_start} vs {up_end}");
            assert!(down_end * 4 < down_start, "{down_start} vs {down_end}");
        }

        // Tapered, so never a plain copy of steady.
        assert_ne!(
            buffers.words(BufferSlot::RampUp),
            buffers.words(BufferSlot::Steady)
        );
        assert!(buffers.words(BufferSlot::RampDown).iter().any(|&w| w != 0));
    }
}

#[test]
fn clkdiv_produces_no_samples() {
    let buffers = filled(&params(Mode::ClkDiv));
    assert_eq!(buffers.n_words(), 0);
    assert!(buffers.words(BufferSlot::Steady).is_empty());
}

#[test]
fn same_seed_same_buffers() {
    let mut p = params(Mode::ClickFreeTrinarySigmaDelta);
    p.dither_amplitude = 1.0;
    p.hd3_amplitude = 0.045;
    p.hd3_phase = -0.61;
    let a = filled(&p);
    let b = filled(&p);
    for slot in BufferSlot::ALL {
        assert_eq!(a.buffer(slot), b.buffer(slot));
    }
}

proptest! {
    #[test]
    fn every_pair_is_a_legal_level(
        n_words in 1u32..300,
        n_periods in 0u32..2000,
        amplitude in 0.0f32..=2.0,
        dither in 0.0f32..=2.0,
        hd3 in -0.5f32..=0.5,
        mode in 1u8..=5,
        seed in any::<u64>(),
    ) {
        let mode = Mode::try_from(mode).unwrap();
        let mut buffers = Box::new(WaveformBuffers::<CAP>::new());
        buffers.fill(
            &FillParams {
                n_words,
                n_periods,
                amplitude,
                dither_amplitude: dither,
                hd3_amplitude: hd3,
                hd3_phase: 0.3,
                mode,
            },
            &mut SmallRng::seed_from_u64(seed),
        );
        prop_assert_eq!(buffers.n_words(), (n_words as usize).min(CAP));
        let trinary = matches!(
            mode,
            Mode::TrinarySigmaDelta | Mode::ClickFreeTrinarySigmaDelta
        );
        for slot in [BufferSlot::Steady, BufferSlot::RampUp] {
            for pair in pairs(buffers.words(slot)) {
                prop_assert!(trinary || pair == PAIR_POSITIVE || pair == PAIR_NEGATIVE);
            }
        }
    }
}
