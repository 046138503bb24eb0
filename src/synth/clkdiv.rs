//! CLKDIV mode: the PIO toggles the RF pair every divided clock, so the output frequency
//! is `cpu / (2 * divider)` with the divider in 1/256 steps.

use fixed::types::U24F8;

/// Smallest divider the PIO accepts.
const MIN_DIVIDER_BITS: u32 = 1 << 8;
/// Largest divider the PIO accepts, 65535 + 255/256.
const MAX_DIVIDER_BITS: u32 = 0x00FF_FFFF;

/// Divider closest to producing `frequency`, rounded to the nearest 1/256.
pub fn clock_divider(cpu_hz: f64, frequency: f64) -> U24F8 {
    if !(frequency > 0.0) {
        return U24F8::from_bits(MAX_DIVIDER_BITS);
    }
    let steps = 256.0 * cpu_hz / (2.0 * frequency) + 0.5;
    let bits = if steps >= MAX_DIVIDER_BITS as f64 {
        MAX_DIVIDER_BITS
    } else {
        steps as u32
    };
    U24F8::from_bits(bits.max(MIN_DIVIDER_BITS))
}

/// Frequency the PIO actually produces with `divider`.
pub fn clkdiv_frequency(cpu_hz: f64, divider: U24F8) -> f64 {
    cpu_hz / (2.0 * divider.to_num::<f64>())
}

/// Divider as `integer + fraction/256`, the way the status page shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DividerReadout {
    pub integer: u32,
    pub fraction: u8,
}

impl From<U24F8> for DividerReadout {
    fn from(divider: U24F8) -> Self {
        let bits = divider.to_bits();
        Self {
            integer: bits >> 8,
            fraction: (bits & 0xFF) as u8,
        }
    }
}
