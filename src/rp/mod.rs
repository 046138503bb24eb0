//! RP2040 side of the synthesizer: PIO0 state machine 0 fed by a chained DMA pair, and
//! the DMA_IRQ_1 handler that walks the output state machine.

use embassy_rp::{
    clocks::{ClockConfig, PllConfig},
    config::Config,
};
use static_cell::ConstStaticCell;

use crate::synth::{WaveformBuffers, BUFFER_CAPACITY};

pub mod dma;
pub mod engine;
pub mod irq;

pub use engine::RpStreamEngine;
pub use irq::TRANSMIT_ENABLE;

/// Sample storage. Too large for any stack, and the DMA reads it for as long as the
/// firmware runs.
pub static BUFFERS: ConstStaticCell<WaveformBuffers<BUFFER_CAPACITY>> =
    ConstStaticCell::new(WaveformBuffers::new());

/// Addresses of the four buffers, read by the DMA control channel.
pub static BUFFER_TABLE: ConstStaticCell<[u32; 4]> = ConstStaticCell::new([0; 4]);

const XOSC_HZ: u32 = 12_000_000;

/// 12 MHz crystal, VCO at 1200 MHz, divided by 6 for a 200 MHz system clock.
pub fn overclocked_config() -> Config {
    let mut clocks = ClockConfig::crystal(XOSC_HZ);
    if let Some(xosc) = clocks.xosc.as_mut() {
        xosc.sys_pll = Some(PllConfig {
            refdiv: 1,
            fbdiv: 100,
            post_div1: 6,
            post_div2: 1,
        });
    }
    Config::new(clocks)
}
