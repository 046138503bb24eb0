//! Fox-hunt beacon firmware. Brings the RP2040 up at 200 MHz, streams the default
//! carrier out of GPIO 20/21 and keys it on a fixed schedule.

#![no_std]
#![no_main]

use defmt::*;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::{
    bind_interrupts,
    clocks::clk_sys_freq,
    gpio::{Level, Output},
    peripherals::PIO0,
    pio::{InterruptHandler, Pio},
};
use embassy_time::Duration;
use foxtx::{
    debug::StopWatch,
    rp::{overclocked_config, RpStreamEngine, BUFFERS, BUFFER_TABLE, TRANSMIT_ENABLE},
    synth::SynthController,
    time::KeyingTicker,
};
use panic_probe as _;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

const KEY_DOWN: Duration = Duration::from_secs(8);
const KEY_UP: Duration = Duration::from_secs(2);

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Start");
    let p = embassy_rp::init(overclocked_config());
    let cpu_hz = clk_sys_freq();
    info!("System clock {} Hz", cpu_hz);

    let Pio {
        common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let engine = RpStreamEngine::new(
        common,
        sm0,
        p.DMA_CH0,
        p.DMA_CH1,
        p.PIN_20,
        p.PIN_21,
        Output::new(p.PIN_26, Level::Low),
        BUFFER_TABLE.take(),
    );

    let mut synth = SynthController::new(engine, BUFFERS.take(), &TRANSMIT_ENABLE, cpu_hz as f64);
    {
        let _sw = StopWatch::start("apply_settings");
        if let Err(e) = synth.apply_settings() {
            defmt::panic!("Could not start the synthesizer: {}", e);
        }
    }
    info!(
        "{} words, {} periods, {} Hz exact",
        synth.n_words(),
        synth.n_periods(),
        synth.frequency_exact()
    );

    let mut ticker = KeyingTicker::new(KEY_DOWN, KEY_UP);
    loop {
        if ticker.next().await {
            synth.enable_output();
        } else {
            synth.disable_output();
        }
    }
}
