use core::sync::atomic::{compiler_fence, Ordering};

use embassy_rp::{
    dma::{AnyChannel, Channel},
    gpio::Output,
    into_ref, pac,
    peripherals::PIO0,
    pio::{
        Common, Config, Direction, FifoJoin, LoadedProgram, Pin, PioPin, ShiftConfig,
        ShiftDirection, StateMachine,
    },
    Peripheral, PeripheralRef,
};
use fixed::types::U24F8;
use fixed_macro::fixed;

use super::{
    dma::{ChainedChannels, DREQ_PIO0_TX0},
    irq,
};
use crate::synth::{BufferSlot, StreamEngine, WaveformBuffers};

/// PIO0 function select in IO_BANK0.
const PIO0_FUNCSEL: u8 = 6;

/// PIO0 state machine 0 plus the two DMA channels that feed it.
pub struct RpStreamEngine<'d> {
    common: Common<'d, PIO0>,
    sm: StateMachine<'d, PIO0, 0>,
    rf_pins: [Pin<'d, PIO0>; 2],
    program: Option<LoadedProgram<'d, PIO0>>,
    _data_dma: PeripheralRef<'d, AnyChannel>,
    _control_dma: PeripheralRef<'d, AnyChannel>,
    channels: ChainedChannels,
    /// Buffer addresses the control channel copies from, indexed by `BufferSlot`.
    slot_table: &'static mut [u32; 4],
    streaming: bool,
}

impl<'d> RpStreamEngine<'d> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mut common: Common<'d, PIO0>,
        sm: StateMachine<'d, PIO0, 0>,
        data_dma: impl Peripheral<P = impl Channel> + 'd,
        control_dma: impl Peripheral<P = impl Channel> + 'd,
        first_rf_pin: impl PioPin,
        second_rf_pin: impl PioPin,
        indicator: Output<'static>,
        slot_table: &'static mut [u32; 4],
    ) -> Self {
        into_ref!(data_dma, control_dma);
        let channels = ChainedChannels {
            data: data_dma.number(),
            control: control_dma.number(),
        };
        let rf_pins = [
            common.make_pio_pin(first_rf_pin),
            common.make_pio_pin(second_rf_pin),
        ];
        irq::install(indicator);

        Self {
            common,
            sm,
            rf_pins,
            program: None,
            _data_dma: data_dma.map_into(),
            _control_dma: control_dma.map_into(),
            channels,
            slot_table,
            streaming: false,
        }
    }

    fn load(&mut self, loaded: LoadedProgram<'d, PIO0>, cfg: Config<'d, PIO0>) {
        self.sm.set_config(&cfg);
        self.sm.clear_fifos();
        self.sm.clkdiv_restart();
        self.sm.restart();
        self.program = Some(loaded);
        self.sm.set_enable(true);
    }
}

impl<'d> StreamEngine for RpStreamEngine<'d> {
    fn is_streaming(&self) -> bool {
        self.streaming
    }

    fn disable_triggers(&mut self) {
        self.channels.disable_triggers();
    }

    fn abort(&mut self) {
        self.channels.abort();
    }

    fn is_busy(&self) -> bool {
        self.channels.is_busy()
    }

    fn release(&mut self) {
        self.channels.quiesce();
        self.streaming = false;
    }

    fn unload_program(&mut self) {
        self.sm.set_enable(false);
        if let Some(program) = self.program.take() {
            // The state machine is stopped, nothing executes from this memory any more.
            unsafe { self.common.free_instr(program.used_memory) };
        }
    }

    fn load_clock_divider(&mut self, divider: U24F8) {
        let program = pio_proc::pio_file!("src/rp/toggle.pio").program;
        let loaded = self.common.load_program(&program);

        let mut cfg = Config::default();
        cfg.use_program(&loaded, &[]);
        cfg.set_set_pins(&[&self.rf_pins[0], &self.rf_pins[1]]);
        cfg.clock_divider = divider;
        self.load(loaded, cfg);
    }

    fn load_serializer(&mut self) {
        let program = pio_proc::pio_file!("src/rp/serializer.pio").program;
        let loaded = self.common.load_program(&program);

        let mut cfg = Config::default();
        cfg.use_program(&loaded, &[]);
        cfg.set_out_pins(&[&self.rf_pins[0], &self.rf_pins[1]]);
        cfg.clock_divider = fixed!(1: U24F8);
        cfg.fifo_join = FifoJoin::TxOnly;
        cfg.shift_out = ShiftConfig {
            auto_fill: true,
            threshold: 32,
            direction: ShiftDirection::Right,
        };
        self.sm
            .set_pin_dirs(Direction::Out, &[&self.rf_pins[0], &self.rf_pins[1]]);
        self.load(loaded, cfg);
    }

    fn arm<const CAP: usize>(&mut self, buffers: &WaveformBuffers<CAP>) {
        for slot in BufferSlot::ALL {
            self.slot_table[slot.index()] = buffers.buffer(slot).as_ptr() as u32;
        }
        let table = self.slot_table.as_ptr() as u32;
        // Buffer and table writes must land before the DMA can read them.
        compiler_fence(Ordering::SeqCst);
        cortex_m::asm::dsb();

        irq::attach(self.channels.control, table);
        self.channels.start(
            pac::PIO0.txf(0).as_ptr() as u32,
            DREQ_PIO0_TX0,
            table,
            buffers.n_words() as u32,
        );
        self.streaming = true;
    }

    fn set_pins_driven(&mut self, driven: bool) {
        let dir = if driven { Direction::Out } else { Direction::In };
        self.sm
            .set_pin_dirs(dir, &[&self.rf_pins[0], &self.rf_pins[1]]);
    }

    fn restore_out_pins(&mut self) {
        for pin in &self.rf_pins {
            pac::IO_BANK0
                .gpio(pin.pin() as usize)
                .ctrl()
                .write(|w| w.set_funcsel(PIO0_FUNCSEL));
        }
    }
}
