use core::cell::RefCell;

use embassy_rp::{gpio::Output, interrupt, interrupt::InterruptExt, pac};
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use super::dma::slot_address;
use crate::synth::{
    BufferSlot, Indicator, OutputStateMachine, TransferChannel, TransmitEnable,
};

/// Key-down flag. The one value the foreground changes while the stream runs.
pub static TRANSMIT_ENABLE: TransmitEnable = TransmitEnable::new();

/// Everything DMA_IRQ_1 touches. The foreground only writes this while the stream is
/// halted, so the lock never contends with a running chain.
static STREAM_IRQ: Mutex<CriticalSectionRawMutex, RefCell<Option<StreamIrq>>> =
    Mutex::new(RefCell::new(None));

struct StreamIrq {
    channel: ControlChannel,
    machine: OutputStateMachine,
    indicator: Output<'static>,
}

struct ControlChannel {
    number: u8,
    table: u32,
}

impl TransferChannel for ControlChannel {
    fn acknowledge(&mut self) {
        pac::DMA.ints1().write_value(1 << self.number);
    }

    fn is_busy(&self) -> bool {
        pac::DMA.ch(self.number as _).ctrl_trig().read().busy()
    }

    fn queue(&mut self, slot: BufferSlot) {
        pac::DMA
            .ch(self.number as _)
            .read_addr()
            .write_value(slot_address(self.table, slot));
    }
}

/// Hands the indicator pin to the interrupt side and unmasks DMA_IRQ_1.
pub fn install(indicator: Output<'static>) {
    STREAM_IRQ.lock(|irq| {
        irq.replace(Some(StreamIrq {
            channel: ControlChannel {
                number: 0,
                table: 0,
            },
            machine: OutputStateMachine::new(),
            indicator,
        }));
    });
    interrupt::DMA_IRQ_1.unpend();
    unsafe { interrupt::DMA_IRQ_1.enable() };
}

/// Points the handler at a freshly programmed chain and resets it to silent.
pub fn attach(control: u8, table: u32) {
    STREAM_IRQ.lock(|irq| {
        if let Some(irq) = irq.borrow_mut().as_mut() {
            irq.channel = ControlChannel {
                number: control,
                table,
            };
            irq.machine.reset();
            irq.indicator.set_active(false);
        }
    });
}

#[interrupt]
fn DMA_IRQ_1() {
    STREAM_IRQ.lock(|irq| {
        if let Some(irq) = irq.borrow_mut().as_mut() {
            let StreamIrq {
                channel,
                machine,
                indicator,
            } = irq;
            machine.on_transfer_complete(channel, indicator, &TRANSMIT_ENABLE);
        }
    });
}
