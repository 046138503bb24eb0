//! Raw register access for the chained DMA pair.
//!
//! The data channel copies one buffer into the PIO TX FIFO and chains to the control
//! channel. The control channel copies a single buffer address out of the slot table
//! into the data channel's trigger alias, which restarts it on that buffer, and raises
//! DMA_IRQ_1 so the handler can point it at the next table entry.

use embassy_rp::pac::{
    self,
    dma::vals::{DataSize, TreqSel},
};

use crate::synth::BufferSlot;

/// DREQ of PIO0 state machine 0's TX FIFO.
pub const DREQ_PIO0_TX0: u8 = 0;

#[derive(Clone, Copy)]
pub struct ChainedChannels {
    pub data: u8,
    pub control: u8,
}

impl ChainedChannels {
    fn mask(&self) -> u32 {
        (1 << self.data) | (1 << self.control)
    }

    /// Programs both channels and triggers the control channel, which starts the data
    /// channel on whatever `table[Silent]` points at.
    pub fn start(&self, fifo: u32, dreq: u8, table: u32, n_words: u32) {
        let data = pac::DMA.ch(self.data as _);
        let control = pac::DMA.ch(self.control as _);

        data.read_addr().write_value(0);
        data.write_addr().write_value(fifo);
        data.trans_count().write_value(n_words);
        data.al1_ctrl().write(|w| {
            w.set_data_size(DataSize::SIZE_WORD);
            w.set_incr_read(true);
            w.set_incr_write(false);
            w.set_treq_sel(TreqSel::from(dreq));
            w.set_chain_to(self.control);
            w.set_irq_quiet(true);
            w.set_en(true);
        });

        control.read_addr().write_value(slot_address(table, BufferSlot::Silent));
        control
            .write_addr()
            .write_value(data.al3_read_addr_trig().as_ptr() as u32);
        control.trans_count().write_value(1);

        pac::DMA.ints1().write_value(1 << self.control);
        pac::DMA.inte1().modify(|w| *w |= 1 << self.control);

        control.ctrl_trig().write(|w| {
            w.set_data_size(DataSize::SIZE_WORD);
            w.set_incr_read(true);
            w.set_incr_write(false);
            w.set_treq_sel(TreqSel::PERMANENT);
            // Chaining to itself means no chaining.
            w.set_chain_to(self.control);
            w.set_irq_quiet(false);
            w.set_en(true);
        });
    }

    pub fn disable_triggers(&self) {
        for ch in [self.data, self.control] {
            pac::DMA.ch(ch as _).al1_ctrl().modify(|w| w.set_en(false));
        }
    }

    pub fn abort(&self) {
        pac::DMA
            .chan_abort()
            .write(|w| w.set_chan_abort(self.mask() as u16));
    }

    pub fn is_busy(&self) -> bool {
        [self.data, self.control]
            .iter()
            .any(|&ch| pac::DMA.ch(ch as _).ctrl_trig().read().busy())
    }

    /// Masks and clears the control channel's interrupt.
    pub fn quiesce(&self) {
        pac::DMA.inte1().modify(|w| *w &= !(1 << self.control));
        pac::DMA.ints1().write_value(1 << self.control);
    }
}

/// Address of the table entry holding `slot`'s buffer address.
pub fn slot_address(table: u32, slot: BufferSlot) -> u32 {
    table + 4 * slot.index() as u32
}
