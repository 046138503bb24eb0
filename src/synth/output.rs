//! Buffer selection on DMA transfer completion.
//!
//! The only state shared live with the interrupt is [`TransmitEnable`]. The output state
//! itself belongs to the interrupt handler; the foreground only resets it while the
//! stream is halted.

use portable_atomic::{AtomicBool, Ordering};

use super::buffers::BufferSlot;

/// Key-down flag written by the foreground and read by the interrupt handler.
pub struct TransmitEnable(AtomicBool);

impl TransmitEnable {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn enable(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn disable(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for TransmitEnable {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputState {
    Silent,
    Transmitting,
}

/// The control half of the chained DMA, as seen from the interrupt handler.
pub trait TransferChannel {
    /// Clears this channel's pending interrupt flag.
    fn acknowledge(&mut self);

    fn is_busy(&self) -> bool;

    /// Points the next restart at `slot`'s buffer without triggering anything.
    fn queue(&mut self, slot: BufferSlot);
}

/// Key-down indicator output, driven on every silent/transmitting edge.
pub trait Indicator {
    fn set_active(&mut self, active: bool);
}

/// What to stream next, and whether the indicator has to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub slot: BufferSlot,
    pub indicator: Option<bool>,
}

/// Silent/transmitting latch. Every edge passes through exactly one ramp buffer.
#[derive(Debug)]
pub struct OutputStateMachine {
    state: OutputState,
}

impl OutputStateMachine {
    pub const fn new() -> Self {
        Self {
            state: OutputState::Silent,
        }
    }

    pub fn state(&self) -> OutputState {
        self.state
    }

    /// Back to silent, for a freshly armed stream that starts on the silent buffer.
    pub fn reset(&mut self) {
        self.state = OutputState::Silent;
    }

    /// Picks the buffer to follow the one that just finished.
    pub fn advance(&mut self, transmit: bool) -> Transition {
        match (self.state, transmit) {
            (OutputState::Transmitting, true) => Transition {
                slot: BufferSlot::Steady,
                indicator: None,
            },
            (OutputState::Silent, true) => {
                self.state = OutputState::Transmitting;
                Transition {
                    slot: BufferSlot::RampUp,
                    indicator: Some(true),
                }
            }
            (OutputState::Silent, false) => Transition {
                slot: BufferSlot::Silent,
                indicator: None,
            },
            (OutputState::Transmitting, false) => {
                self.state = OutputState::Silent;
                Transition {
                    slot: BufferSlot::RampDown,
                    indicator: Some(false),
                }
            }
        }
    }

    /// Interrupt body. The interrupt is acknowledged first, busy or not, so a late
    /// completion can never leave the line pending.
    pub fn on_transfer_complete<C, I>(
        &mut self,
        channel: &mut C,
        indicator: &mut I,
        transmit: &TransmitEnable,
    ) -> Option<Transition>
    where
        C: TransferChannel,
        I: Indicator,
    {
        channel.acknowledge();
        if channel.is_busy() {
            return None;
        }

        let transition = self.advance(transmit.is_enabled());
        channel.queue(transition.slot);
        if let Some(active) = transition.indicator {
            indicator.set_active(active);
        }
        Some(transition)
    }
}

impl Default for OutputStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
