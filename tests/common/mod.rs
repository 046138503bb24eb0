#![allow(dead_code)]

use fixed::types::U24F8;
use foxtx::synth::{BufferSlot, Indicator, StreamEngine, TransferChannel, WaveformBuffers};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    DisableTriggers,
    Abort,
    Release,
    Unload,
    LoadClockDivider(U24F8),
    LoadSerializer,
    Arm { n_words: usize },
    PinsDriven(bool),
    RestorePins,
}

/// Records every call. `busy_polls` is how many `is_busy` polls report busy before the
/// channels go idle; `None` never goes idle.
pub struct MockEngine {
    pub events: Vec<EngineEvent>,
    pub streaming: bool,
    pub busy_polls: Option<u32>,
    polls: std::cell::Cell<u32>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            streaming: false,
            busy_polls: Some(0),
            polls: std::cell::Cell::new(0),
        }
    }

    pub fn stuck() -> Self {
        Self {
            busy_polls: None,
            ..Self::new()
        }
    }

    pub fn count(&self, event: EngineEvent) -> usize {
        self.events.iter().filter(|&&e| e == event).count()
    }

    pub fn position(&self, event: EngineEvent) -> Option<usize> {
        self.events.iter().position(|&e| e == event)
    }
}

impl StreamEngine for MockEngine {
    fn is_streaming(&self) -> bool {
        self.streaming
    }

    fn disable_triggers(&mut self) {
        self.events.push(EngineEvent::DisableTriggers);
    }

    fn abort(&mut self) {
        self.events.push(EngineEvent::Abort);
    }

    fn is_busy(&self) -> bool {
        let polls = self.polls.get() + 1;
        self.polls.set(polls);
        match self.busy_polls {
            Some(busy) => polls <= busy,
            None => true,
        }
    }

    fn release(&mut self) {
        self.events.push(EngineEvent::Release);
        self.streaming = false;
        self.polls.set(0);
    }

    fn unload_program(&mut self) {
        self.events.push(EngineEvent::Unload);
    }

    fn load_clock_divider(&mut self, divider: U24F8) {
        self.events.push(EngineEvent::LoadClockDivider(divider));
    }

    fn load_serializer(&mut self) {
        self.events.push(EngineEvent::LoadSerializer);
    }

    fn arm<const CAP: usize>(&mut self, buffers: &WaveformBuffers<CAP>) {
        self.events.push(EngineEvent::Arm {
            n_words: buffers.n_words(),
        });
        self.streaming = true;
    }

    fn set_pins_driven(&mut self, driven: bool) {
        self.events.push(EngineEvent::PinsDriven(driven));
    }

    fn restore_out_pins(&mut self) {
        self.events.push(EngineEvent::RestorePins);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    Acknowledge,
    Queue(BufferSlot),
}

#[derive(Default)]
pub struct MockChannel {
    pub events: Vec<ChannelEvent>,
    pub busy: bool,
}

impl MockChannel {
    pub fn queued(&self) -> Vec<BufferSlot> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ChannelEvent::Queue(slot) => Some(*slot),
                ChannelEvent::Acknowledge => None,
            })
            .collect()
    }
}

impl TransferChannel for MockChannel {
    fn acknowledge(&mut self) {
        self.events.push(ChannelEvent::Acknowledge);
    }

    fn is_busy(&self) -> bool {
        self.busy
    }

    fn queue(&mut self, slot: BufferSlot) {
        self.events.push(ChannelEvent::Queue(slot));
    }
}

#[derive(Default)]
pub struct MockIndicator {
    pub history: Vec<bool>,
}

impl Indicator for MockIndicator {
    fn set_active(&mut self, active: bool) {
        self.history.push(active);
    }
}
