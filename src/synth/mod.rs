//! Waveform synthesis and streaming: rational frequency approximation, buffer filling,
//! the transfer-complete state machine and the controller tying them to the hardware.

pub mod buffers;
pub mod clkdiv;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod mode;
pub mod output;
pub mod quantize;
pub mod rational;

pub use buffers::{BufferSlot, FillParams, WaveformBuffers, SAMPLES_PER_WORD};
pub use config::{limits, SynthConfig, BUFFER_CAPACITY, DEFAULT_CPU_HZ};
pub use controller::{StatusReport, SynthController, MAX_ABORT_ATTEMPTS};
pub use engine::StreamEngine;
pub use error::SynthError;
pub use mode::Mode;
pub use output::{
    Indicator, OutputState, OutputStateMachine, TransferChannel, Transition, TransmitEnable,
};
pub use rational::{approximate, Rational};
