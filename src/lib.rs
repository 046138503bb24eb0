#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod synth;

#[cfg(feature = "rp2040")]
pub mod debug;
#[cfg(feature = "rp2040")]
mod gpio;
#[cfg(feature = "rp2040")]
pub mod rp;
#[cfg(feature = "rp2040")]
pub mod time;
