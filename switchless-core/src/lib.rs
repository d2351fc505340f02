#![cfg_attr(not(feature = "std"), no_std)]

//! # Switchless Core
//!
//! Single-button region and 50/60Hz switch for game consoles.
//! A short press resets the console, a medium press toggles the video
//! standard and a long press cycles through the regions.

pub mod types;
pub mod hal;
pub mod timing;
pub mod outputs;
pub mod display;
pub mod store;
pub mod fsm;
pub mod controller;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;


pub use types::*;
pub use fsm::*;
pub use controller::*;
pub use hal::{ButtonInput, DelayNs, Field, HalError, Line, NonVolatileStore, OutputPort, ResetLine, SwitchlessHal};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings of a freshly burned store
pub fn factory_settings() -> Settings {
    Settings::default()
}
