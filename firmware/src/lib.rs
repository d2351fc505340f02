//! CH32V003 board support for the switchless mod
#![no_std]

pub mod ch32v003_hardware;
pub mod time_driver;

pub use ch32v003_hardware::{init_board, Ch32v003Board};
