//! Host-side integration tests for the switchless mod
//!
//! - `gesture_tests`: press scenarios end to end on the mock board
//! - `persistence_tests`: load/save properties over arbitrary store bytes
//! - `adapter_tests`: embedded-hal adapters against mocked pins

mod adapter_tests;
mod gesture_tests;
mod persistence_tests;
