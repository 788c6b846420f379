//! Keyboard Latency - layout visualizer and per-key latency tester
//!
//! An OS keyboard hook on a dedicated thread timestamps every press and
//! release, optionally keeps layout keys from reaching the system, and hands
//! the events over a queue to a terminal UI that colors the keys of the
//! active layout and logs press-to-release latency.

pub mod capture;
pub mod config;
pub mod keyboard;
pub mod logging;
pub mod tests;
pub mod ui;
pub mod utils;

pub use config::Config;
