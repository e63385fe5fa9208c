//! CLI library components for the validator withdrawals monitor.

pub mod input;
pub mod logging;
pub mod render;
