//! Library side of the `hts-schedule` binary.

pub mod config;
pub mod logging;
pub mod pipeline;
