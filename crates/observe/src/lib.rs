//! This crate contains the logging setup shared by the harness binary and its
//! tests: initialization of the `tracing` subscriber and a panic hook that
//! reports panics through `tracing`.
pub mod config;
pub mod tracing;

pub use config::Config;
