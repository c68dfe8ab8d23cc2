#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

//! Commit-reveal beat prediction rounds: pattern codec, round state machine
//! and settlement engine.

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod services;
pub mod telemetry;
pub mod utils;


pub use config::{EconomicsConfig, EngineConfig};
pub use error::AppError;
pub use errors::{DomainError, ErrorCode};
pub use services::RoundFlowService;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
