//! Shared helpers for the engine's integration tests: one-time logging
//! setup and unique identities.

pub mod logging;
pub mod unique_helpers;
