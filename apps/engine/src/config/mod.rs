pub mod engine;

pub use engine::{EconomicsConfig, EngineConfig};
