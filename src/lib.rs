// Core modules
pub mod api;
pub mod config;
pub mod decision;
pub mod error;
pub mod indicators;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod risk;
pub mod series;
pub mod signals;
pub mod strategy;

// Re-export commonly used types
pub use error::Error;
pub use models::*;
pub use pipeline::{run_pipeline, Evaluation, EvaluationRequest, Orchestrator};
pub use strategy::Strategy;

// Error handling
pub type Result<T> = std::result::Result<T, Error>;
