//! Error kinds surfaced by the simulation engine
//!
//! Hard preconditions (data volume, configuration validity) fail fast
//! before any path is simulated. Per-step numerical degeneracies are
//! never errors; they are clamped in place by the process models.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Insufficient data: need at least {required} usable observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid historical series: {0}")]
    InvalidSeries(String),
    #[error("Unrecognized model: {0}")]
    UnrecognizedModel(String),
}

pub type Result<T> = std::result::Result<T, SimulationError>;

impl From<SimulationError> for String {
    fn from(e: SimulationError) -> Self {
        e.to_string()
    }
}
