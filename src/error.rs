//! Error types for the simulation library.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("{0} read before aggregation was computed")]
    AggregationNotReady(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
