//! Error types for rpgraph.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The data provider referenced an id it cannot resolve.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Invalid {kind} abstraction level: {value}")]
    InvalidAbstractionLevel { kind: &'static str, value: i32 },

    #[error("Ambiguous reaction order: {0} candidate orders")]
    AmbiguousOrder(usize),

    #[error("No reaction order covers all reactions")]
    NoOrderFound,

    #[error("Comparison unavailable: {0}")]
    ComparisonUnavailable(String),

    #[error("Abstraction family too large: {size} graphs (limit {limit})")]
    FamilyTooLarge { size: usize, limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
