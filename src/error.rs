//! Error families of the simulation core.

use thiserror::Error;

use crate::entities::EntityTag;

/// Failures reported by the entity pools.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("pool '{tag}' needs a capacity above zero")]
    ZeroCapacity { tag: EntityTag },

    #[error("no template resource for pool '{tag}'")]
    MissingTemplate { tag: EntityTag },

    #[error("pool '{tag}' is disabled")]
    Disabled { tag: EntityTag },

    /// Soft failure: every slot is active.  Callers drop the request.
    #[error("pool '{tag}' is exhausted ({capacity} slots active)")]
    Exhausted { tag: EntityTag, capacity: usize },
}

/// Rejected spawn data.  Record-level variants disable only that record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpawnError {
    #[error("record {line}: delay {delay} is not a finite non-negative duration")]
    InvalidDelay { line: usize, delay: f32 },

    #[error("record {line}: empty type")]
    EmptyType { line: usize },

    #[error("record {line}: unknown type '{name}'")]
    UnknownType { line: usize, name: String },

    #[error("record {line}: lane {lane} outside 0..=9")]
    LaneOutOfRange { line: usize, lane: i64 },

    #[error("record {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("stage data is not a JSON array of records: {0}")]
    Json(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}
