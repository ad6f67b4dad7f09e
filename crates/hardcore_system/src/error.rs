//! Error types for the hardcore system.
//!
//! Lookups against unknown worlds or dimensions are not errors; they resolve to
//! "not found" / `false` at the call site.

use crate::types::{DimensionName, HardcoreWorldId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HardcoreError {
    #[error("Hardcore world already exists: {0}")]
    AlreadyExists(HardcoreWorldId),

    #[error("Unknown hardcore world: {0}")]
    UnknownWorld(HardcoreWorldId),

    #[error("Hardcore world '{0}' collides with the hub world")]
    HubCollision(HardcoreWorldId),

    #[error("Dimension '{dimension}' already belongs to hardcore world '{owner}'")]
    DimensionConflict {
        dimension: DimensionName,
        owner: HardcoreWorldId,
    },

    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("Hardcore world '{0}' has no dimensions")]
    EmptyDimensions(HardcoreWorldId),

    #[error("Cannot open more hardcore worlds, limit is {limit}")]
    WorldLimitReached { limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Configuration serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("State file error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = HardcoreError> = std::result::Result<T, E>;
