//! # Procedural Error Types
//!
//! Configuration errors are fatal at startup. World errors come back from
//! edits and lookups against chunks that are not loaded.

use std::path::PathBuf;

use hexterra_core::{ChunkCoord, ChunkError};
use thiserror::Error;

/// Errors raised while loading or validating a [`crate::WorldConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its allowed range.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        /// Dotted field name, e.g. `streaming.render_distance`.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised by world edits and queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// The chunk holding the requested cell is not loaded.
    #[error("chunk ({}, {}) is not loaded", .0.x, .0.z)]
    ChunkNotLoaded(ChunkCoord),

    /// A world-space height below the floor or above the top layer.
    #[error("layer {layer} is outside the world (height {height})")]
    LayerOutOfRange {
        /// Requested layer.
        layer: i64,
        /// Number of layers.
        height: usize,
    },

    /// A chunk-level access failed.
    #[error(transparent)]
    Chunk(#[from] ChunkError),
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
