//! Error types for kgsaint-core.

use crate::RecordKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, renumbering, indexing or splitting records.
#[derive(Error, Debug)]
pub enum Error {
    /// Neither the text source nor a binary cache exists for a dataset.
    #[error("Source not found: no {kind} records for dataset '{dataset}' at {}", .path.display())]
    SourceNotFound {
        /// Dataset name.
        dataset: String,
        /// Which table was requested.
        kind: RecordKind,
        /// The text source that was looked for.
        path: PathBuf,
    },

    /// A record with the wrong field count, a non-integer token or an
    /// out-of-range value.
    #[error("Malformed record at {source_name}:{position}: {reason}")]
    MalformedRecord {
        /// File path or table name the record came from.
        source_name: String,
        /// 1-based line (text sources) or row (tables) number.
        position: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// An id referenced outside the renumbered entity space.
    #[error("Entity not found: {id} (entity space is 1..{entity_count})")]
    MissingEntity {
        /// The offending id.
        id: u64,
        /// Size of the dense entity space, sentinel included.
        entity_count: u64,
    },

    /// Split ratios out of range, or more distinct indices requested than exist.
    #[error("Invalid ratio: {0}")]
    InvalidRatio(String),

    /// Any other invalid configuration value.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary cache encoding error.
    #[error("Cache error: {0}")]
    Cache(#[from] bincode::Error),

    /// JSON config error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(
        source_name: impl Into<String>,
        position: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedRecord {
            source_name: source_name.into(),
            position,
            reason: reason.into(),
        }
    }
}

/// Result type alias for kgsaint-core.
pub type Result<T> = std::result::Result<T, Error>;
