//! Loading raw rating and knowledge-graph tables.
//!
//! A dataset lives in `<root>/<dataset>/` as `ratings_final.txt` and
//! `kg_final.txt`. After the first parse each table is cached next to its text
//! source as `<stem>.bin`; later loads prefer the cache when it is readable.
//!
//! # Example
//!
//! ```rust,ignore
//! use kgsaint_core::{DataSource, RecordKind};
//!
//! let source = DataSource::new("data", "movie");
//! let ratings = source.load(RecordKind::Ratings)?;
//! let kg = source.load(RecordKind::KnowledgeGraph)?;
//! ```

use crate::formats::{BinaryCache, TextTable};
use crate::{Error, RecordKind, RecordTable, Result};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Where a dataset's tables live, and whether to use the binary cache.
#[derive(Debug, Clone)]
pub struct DataSource {
    root: PathBuf,
    dataset: String,
    use_cache: bool,
}

impl DataSource {
    /// Create a source for `<root>/<dataset>/`, with caching enabled.
    pub fn new(root: impl Into<PathBuf>, dataset: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            dataset: dataset.into(),
            use_cache: true,
        }
    }

    /// Enable or disable reading and writing the binary cache.
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Dataset name.
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Directory holding the dataset files.
    pub fn dataset_dir(&self) -> PathBuf {
        self.root.join(&self.dataset)
    }

    /// Path of the text source for a table.
    pub fn text_path(&self, kind: RecordKind) -> PathBuf {
        self.dataset_dir().join(format!("{}.txt", kind.file_stem()))
    }

    /// Path of the binary cache for a table.
    pub fn cache_path(&self, kind: RecordKind) -> PathBuf {
        self.dataset_dir().join(format!("{}.bin", kind.file_stem()))
    }

    /// Load a table, preferring a valid cache over the text source.
    ///
    /// A cache that cannot be decoded, or holds the wrong kind of table, is
    /// ignored with a warning. After a fresh parse the cache is rewritten;
    /// failing to write it never fails the load.
    ///
    /// # Errors
    ///
    /// [`Error::SourceNotFound`] if no usable cache exists and the text source
    /// is missing; [`Error::MalformedRecord`] for a bad line.
    pub fn load(&self, kind: RecordKind) -> Result<RecordTable> {
        info!(dataset = %self.dataset, %kind, "reading records");

        if let Some(table) = self.try_cache(kind) {
            return Ok(table);
        }

        let table = self.parse_text(kind)?;

        if self.use_cache {
            let cache_path = self.cache_path(kind);
            match BinaryCache::write_file(&table, &cache_path) {
                Ok(()) => debug!(path = %cache_path.display(), "wrote cache"),
                Err(err) => warn!(
                    path = %cache_path.display(),
                    error = %err,
                    "failed to write cache, continuing without it"
                ),
            }
        }

        Ok(table)
    }

    /// Load the rating table.
    pub fn load_ratings(&self) -> Result<RecordTable> {
        self.load(RecordKind::Ratings)
    }

    /// Load the knowledge-graph table.
    pub fn load_kg(&self) -> Result<RecordTable> {
        self.load(RecordKind::KnowledgeGraph)
    }

    /// Parse the text source and (re)write its cache, reporting write errors.
    ///
    /// Unlike [`load`](Self::load) this always parses text and a failed cache
    /// write is an error, since writing the cache is the point of the call.
    pub fn refresh_cache(&self, kind: RecordKind) -> Result<PathBuf> {
        let table = self.parse_text(kind)?;
        let cache_path = self.cache_path(kind);
        BinaryCache::write_file(&table, &cache_path)?;
        info!(path = %cache_path.display(), rows = table.len(), "cache refreshed");
        Ok(cache_path)
    }

    fn try_cache(&self, kind: RecordKind) -> Option<RecordTable> {
        if !self.use_cache {
            return None;
        }
        let cache_path = self.cache_path(kind);
        if !cache_path.is_file() {
            return None;
        }

        match BinaryCache::read_file(&cache_path) {
            Ok(table) if table.kind() == kind => {
                debug!(path = %cache_path.display(), rows = table.len(), "loaded from cache");
                Some(table)
            }
            Ok(table) => {
                warn!(
                    path = %cache_path.display(),
                    expected = %kind,
                    found = %table.kind(),
                    "cache holds the wrong table, ignoring it"
                );
                None
            }
            Err(err) => {
                warn!(
                    path = %cache_path.display(),
                    error = %err,
                    "unreadable cache, falling back to text source"
                );
                None
            }
        }
    }

    fn parse_text(&self, kind: RecordKind) -> Result<RecordTable> {
        let text_path = self.text_path(kind);
        if !text_path.is_file() {
            return Err(Error::SourceNotFound {
                dataset: self.dataset.clone(),
                kind,
                path: text_path,
            });
        }

        let table = TextTable::read_file(&text_path, kind)?;
        debug!(path = %text_path.display(), rows = table.len(), "parsed text source");
        Ok(table)
    }
}
