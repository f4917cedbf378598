//! Binary cache for parsed tables (bincode).
//!
//! The cache is an acceleration layer only: a table read back is identical to
//! the one written. Files carry a format version so a stale layout is rejected
//! instead of misread.

use crate::{Error, RecordTable, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

const CACHE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    table: RecordTable,
}

/// Binary cache handler.
pub struct BinaryCache;

impl BinaryCache {
    /// Load a table from a cache file.
    pub fn read_file(path: impl AsRef<Path>) -> Result<RecordTable> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let cached: CacheFile = bincode::deserialize_from(reader)?;
        if cached.version != CACHE_VERSION {
            return Err(Error::InvalidConfig(format!(
                "cache version {} (expected {CACHE_VERSION})",
                cached.version
            )));
        }
        Ok(cached.table)
    }

    /// Save a table to a cache file.
    ///
    /// Writes to a sibling temporary file and renames it into place, so a
    /// reader never sees a half-written cache.
    pub fn write_file(table: &RecordTable, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp = path.with_extension("bin.tmp");

        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            let cached = CacheFile {
                version: CACHE_VERSION,
                table: table.clone(),
            };
            bincode::serialize_into(&mut writer, &cached)?;
            writer.flush()?;
        }

        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordKind;

    #[test]
    fn test_binary_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kg_final.bin");
        let table = RecordTable::new(
            RecordKind::KnowledgeGraph,
            vec![[0, 0, 1], [1, 1, 2], [i64::MAX, -3, 0]],
        );

        BinaryCache::write_file(&table, &path).unwrap();
        let loaded = BinaryCache::read_file(&path).unwrap();

        assert_eq!(loaded, table);
        assert!(!dir.path().join("kg_final.bin.tmp").exists());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings_final.bin");
        fs::write(&path, b"not a cache").unwrap();

        assert!(BinaryCache::read_file(&path).is_err());
    }
}
