//! Whitespace-delimited integer tables.
//!
//! One record per line, three signed 64-bit integers separated by spaces or
//! tabs. Blank lines and `#` comments are skipped; anything else that is not
//! exactly three integers is an error.

use crate::{Error, RecordKind, RecordTable, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

/// Text table format handler.
pub struct TextTable;

impl TextTable {
    /// Parse a table from a reader.
    ///
    /// `source_name` only labels error messages.
    pub fn read<R: Read>(reader: R, kind: RecordKind, source_name: &str) -> Result<RecordTable> {
        let buf = BufReader::new(reader);
        let mut rows = Vec::new();

        for (idx, line) in buf.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            rows.push(parse_row(line, source_name, idx + 1)?);
        }

        Ok(RecordTable::new(kind, rows))
    }

    /// Parse a table from a file.
    pub fn read_file(path: impl AsRef<Path>, kind: RecordKind) -> Result<RecordTable> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::read(file, kind, &path.display().to_string())
    }

    /// Write a table, one tab-separated row per line.
    pub fn write<W: Write>(table: &RecordTable, mut writer: W) -> Result<()> {
        for [a, b, c] in table.rows() {
            writeln!(writer, "{a}\t{b}\t{c}")?;
        }
        Ok(())
    }

    /// Parse from string.
    pub fn from_str(s: &str, kind: RecordKind) -> Result<RecordTable> {
        Self::read(s.as_bytes(), kind, "<string>")
    }
}

fn parse_row(line: &str, source_name: &str, position: usize) -> Result<[i64; 3]> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(Error::malformed(
            source_name,
            position,
            format!("expected 3 fields, found {}", fields.len()),
        ));
    }

    let mut row = [0i64; 3];
    for (slot, token) in row.iter_mut().zip(&fields) {
        *slot = token.parse().map_err(|e| {
            Error::malformed(source_name, position, format!("invalid integer {token:?}: {e}"))
        })?;
    }
    Ok(row)
}
