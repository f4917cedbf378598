//! Tab-separated writers for produced artifacts.
//!
//! - ratings: `user item label`, one rating per line
//! - COO adjacency: `row col rel`, one edge per line
//! - sampled adjacency: one line per entity id (sentinel row first), the
//!   `width` neighbor ids followed by the `width` relation ids

use crate::{CooAdjacency, Rating, Result, SampledAdjacency};
use std::io::Write;

/// TSV artifact writer.
pub struct Tsv;

impl Tsv {
    /// Write a rating table.
    pub fn write_ratings<W: Write>(ratings: &[Rating], mut writer: W) -> Result<()> {
        for r in ratings {
            writeln!(writer, "{}\t{}\t{}", r.user, r.item, r.label)?;
        }
        Ok(())
    }

    /// Write a COO adjacency.
    pub fn write_coo<W: Write>(coo: &CooAdjacency, mut writer: W) -> Result<()> {
        for (row, col, rel) in coo.iter() {
            writeln!(writer, "{row}\t{col}\t{rel}")?;
        }
        Ok(())
    }

    /// Write sampled adjacency matrices, one entity per line.
    pub fn write_sampled<W: Write>(sampled: &SampledAdjacency, mut writer: W) -> Result<()> {
        for (entities, relations) in sampled
            .entities()
            .rows()
            .into_iter()
            .zip(sampled.relations().rows())
        {
            let line: Vec<String> = entities
                .iter()
                .chain(relations.iter())
                .map(u64::to_string)
                .collect();
            writeln!(writer, "{}", line.join("\t"))?;
        }
        Ok(())
    }
}
