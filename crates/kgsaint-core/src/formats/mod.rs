//! On-disk formats.
//!
//! - [`TextTable`] - whitespace-delimited `N×3` integer tables (the raw sources)
//! - [`BinaryCache`] - bincode cache of a parsed [`RecordTable`](crate::RecordTable)
//! - [`Tsv`] - tab-separated writers for the produced artifacts

mod binary;
mod text;
mod tsv;

pub use binary::BinaryCache;
pub use text::TextTable;
pub use tsv::Tsv;
