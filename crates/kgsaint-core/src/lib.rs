// Allow minor clippy style warnings at crate level
// These are mostly style preferences, not bugs
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]

//! Knowledge-graph data preparation for sampled GNN recommenders.
//!
//! This crate turns the two raw integer tables of a recommendation dataset
//! (user/item ratings and knowledge-graph triples) into what a training loop
//! consumes:
//!
//! - [`DataSource`] - text tables with a transparent binary cache
//! - [`renumber_ratings`] / [`renumber_triples`] - shift ids so `0` is free
//!   for the padding sentinel
//! - [`KnowledgeGraph`] - undirected adjacency arena over dense entity ids
//! - [`Adjacency`] - COO edge lists or fixed-width sampled neighbor matrices
//! - [`split_ratings`] - disjoint train/eval/test partitions
//! - [`pipeline::prepare`] - all of the above from a [`PipelineConfig`]
//!
//! # Example
//!
//! ```rust
//! use kgsaint_core::{CooAdjacency, KnowledgeGraph, RecordKind, RecordTable, renumber_triples};
//!
//! let table = RecordTable::new(RecordKind::KnowledgeGraph, vec![[0, 0, 1], [1, 1, 2]]);
//! let triples = renumber_triples(&table).unwrap();
//! let kg = KnowledgeGraph::build(&triples).unwrap();
//!
//! let coo = CooAdjacency::from_graph(&kg);
//! assert_eq!(coo.row, vec![1, 2, 2, 3]);
//! assert_eq!(coo.col, vec![2, 1, 3, 2]);
//! assert_eq!(coo.rel, vec![1, 1, 2, 2]);
//! ```

pub mod algo;
mod config;
mod error;
pub mod formats;
mod graph;
mod loader;
pub mod pipeline;
mod record;
mod renumber;

pub use algo::adjacency::{Adjacency, CooAdjacency, Flattening, SampledAdjacency};
pub use algo::split::{split_ratings, DatasetSplit, SplitConfig};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use graph::{GraphStats, KnowledgeGraph, Neighbor};
pub use loader::DataSource;
pub use record::{
    EntityId, ItemId, Rating, RecordKind, RecordTable, RelationId, Triple, UserId, SENTINEL,
};
pub use renumber::{renumber_ratings, renumber_triples, RatingSet, TripleSet};
