//! Algorithms over the knowledge graph and the rating table.
//!
//! - **Flattening**: COO edge lists or fixed-width neighbor samples ([`adjacency`])
//! - **Splitting**: disjoint train/eval/test partitions ([`split`])

/// Adjacency flattening (COO and fixed-width sampling).
pub mod adjacency;

/// Train/eval/test partitioning.
pub mod split;
