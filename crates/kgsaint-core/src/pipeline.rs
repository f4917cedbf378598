//! End-to-end dataset preparation.
//!
//! Ratings are loaded, renumbered, counted and split first; then the
//! knowledge graph is loaded, renumbered, built and flattened. One generator
//! seeded from the config serves both random stages in that order, so a seed
//! fully determines the split and the sampled adjacency.

use crate::algo::adjacency::Adjacency;
use crate::algo::split::{split_ratings, DatasetSplit};
use crate::{
    renumber_ratings, renumber_triples, Error, KnowledgeGraph, PipelineConfig, Rating, Result,
};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use tracing::info;

/// Everything the training side consumes.
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// Number of distinct users.
    pub n_user: usize,
    /// Number of distinct items.
    pub n_item: usize,
    /// Dense entity space size, sentinel included.
    pub n_entity: u64,
    /// Number of distinct relations.
    pub n_relation: usize,
    /// Train/eval/test ratings.
    pub split: DatasetSplit,
    /// Flattened adjacency.
    pub adjacency: Adjacency,
}

/// Run the whole preparation described by `config`.
///
/// # Errors
///
/// Config errors are reported before any file is touched. Loading errors,
/// renumbering errors and [`Error::MissingEntity`] for items outside the
/// entity space are propagated.
pub fn prepare(config: &PipelineConfig) -> Result<PreparedData> {
    config.validate()?;
    let source = config.source();
    let mut rng = XorShiftRng::seed_from_u64(config.seed);

    let ratings = renumber_ratings(&source.load_ratings()?)?;
    let n_user = ratings.n_user();
    let n_item = ratings.n_item();
    let split = split_ratings(ratings.ratings(), &config.split, &mut rng)?;

    let triples = renumber_triples(&source.load_kg()?)?;
    let kg = KnowledgeGraph::build(&triples)?;
    let adjacency = config.flattening.flatten(&kg, &mut rng)?;

    for (_, part) in split.partitions() {
        check_items(part, triples.n_entity())?;
    }

    info!(
        n_user,
        n_item,
        n_entity = triples.n_entity(),
        n_relation = triples.n_relation(),
        "data loaded"
    );

    Ok(PreparedData {
        n_user,
        n_item,
        n_entity: triples.n_entity(),
        n_relation: triples.n_relation(),
        split,
        adjacency,
    })
}

/// Check that every rated item is an entity of the graph.
///
/// Items share the renumbered id space with entities; an item id outside
/// `1..n_entity` means the rating and KG files disagree.
pub fn check_items(ratings: &[Rating], n_entity: u64) -> Result<()> {
    match ratings.iter().find(|r| r.item == 0 || r.item >= n_entity) {
        Some(r) => Err(Error::MissingEntity {
            id: r.item,
            entity_count: n_entity,
        }),
        None => Ok(()),
    }
}
