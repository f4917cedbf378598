//! Adjacency flattening: turning a [`KnowledgeGraph`] into training input.
//!
//! Two strategies, selected with [`Flattening`]:
//!
//! - [`CooAdjacency`] - every edge, variable degree, as parallel
//!   `row` / `col` / `rel` arrays (for subgraph samplers that batch by degree)
//! - [`SampledAdjacency`] - exactly `k` slots per entity, sampled without
//!   replacement or padded with the sentinel (for dense batched lookup)
//!
//! Both cover entity ids `1..n_entity` in ascending order; row 0 of the dense
//! matrices belongs to the sentinel and is all padding.

use crate::{EntityId, Error, KnowledgeGraph, Neighbor, RelationId, Result, SENTINEL};
use ndarray::{Array2, ArrayView1};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How to flatten the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy")]
pub enum Flattening {
    /// Keep every edge.
    Coo,
    /// Sample or pad to `width` neighbors per entity.
    FixedWidth {
        /// Neighbor slots per entity (`k`).
        width: usize,
    },
}

impl Default for Flattening {
    fn default() -> Self {
        Self::Coo
    }
}

impl Flattening {
    /// Reject configurations that cannot produce output.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::FixedWidth { width: 0 } => Err(Error::InvalidConfig(
                "neighbor sample width must be at least 1".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Flatten a graph with this strategy.
    ///
    /// The generator is only drawn from by [`Flattening::FixedWidth`].
    pub fn flatten<R: Rng + ?Sized>(
        self,
        kg: &KnowledgeGraph,
        rng: &mut R,
    ) -> Result<Adjacency> {
        match self {
            Self::Coo => Ok(Adjacency::Coo(CooAdjacency::from_graph(kg))),
            Self::FixedWidth { width } => {
                SampledAdjacency::sample(kg, width, rng).map(Adjacency::Sampled)
            }
        }
    }
}

/// Output of [`Flattening::flatten`].
#[derive(Debug, Clone, PartialEq)]
pub enum Adjacency {
    /// Unbounded edge list.
    Coo(CooAdjacency),
    /// Fixed-width matrices.
    Sampled(SampledAdjacency),
}

impl Adjacency {
    /// Strategy that produced this adjacency.
    pub fn flattening(&self) -> Flattening {
        match self {
            Self::Coo(_) => Flattening::Coo,
            Self::Sampled(s) => Flattening::FixedWidth { width: s.width() },
        }
    }
}

/// Variable-degree coordinate adjacency.
///
/// `row` is non-decreasing; the run where `row[i] == e` is exactly the
/// neighbor run of `e`, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooAdjacency {
    /// Source entity of each edge.
    pub row: Vec<EntityId>,
    /// Neighbor entity of each edge.
    pub col: Vec<EntityId>,
    /// Relation of each edge.
    pub rel: Vec<RelationId>,
    /// Neighbor count per entity id (entry 0 is the sentinel's, always 0).
    degrees: Vec<usize>,
}

impl CooAdjacency {
    /// Flatten every edge of the graph.
    ///
    /// # Example
    ///
    /// ```rust
    /// use kgsaint_core::{CooAdjacency, KnowledgeGraph, Triple};
    ///
    /// let triples = [Triple::new(1, 1, 2), Triple::new(2, 2, 3)];
    /// let kg = KnowledgeGraph::from_triples(&triples, 4).unwrap();
    /// let coo = CooAdjacency::from_graph(&kg);
    ///
    /// assert_eq!(coo.row, vec![1, 2, 2, 3]);
    /// assert_eq!(coo.col, vec![2, 1, 3, 2]);
    /// assert_eq!(coo.rel, vec![1, 1, 2, 2]);
    /// ```
    pub fn from_graph(kg: &KnowledgeGraph) -> Self {
        info!(edges = kg.edge_count(), "constructing coo adjacency");

        let mut row = Vec::with_capacity(kg.edge_count());
        let mut col = Vec::with_capacity(kg.edge_count());
        let mut rel = Vec::with_capacity(kg.edge_count());

        for entity in kg.entities() {
            for neighbor in kg.run(entity as usize) {
                row.push(entity);
                col.push(neighbor.entity);
                rel.push(neighbor.relation);
            }
        }

        Self {
            row,
            col,
            rel,
            degrees: kg.degrees(),
        }
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.row.len()
    }

    /// True when there are no edges.
    pub fn is_empty(&self) -> bool {
        self.row.is_empty()
    }

    /// Neighbor count per entity id, sentinel included at index 0.
    pub fn degrees(&self) -> &[usize] {
        &self.degrees
    }

    /// Iterate over `(row, col, rel)`.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, EntityId, RelationId)> + '_ {
        self.row
            .iter()
            .zip(&self.col)
            .zip(&self.rel)
            .map(|((&r, &c), &l)| (r, c, l))
    }
}

/// Fixed-width neighbor matrices, `n_entity × width` each.
///
/// Padding slots hold [`SENTINEL`] in both matrices, always after the real
/// entries of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampledAdjacency {
    entities: Array2<EntityId>,
    relations: Array2<RelationId>,
}

impl SampledAdjacency {
    /// Sample `width` neighbor slots for every entity.
    ///
    /// - `degree >= width`: `width` distinct slots, uniformly without replacement
    /// - `degree < width`: every neighbor in order, then sentinel padding
    ///
    /// Entities are visited in ascending id order with one generator, so a
    /// fixed seed reproduces the output exactly.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] when `width == 0`.
    pub fn sample<R: Rng + ?Sized>(
        kg: &KnowledgeGraph,
        width: usize,
        rng: &mut R,
    ) -> Result<Self> {
        Flattening::FixedWidth { width }.validate()?;
        info!(width, n_entity = kg.entity_count(), "constructing sampled adjacency");

        let rows = kg.entity_count() as usize;
        let mut entities = Array2::from_elem((rows, width), SENTINEL);
        let mut relations = Array2::from_elem((rows, width), SENTINEL);
        let mut padded = 0usize;

        for entity in kg.entities() {
            let idx = entity as usize;
            let neighbors = kg.run(idx);

            if neighbors.len() >= width {
                let picked = index::sample(rng, neighbors.len(), width);
                for (slot, i) in picked.iter().enumerate() {
                    entities[[idx, slot]] = neighbors[i].entity;
                    relations[[idx, slot]] = neighbors[i].relation;
                }
            } else {
                padded += 1;
                for (slot, neighbor) in neighbors.iter().enumerate() {
                    entities[[idx, slot]] = neighbor.entity;
                    relations[[idx, slot]] = neighbor.relation;
                }
            }
        }

        debug!(padded, "entities padded below width");

        Ok(Self {
            entities,
            relations,
        })
    }

    /// Neighbor slots per entity.
    pub fn width(&self) -> usize {
        self.entities.ncols()
    }

    /// Number of rows (the dense entity space, sentinel row included).
    pub fn row_count(&self) -> usize {
        self.entities.nrows()
    }

    /// Neighbor-entity matrix.
    pub fn entities(&self) -> &Array2<EntityId> {
        &self.entities
    }

    /// Neighbor-relation matrix.
    pub fn relations(&self) -> &Array2<RelationId> {
        &self.relations
    }

    /// One entity's row as `(neighbor ids, relation ids)`.
    pub fn row(
        &self,
        entity: EntityId,
    ) -> Result<(ArrayView1<'_, EntityId>, ArrayView1<'_, RelationId>)> {
        let idx = entity as usize;
        if entity == SENTINEL || idx >= self.row_count() {
            return Err(Error::MissingEntity {
                id: entity,
                entity_count: self.row_count() as u64,
            });
        }
        Ok((self.entities.row(idx), self.relations.row(idx)))
    }

    /// One entity's row as neighbor pairs, padding included.
    pub fn row_pairs(&self, entity: EntityId) -> Result<Vec<Neighbor>> {
        let (entities, relations) = self.row(entity)?;
        Ok(entities
            .iter()
            .zip(relations.iter())
            .map(|(&e, &r)| Neighbor::new(e, r))
            .collect())
    }

    /// Consume into the raw `(entities, relations)` matrices.
    pub fn into_matrices(self) -> (Array2<EntityId>, Array2<RelationId>) {
        (self.entities, self.relations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Triple;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;
    use std::collections::HashSet;

    fn chain() -> KnowledgeGraph {
        KnowledgeGraph::from_triples(&[Triple::new(1, 1, 2), Triple::new(2, 2, 3)], 4).unwrap()
    }

    fn star(leaves: u64) -> KnowledgeGraph {
        let triples: Vec<_> = (0..leaves).map(|i| Triple::new(1, i + 1, i + 2)).collect();
        KnowledgeGraph::from_triples(&triples, leaves + 2).unwrap()
    }

    #[test]
    fn test_coo_matches_graph() {
        let coo = CooAdjacency::from_graph(&chain());

        assert_eq!(coo.row, vec![1, 2, 2, 3]);
        assert_eq!(coo.col, vec![2, 1, 3, 2]);
        assert_eq!(coo.rel, vec![1, 1, 2, 2]);
        assert_eq!(coo.degrees(), &[0, 1, 2, 1]);
        assert_eq!(coo.len(), 4);
    }

    #[test]
    fn test_padding_single_neighbor() {
        // Entity 1 has exactly one neighbor (5, 7); the chain 2-3-4-5 keeps
        // the id space dense.
        let kg = KnowledgeGraph::from_triples(
            &[
                Triple::new(1, 7, 5),
                Triple::new(2, 1, 3),
                Triple::new(3, 1, 4),
                Triple::new(4, 1, 5),
            ],
            6,
        )
        .unwrap();
        let mut rng = XorShiftRng::seed_from_u64(42);
        let sampled = SampledAdjacency::sample(&kg, 3, &mut rng).unwrap();

        assert_eq!(
            sampled.row_pairs(1).unwrap(),
            vec![Neighbor::new(5, 7), Neighbor::new(0, 0), Neighbor::new(0, 0)]
        );
    }

    #[test]
    fn test_sentinel_row_is_padding() {
        let mut rng = XorShiftRng::seed_from_u64(7);
        let sampled = SampledAdjacency::sample(&chain(), 2, &mut rng).unwrap();

        assert!(sampled.entities().row(0).iter().all(|&e| e == SENTINEL));
        assert!(sampled.relations().row(0).iter().all(|&r| r == SENTINEL));
        assert!(sampled.row(0).is_err());
    }

    #[test]
    fn test_sample_without_replacement() {
        let kg = star(10);
        let mut rng = XorShiftRng::seed_from_u64(42);
        let sampled = SampledAdjacency::sample(&kg, 4, &mut rng).unwrap();

        let row = sampled.row_pairs(1).unwrap();
        assert_eq!(row.len(), 4);
        let distinct: HashSet<_> = row.iter().collect();
        assert_eq!(distinct.len(), 4);

        let pool: HashSet<_> = kg.neighbors(1).unwrap().iter().collect();
        assert!(row.iter().all(|n| pool.contains(n)));
    }

    #[test]
    fn test_exact_degree_keeps_all() {
        let kg = star(3);
        let mut rng = XorShiftRng::seed_from_u64(1);
        let sampled = SampledAdjacency::sample(&kg, 3, &mut rng).unwrap();

        let row: HashSet<_> = sampled.row_pairs(1).unwrap().into_iter().collect();
        let all: HashSet<_> = kg.neighbors(1).unwrap().iter().copied().collect();
        assert_eq!(row, all);
    }

    #[test]
    fn test_sampling_is_reproducible() {
        let kg = star(20);
        let a = SampledAdjacency::sample(&kg, 5, &mut XorShiftRng::seed_from_u64(9)).unwrap();
        let b = SampledAdjacency::sample(&kg, 5, &mut XorShiftRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_shape() {
        let kg = chain();
        let mut rng = XorShiftRng::seed_from_u64(0);
        let sampled = SampledAdjacency::sample(&kg, 8, &mut rng).unwrap();

        assert_eq!(sampled.entities().dim(), (4, 8));
        assert_eq!(sampled.relations().dim(), (4, 8));
        assert!(sampled.row(4).is_err());
    }

    #[test]
    fn test_zero_width_rejected() {
        let mut rng = XorShiftRng::seed_from_u64(0);
        let err = SampledAdjacency::sample(&chain(), 0, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_flatten_dispatch() {
        let kg = chain();
        let mut rng = XorShiftRng::seed_from_u64(0);

        let coo = Flattening::Coo.flatten(&kg, &mut rng).unwrap();
        assert!(matches!(coo, Adjacency::Coo(_)));
        assert_eq!(coo.flattening(), Flattening::Coo);

        let fixed = Flattening::FixedWidth { width: 2 }.flatten(&kg, &mut rng).unwrap();
        assert_eq!(fixed.flattening(), Flattening::FixedWidth { width: 2 });
    }

    #[test]
    fn test_flattening_serde() {
        let json = serde_json::to_string(&Flattening::FixedWidth { width: 8 }).unwrap();
        assert_eq!(json, r#"{"strategy":"fixed_width","width":8}"#);
        let back: Flattening = serde_json::from_str(r#"{"strategy":"coo"}"#).unwrap();
        assert_eq!(back, Flattening::Coo);
    }
}
