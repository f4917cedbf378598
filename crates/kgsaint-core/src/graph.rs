//! Undirected knowledge graph stored as an edge arena.
//!
//! Every directed triple `(h, r, t)` becomes two adjacency entries: `(t, r)`
//! under `h` and `(h, r)` under `t`. Entries live in one contiguous array,
//! grouped by entity; an offset table of length `n_entity + 1` marks where each
//! entity's run starts. Construction takes two passes over the triples (count
//! degrees, then fill), so per-entity order is exactly input order.

use crate::{EntityId, Error, RelationId, Result, Triple, TripleSet, SENTINEL};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// One adjacency entry: a neighbor reached through a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Neighbor {
    /// Neighbor entity.
    pub entity: EntityId,
    /// Relation on the connecting edge.
    pub relation: RelationId,
}

impl Neighbor {
    /// Create a new adjacency entry.
    pub fn new(entity: EntityId, relation: RelationId) -> Self {
        Self { entity, relation }
    }
}

/// An undirected multigraph over the dense id space `0..n_entity`.
///
/// Id 0 is the sentinel and never has neighbors. Ids in `1..n_entity` are
/// dense: each one is the head or tail of at least one triple.
///
/// # Example
///
/// ```rust
/// use kgsaint_core::{KnowledgeGraph, Neighbor, Triple};
///
/// let triples = [Triple::new(1, 1, 2), Triple::new(2, 2, 3)];
/// let kg = KnowledgeGraph::from_triples(&triples, 4).unwrap();
///
/// assert_eq!(kg.neighbors(2).unwrap(), &[Neighbor::new(1, 1), Neighbor::new(3, 2)]);
/// assert_eq!(kg.edge_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    /// `offsets[e]..offsets[e + 1]` is entity `e`'s run in `edges`.
    offsets: Vec<usize>,
    /// All adjacency entries, grouped by entity.
    edges: Vec<Neighbor>,
    /// Number of input triples.
    triple_count: usize,
}

impl KnowledgeGraph {
    /// Build the graph from renumbered triples.
    pub fn build(set: &TripleSet) -> Result<Self> {
        Self::from_triples(set.triples(), set.n_entity())
    }

    /// Build the graph over an entity space of size `n_entity`.
    ///
    /// Entity ids must be dense: every id in `1..n_entity` appears as the head
    /// or tail of some triple. This is checked before anything is allocated.
    ///
    /// # Errors
    ///
    /// [`Error::MissingEntity`] if a head or tail is the sentinel or does not
    /// fit in `0..n_entity`, or if an id in the space is not covered by any
    /// triple; [`Error::MalformedRecord`] for a sentinel relation.
    pub fn from_triples(triples: &[Triple], n_entity: u64) -> Result<Self> {
        info!(triples = triples.len(), n_entity, "constructing knowledge graph");

        for (idx, triple) in triples.iter().enumerate() {
            check_entity(triple.head, n_entity)?;
            check_entity(triple.tail, n_entity)?;
            if triple.relation == SENTINEL {
                return Err(Error::malformed(
                    "kg",
                    idx + 1,
                    "relation id 0 is reserved for padding",
                ));
            }
        }
        check_dense(triples.iter().flat_map(|t| [t.head, t.tail]), n_entity)?;

        let n = n_entity as usize;

        // Pass 1: degrees, shifted by one so the prefix sum yields start offsets.
        let mut offsets = vec![0usize; n + 1];
        for triple in triples {
            offsets[triple.head as usize + 1] += 1;
            offsets[triple.tail as usize + 1] += 1;
        }
        for i in 1..=n {
            offsets[i] += offsets[i - 1];
        }

        // Pass 2: fill, head side first, in input order.
        let mut cursor = offsets[..n].to_vec();
        let mut edges = vec![Neighbor::new(SENTINEL, SENTINEL); offsets[n]];
        for triple in triples {
            let head = triple.head as usize;
            edges[cursor[head]] = Neighbor::new(triple.tail, triple.relation);
            cursor[head] += 1;

            let tail = triple.tail as usize;
            edges[cursor[tail]] = Neighbor::new(triple.head, triple.relation);
            cursor[tail] += 1;
        }

        debug!(edges = edges.len(), "knowledge graph constructed");

        Ok(Self {
            offsets,
            edges,
            triple_count: triples.len(),
        })
    }

    /// Size of the dense entity space, sentinel included.
    pub fn entity_count(&self) -> u64 {
        (self.offsets.len() - 1) as u64
    }

    /// Number of input triples.
    pub fn triple_count(&self) -> usize {
        self.triple_count
    }

    /// Number of adjacency entries (`2 × triple_count`).
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Real entity ids, ascending: `1..n_entity`.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> {
        1..self.entity_count().max(1)
    }

    /// Neighbor run of an entity, in insertion order.
    ///
    /// # Errors
    ///
    /// [`Error::MissingEntity`] for the sentinel or an id outside the space.
    pub fn neighbors(&self, entity: EntityId) -> Result<&[Neighbor]> {
        let idx = self.index_of(entity)?;
        Ok(self.run(idx))
    }

    /// Number of adjacency entries of an entity.
    pub fn degree(&self, entity: EntityId) -> Result<usize> {
        let idx = self.index_of(entity)?;
        Ok(self.offsets[idx + 1] - self.offsets[idx])
    }

    /// Degrees of the whole id space, indexed by entity id (entry 0 is 0).
    pub fn degrees(&self) -> Vec<usize> {
        self.offsets.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// All adjacency entries, grouped by ascending entity id.
    pub fn edges(&self) -> &[Neighbor] {
        &self.edges
    }

    /// Start offset of each entity's run, plus a final end offset.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub(crate) fn run(&self, idx: usize) -> &[Neighbor] {
        &self.edges[self.offsets[idx]..self.offsets[idx + 1]]
    }

    fn index_of(&self, entity: EntityId) -> Result<usize> {
        check_entity(entity, self.entity_count())
    }
}

/// Check that `ids` covers every entity in `1..n_entity`.
///
/// Works on the distinct ids only, so a huge `n_entity` with few triples is
/// rejected without allocating anything proportional to it.
pub(crate) fn check_dense(
    ids: impl IntoIterator<Item = EntityId>,
    n_entity: u64,
) -> Result<()> {
    let mut distinct: Vec<EntityId> = ids
        .into_iter()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    distinct.sort_unstable();

    let mut expected: EntityId = 1;
    for id in distinct {
        if id != expected {
            break;
        }
        expected += 1;
    }

    if expected < n_entity {
        return Err(Error::MissingEntity {
            id: expected,
            entity_count: n_entity,
        });
    }
    Ok(())
}

fn check_entity(entity: EntityId, entity_count: u64) -> Result<usize> {
    if entity == SENTINEL || entity >= entity_count {
        Err(Error::MissingEntity {
            id: entity,
            entity_count,
        })
    } else {
        Ok(entity as usize)
    }
}

/// Statistics about a knowledge graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of entities (`n_entity - 1`, ids being dense).
    pub entity_count: u64,
    /// Number of input triples.
    pub triple_count: usize,
    /// Number of adjacency entries.
    pub edge_count: usize,
    /// Number of distinct relations.
    pub relation_count: usize,
    /// Largest neighbor run.
    pub max_degree: usize,
    /// Average neighbor-run length over real entities.
    pub avg_degree: f64,
}

impl KnowledgeGraph {
    /// Compute statistics about the graph.
    pub fn stats(&self) -> GraphStats {
        let entity_count = self.entity_count().saturating_sub(1);
        let degrees = self.degrees();
        let real = degrees.get(1..).unwrap_or(&[]);

        let relation_count = self
            .edges
            .iter()
            .map(|n| n.relation)
            .collect::<HashSet<_>>()
            .len();

        let avg_degree = if entity_count > 0 {
            self.edge_count() as f64 / entity_count as f64
        } else {
            0.0
        };

        GraphStats {
            entity_count,
            triple_count: self.triple_count,
            edge_count: self.edge_count(),
            relation_count,
            max_degree: real.iter().copied().max().unwrap_or(0),
            avg_degree,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> KnowledgeGraph {
        KnowledgeGraph::from_triples(&[Triple::new(1, 1, 2), Triple::new(2, 2, 3)], 4).unwrap()
    }

    #[test]
    fn test_undirected_expansion() {
        let kg = sample_graph();

        assert_eq!(kg.neighbors(1).unwrap(), &[Neighbor::new(2, 1)]);
        assert_eq!(
            kg.neighbors(2).unwrap(),
            &[Neighbor::new(1, 1), Neighbor::new(3, 2)]
        );
        assert_eq!(kg.neighbors(3).unwrap(), &[Neighbor::new(2, 2)]);
        assert_eq!(kg.triple_count(), 2);
        assert_eq!(kg.edge_count(), 4);
    }

    #[test]
    fn test_insertion_order_is_input_order() {
        let kg = KnowledgeGraph::from_triples(
            &[
                Triple::new(2, 5, 1),
                Triple::new(1, 3, 3),
                Triple::new(3, 4, 1),
            ],
            4,
        )
        .unwrap();

        assert_eq!(
            kg.neighbors(1).unwrap(),
            &[Neighbor::new(2, 5), Neighbor::new(3, 3), Neighbor::new(3, 4)]
        );
    }

    #[test]
    fn test_self_loop_kept_twice() {
        let kg = KnowledgeGraph::from_triples(&[Triple::new(1, 1, 1)], 2).unwrap();
        assert_eq!(
            kg.neighbors(1).unwrap(),
            &[Neighbor::new(1, 1), Neighbor::new(1, 1)]
        );
    }

    #[test]
    fn test_duplicates_not_collapsed() {
        let kg =
            KnowledgeGraph::from_triples(&[Triple::new(1, 1, 2), Triple::new(1, 1, 2)], 3).unwrap();
        assert_eq!(kg.degree(1).unwrap(), 2);
        assert_eq!(kg.degree(2).unwrap(), 2);
    }

    #[test]
    fn test_gap_entity_rejected() {
        // Entity 2 is inside the space but no triple touches it.
        let err = KnowledgeGraph::from_triples(&[Triple::new(1, 1, 3)], 4).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingEntity {
                id: 2,
                entity_count: 4
            }
        ));
    }

    #[test]
    fn test_space_larger_than_triples_rejected() {
        let err = KnowledgeGraph::from_triples(&[Triple::new(1, 1, 2)], 5).unwrap_err();
        assert!(matches!(err, Error::MissingEntity { id: 3, .. }));

        let err = KnowledgeGraph::from_triples(&[], 2).unwrap_err();
        assert!(matches!(err, Error::MissingEntity { id: 1, .. }));
    }

    #[test]
    fn test_huge_space_rejected_before_allocation() {
        let huge = 1u64 << 45;
        let err = KnowledgeGraph::from_triples(&[Triple::new(1, 1, huge)], huge + 1).unwrap_err();
        assert!(matches!(err, Error::MissingEntity { id: 2, .. }));
    }

    #[test]
    fn test_degrees() {
        assert_eq!(sample_graph().degrees(), vec![0, 1, 2, 1]);
    }

    #[test]
    fn test_missing_entity() {
        let kg = sample_graph();

        assert!(matches!(
            kg.neighbors(0),
            Err(Error::MissingEntity { id: 0, .. })
        ));
        assert!(matches!(
            kg.neighbors(4),
            Err(Error::MissingEntity {
                id: 4,
                entity_count: 4
            })
        ));
    }

    #[test]
    fn test_triple_outside_space() {
        let err = KnowledgeGraph::from_triples(&[Triple::new(1, 1, 9)], 4).unwrap_err();
        assert!(matches!(err, Error::MissingEntity { id: 9, .. }));

        let err = KnowledgeGraph::from_triples(&[Triple::new(1, 0, 2)], 4).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { .. }));
    }

    #[test]
    fn test_empty_graph() {
        let kg = KnowledgeGraph::from_triples(&[], 0).unwrap();
        assert_eq!(kg.entity_count(), 0);
        assert_eq!(kg.entities().count(), 0);
        assert_eq!(kg.stats().avg_degree, 0.0);
    }

    #[test]
    fn test_stats() {
        let kg = KnowledgeGraph::from_triples(
            &[Triple::new(1, 1, 2), Triple::new(1, 2, 3), Triple::new(2, 1, 3)],
            4,
        )
        .unwrap();

        let stats = kg.stats();
        assert_eq!(stats.entity_count, 3);
        assert_eq!(stats.triple_count, 3);
        assert_eq!(stats.edge_count, 6);
        assert_eq!(stats.relation_count, 2);
        assert_eq!(stats.max_degree, 2);
        assert!((stats.avg_degree - 2.0).abs() < 1e-12);
    }
}
