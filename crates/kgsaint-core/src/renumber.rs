//! Id renumbering: shift raw 0-based ids by one so that 0 stays reserved.
//!
//! Items, heads, relations and tails are all shifted; user ids are kept as
//! they are. The renumbered sets also report the id-space sizes the
//! downstream consumer needs to allocate dense arrays.

use crate::graph::check_dense;
use crate::{Error, RecordKind, RecordTable, Rating, Result, Triple};
use std::collections::HashSet;
use tracing::debug;

/// Renumbered ratings plus their user/item counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingSet {
    ratings: Vec<Rating>,
    n_user: usize,
    n_item: usize,
}

impl RatingSet {
    /// Ratings in table order.
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// Number of distinct users.
    pub fn n_user(&self) -> usize {
        self.n_user
    }

    /// Number of distinct (renumbered) items.
    pub fn n_item(&self) -> usize {
        self.n_item
    }

    /// Consume the set, keeping only the ratings.
    pub fn into_ratings(self) -> Vec<Rating> {
        self.ratings
    }
}

/// Renumbered triples plus the entity/relation space sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripleSet {
    triples: Vec<Triple>,
    n_entity: u64,
    n_relation: usize,
}

impl TripleSet {
    /// Triples in table order.
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// `max(head ∪ tail) + 1`: the dense entity space size, sentinel included.
    /// Zero for an empty table.
    pub fn n_entity(&self) -> u64 {
        self.n_entity
    }

    /// Number of distinct relations.
    pub fn n_relation(&self) -> usize {
        self.n_relation
    }
}

/// Renumber a rating table: `item += 1`.
///
/// # Errors
///
/// [`Error::MalformedRecord`] for negative ids or labels other than 0/1, and
/// [`Error::InvalidConfig`] when handed a knowledge-graph table.
pub fn renumber_ratings(table: &RecordTable) -> Result<RatingSet> {
    expect_kind(table, RecordKind::Ratings)?;

    let mut ratings = Vec::with_capacity(table.len());
    let mut users = HashSet::new();
    let mut items = HashSet::new();

    for (idx, &[user, item, label]) in table.rows().iter().enumerate() {
        let position = idx + 1;
        let user = non_negative(user, "ratings", position, "user")?;
        let item = shift(item, "ratings", position, "item")?;
        let label = match label {
            0 => 0u8,
            1 => 1u8,
            other => {
                return Err(Error::malformed(
                    "ratings",
                    position,
                    format!("label must be 0 or 1, got {other}"),
                ))
            }
        };

        users.insert(user);
        items.insert(item);
        ratings.push(Rating::new(user, item, label));
    }

    debug!(
        ratings = ratings.len(),
        n_user = users.len(),
        n_item = items.len(),
        "renumbered ratings"
    );

    Ok(RatingSet {
        ratings,
        n_user: users.len(),
        n_item: items.len(),
    })
}

/// Renumber a knowledge-graph table: head, relation and tail all `+= 1`.
///
/// Entity ids must cover `0..=max` before the shift; a gap is reported here,
/// before any structure sized by `n_entity` exists.
///
/// # Errors
///
/// [`Error::MissingEntity`] for the first uncovered id, and
/// [`Error::MalformedRecord`] for negative or overflowing ids.
///
/// # Example
///
/// ```rust
/// use kgsaint_core::{renumber_triples, RecordKind, RecordTable, Triple};
///
/// let table = RecordTable::new(RecordKind::KnowledgeGraph, vec![[0, 0, 1], [1, 1, 2]]);
/// let set = renumber_triples(&table).unwrap();
///
/// assert_eq!(set.triples(), &[Triple::new(1, 1, 2), Triple::new(2, 2, 3)]);
/// assert_eq!(set.n_entity(), 4);
/// assert_eq!(set.n_relation(), 2);
/// ```
pub fn renumber_triples(table: &RecordTable) -> Result<TripleSet> {
    expect_kind(table, RecordKind::KnowledgeGraph)?;

    let mut triples = Vec::with_capacity(table.len());
    let mut relations = HashSet::new();
    let mut max_entity = None;

    for (idx, &[head, relation, tail]) in table.rows().iter().enumerate() {
        let position = idx + 1;
        let head = shift(head, "kg", position, "head")?;
        let relation = shift(relation, "kg", position, "relation")?;
        let tail = shift(tail, "kg", position, "tail")?;

        max_entity = max_entity.max(Some(head.max(tail)));
        relations.insert(relation);
        triples.push(Triple::new(head, relation, tail));
    }

    let n_entity = max_entity.map_or(0, |max| max + 1);
    check_dense(triples.iter().flat_map(|t| [t.head, t.tail]), n_entity)?;

    debug!(
        triples = triples.len(),
        n_entity,
        n_relation = relations.len(),
        "renumbered triples"
    );

    Ok(TripleSet {
        triples,
        n_entity,
        n_relation: relations.len(),
    })
}

fn expect_kind(table: &RecordTable, kind: RecordKind) -> Result<()> {
    if table.kind() == kind {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "expected a {kind} table, got a {} table",
            table.kind()
        )))
    }
}

fn non_negative(raw: i64, table: &str, position: usize, field: &str) -> Result<u64> {
    u64::try_from(raw)
        .map_err(|_| Error::malformed(table, position, format!("{field} id {raw} is negative")))
}

fn shift(raw: i64, table: &str, position: usize, field: &str) -> Result<u64> {
    non_negative(raw, table, position, field)?
        .checked_add(1)
        .ok_or_else(|| Error::malformed(table, position, format!("{field} id {raw} overflows")))
}
