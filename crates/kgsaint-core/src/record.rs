//! Record types: raw integer tables and their renumbered views.
//!
//! Raw tables hold exactly what was on disk (signed, 0-based). Renumbered
//! records use unsigned ids where `0` is reserved as [`SENTINEL`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity id in the renumbered (1-based) space.
pub type EntityId = u64;
/// Relation id in the renumbered (1-based) space.
pub type RelationId = u64;
/// User id, taken verbatim from the rating table.
pub type UserId = u64;
/// Item id in the renumbered (1-based) space.
pub type ItemId = u64;

/// Reserved id meaning "no entity / no relation / padding".
pub const SENTINEL: u64 = 0;

/// Which table a file or cache holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// `user item label` rows.
    Ratings,
    /// `head relation tail` rows.
    KnowledgeGraph,
}

impl RecordKind {
    /// File stem used for both the text source and the binary cache.
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Ratings => "ratings_final",
            Self::KnowledgeGraph => "kg_final",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ratings => write!(f, "rating"),
            Self::KnowledgeGraph => write!(f, "knowledge graph"),
        }
    }
}

/// An `N×3` table of raw signed integers, tagged with its kind.
///
/// This is the unit the loader reads and the cache stores; a table read from
/// the cache is identical to the one parsed from text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTable {
    kind: RecordKind,
    rows: Vec<[i64; 3]>,
}

impl RecordTable {
    /// Create a table from rows.
    pub fn new(kind: RecordKind, rows: Vec<[i64; 3]>) -> Self {
        Self { kind, rows }
    }

    /// Kind tag.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// All rows, in file order.
    pub fn rows(&self) -> &[[i64; 3]] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over one column.
    pub fn column(&self, index: usize) -> impl Iterator<Item = i64> + '_ {
        self.rows.iter().map(move |row| row[index])
    }
}

/// A renumbered `(head, relation, tail)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    /// Head entity.
    pub head: EntityId,
    /// Relation.
    pub relation: RelationId,
    /// Tail entity.
    pub tail: EntityId,
}

impl Triple {
    /// Create a new triple.
    pub fn new(head: EntityId, relation: RelationId, tail: EntityId) -> Self {
        Self {
            head,
            relation,
            tail,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.head, self.relation, self.tail)
    }
}

/// A renumbered `(user, item, label)` rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rating {
    /// User id.
    pub user: UserId,
    /// Item id (shifted by one so that 0 stays free).
    pub item: ItemId,
    /// Implicit feedback label, 0 or 1.
    pub label: u8,
}

impl Rating {
    /// Create a new rating.
    pub fn new(user: UserId, item: ItemId, label: u8) -> Self {
        Self { user, item, label }
    }
}
