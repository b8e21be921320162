//! Record and index types.

use serde::{Deserialize, Serialize};

use crate::RecordId;

/// Score at or above which a record counts as a strong association.
pub const HIGH_SCORE_THRESHOLD: i32 = 7;

/// Scores below this value are weak associations.
pub const LOW_SCORE_THRESHOLD: i32 = 4;

/// One brand-association entry.
///
/// Created exactly once and never updated. The plaintext fields are the
/// metadata needed for browsing; everything sensitive lives in `ciphertext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Unique identifier, also the suffix of the storage key.
    pub id: RecordId,
    /// Media platform (e.g. "TV", "Print").
    pub platform: String,
    /// Brand name.
    pub brand: String,
    /// Association score, 1-10 by convention.
    pub score: i32,
    /// Opaque output of the encryption collaborator.
    pub ciphertext: String,
    /// Creation time in seconds since the Unix epoch.
    pub created_at: u64,
    /// Account that created the record.
    pub owner: String,
}

impl Record {
    /// Whether the score falls in the high band (>= 7).
    pub fn is_strong(&self) -> bool {
        self.score >= HIGH_SCORE_THRESHOLD
    }
}

/// Ordered manifest of every known record id.
///
/// Append-only: ids are never removed, and appending an id that is
/// already present is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Index(Vec<RecordId>);

impl Index {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `id` unless already present. Returns whether it was added.
    pub fn push_unique(&mut self, id: RecordId) -> bool {
        if self.0.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Check membership.
    pub fn contains(&self, id: &RecordId) -> bool {
        self.0.contains(id)
    }

    /// Number of ids.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the index holds no ids.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate ids in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, RecordId> {
        self.0.iter()
    }

    /// Borrow the ids as a slice.
    pub fn as_slice(&self) -> &[RecordId] {
        &self.0
    }
}

impl From<Vec<RecordId>> for Index {
    fn from(ids: Vec<RecordId>) -> Self {
        Self(ids)
    }
}

impl FromIterator<RecordId> for Index {
    fn from_iter<I: IntoIterator<Item = RecordId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Index {
    type Item = RecordId;
    type IntoIter = std::vec::IntoIter<RecordId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Index {
    type Item = &'a RecordId;
    type IntoIter = std::slice::Iter<'a, RecordId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
