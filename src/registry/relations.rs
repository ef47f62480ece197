//! Relation label interning

use crate::consts::BLANK_RELATION;
use crate::model::RelId;
use rustc_hash::FxHashMap;

/// Interns relation labels to small integer ids
///
/// Index 0 is always the empty label ([`BLANK_RELATION`]). New labels are
/// appended, so index order is first-use order, not alphabetical order.
///
/// ```
/// use nock::RelationTable;
///
/// let mut rels = RelationTable::new();
/// let uses = rels.intern("uses_ingredient");
/// assert_eq!(uses.0, 1);
/// assert_eq!(rels.intern("uses_ingredient"), uses);
/// assert_eq!(rels.lookup("missing"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTable {
    labels: Vec<String>,
    index: FxHashMap<String, RelId>,
}

impl RelationTable {
    /// Create a table holding only the blank relation
    #[must_use]
    pub fn new() -> Self {
        let mut index = FxHashMap::default();
        index.insert(String::new(), BLANK_RELATION);

        Self {
            labels: vec![String::new()],
            index,
        }
    }

    /// Return the id for `label`, appending it if unseen
    pub fn intern(&mut self, label: &str) -> RelId {
        if let Some(rel) = self.index.get(label) {
            return *rel;
        }

        #[allow(clippy::cast_possible_truncation)] // >4B relation labels not supported
        let rel = RelId(self.labels.len() as u32);
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), rel);

        rel
    }

    /// Pure lookup; `None` is the wire-level `NOT_FOUND`
    #[must_use]
    pub fn lookup(&self, label: &str) -> Option<RelId> {
        self.index.get(label).copied()
    }

    /// Label registered under `rel`
    #[must_use]
    pub fn label(&self, rel: RelId) -> Option<&str> {
        self.labels.get(rel.index()).map(String::as_str)
    }

    /// Number of labels, including the blank relation
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false: the blank relation is present from construction
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `(id, label)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (RelId, &str)> + '_ {
        self.labels.iter().enumerate().map(|(i, label)| {
            #[allow(clippy::cast_possible_truncation)]
            let rel = RelId(i as u32);
            (rel, label.as_str())
        })
    }
}

impl Default for RelationTable {
    fn default() -> Self {
        Self::new()
    }
}
