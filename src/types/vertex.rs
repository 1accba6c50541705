//! Vertex types for the variant graph.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Unique identifier for a vertex in the variant graph.
///
/// Issued by the shared [`IdAllocator`](crate::IdAllocator); never reused.
/// Implements `Ord` for deterministic ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(u64);

impl VertexId {
    /// Create a VertexId from a raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// One token occurrence folded into a vertex.
///
/// `text` is the display text of the occurrence: the normalized token, or the
/// word extracted from an alignment directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOccurrence {
    /// Index of the contributing sentence in input order.
    pub sentence: usize,
    /// Display text contributed by this occurrence.
    pub text: String,
}

impl SourceOccurrence {
    /// Create a new occurrence.
    pub fn new(sentence: usize, text: impl Into<String>) -> Self {
        Self {
            sentence,
            text: text.into(),
        }
    }
}

/// A vertex of the variant graph: one token occurrence, or a merge of several.
///
/// Adjacency is kept as id sets on both sides; duplicate edges collapse.
/// The two sentinel vertices carry an empty label and no sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Unique vertex id.
    pub id: VertexId,
    /// Display label. Resolved after alignment to the most frequent source
    /// text; empty for sentinels.
    pub label: String,
    /// Number of token occurrences folded into this vertex.
    pub count: u32,
    /// Contributing occurrences, in fold order.
    pub sources: Vec<SourceOccurrence>,
    /// Ids of vertices with an edge into this one.
    pub predecessors: BTreeSet<VertexId>,
    /// Ids of vertices this one has an edge to.
    pub successors: BTreeSet<VertexId>,
    /// Alignment-preference id inherited from a directive token, if any.
    pub preference: Option<String>,
}

impl Vertex {
    /// Create a vertex representing a single token occurrence.
    pub fn new(id: VertexId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            count: 1,
            sources: Vec::new(),
            predecessors: BTreeSet::new(),
            successors: BTreeSet::new(),
            preference: None,
        }
    }

    /// Create a sentinel vertex: empty label, zero folded occurrences.
    pub(crate) fn sentinel(id: VertexId) -> Self {
        Self {
            count: 0,
            ..Self::new(id, "")
        }
    }

    /// Whether this vertex is a sentinel (empty label, no sources).
    pub fn is_sentinel(&self) -> bool {
        self.label.is_empty() && self.sources.is_empty()
    }

    /// Record an edge to `successor`. Duplicates collapse.
    pub fn add_successor(&mut self, successor: VertexId) {
        self.successors.insert(successor);
    }

    /// Record an edge from `predecessor`. Duplicates collapse.
    pub fn add_predecessor(&mut self, predecessor: VertexId) {
        self.predecessors.insert(predecessor);
    }

    /// Drop the edge to `successor`, if present.
    pub fn remove_successor(&mut self, successor: VertexId) {
        self.successors.remove(&successor);
    }

    /// Drop the edge from `predecessor`, if present.
    pub fn remove_predecessor(&mut self, predecessor: VertexId) {
        self.predecessors.remove(&predecessor);
    }

    /// Resolve the display label to the most frequent source text.
    ///
    /// First-seen wins ties. Sentinels and vertices without sources keep
    /// their current label.
    pub fn resolve_label(&mut self) {
        let mut best: Option<(&str, usize)> = None;
        for occurrence in &self.sources {
            let n = self
                .sources
                .iter()
                .filter(|o| o.text == occurrence.text)
                .count();
            match best {
                Some((_, m)) if n <= m => {}
                _ => best = Some((&occurrence.text, n)),
            }
        }
        if let Some((text, _)) = best {
            self.label = text.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_collapses_duplicates() {
        let mut v = Vertex::new(VertexId::new(1), "word");
        v.add_successor(VertexId::new(2));
        v.add_successor(VertexId::new(2));
        assert_eq!(v.successors.len(), 1);
    }

    #[test]
    fn label_resolves_to_most_frequent_source() {
        let mut v = Vertex::new(VertexId::new(1), "cat");
        v.sources.push(SourceOccurrence::new(0, "cat"));
        v.sources.push(SourceOccurrence::new(1, "katze"));
        v.sources.push(SourceOccurrence::new(2, "katze"));
        v.resolve_label();
        assert_eq!(v.label, "katze");
    }

    #[test]
    fn label_tie_keeps_first_seen() {
        let mut v = Vertex::new(VertexId::new(1), "x");
        v.sources.push(SourceOccurrence::new(0, "heaven"));
        v.sources.push(SourceOccurrence::new(1, "heavens"));
        v.resolve_label();
        assert_eq!(v.label, "heaven");
    }

    #[test]
    fn sentinel_has_no_sources() {
        let v = Vertex::sentinel(VertexId::new(0));
        assert!(v.is_sentinel());
        assert_eq!(v.count, 0);
    }
}
