//! Explicit cross-run vertex registry.
//!
//! Accumulating vertices across independent alignment runs (for instance by
//! language, to drive cross-language token lookups downstream) is the
//! caller's business: the registry is an ordinary object the caller feeds
//! finished graphs into, never ambient global state inside the kernel.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::graph::Graph;
use crate::types::Vertex;

/// Registry of word vertices aggregated from finished alignment runs,
/// bucketed by a caller-chosen key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VertexRegistry {
    buckets: BTreeMap<String, Vec<Vertex>>,
}

impl VertexRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy every word vertex of `graph` into the given bucket.
    ///
    /// Sentinels are skipped. The registry stores snapshots; later mutation
    /// of the graph does not reach back into recorded entries.
    pub fn record(&mut self, bucket: impl Into<String>, graph: &Graph) {
        let entries = self.buckets.entry(bucket.into()).or_default();
        entries.extend(graph.word_vertices().cloned());
    }

    /// All vertices recorded under `bucket`, in recording order.
    pub fn bucket(&self, bucket: &str) -> &[Vertex] {
        self.buckets.get(bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bucket keys, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Vertices in `bucket` whose display label equals `label`.
    pub fn find(&self, bucket: &str, label: &str) -> Vec<&Vertex> {
        self.bucket(bucket)
            .iter()
            .filter(|v| v.label == label)
            .collect()
    }

    /// Total number of recorded vertices across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
