//! The variant graph: vertex ownership, adjacency maintenance, cloning, and
//! the cycle-safe merge primitive.
//!
//! ## Invariant
//!
//! The graph is acyclic at all times. The only mutation capable of violating
//! this, [`Graph::merge`], checks the consequences of the specific merge
//! before committing anything, and reports rejection as an ordinary outcome
//! rather than an error.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use crate::canonical::canonical_hash_hex;
use crate::ids::IdAllocator;
use crate::types::{SourceOccurrence, Vertex, VertexId};
use crate::SCHEMA_VERSION;

/// Error type for graph operations.
///
/// A rejected merge is not an error; see [`MergeOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Lookup of an id that is absent, typically because a prior merge
    /// removed the vertex.
    #[error("vertex not found: {0}")]
    VertexNotFound(VertexId),
    /// A vertex cannot be merged or linked with itself.
    #[error("identical vertices: {0}")]
    IdenticalVertices(VertexId),
    /// The start and end sentinels take part in no merge.
    #[error("sentinel vertex cannot be merged: {0}")]
    SentinelMerge(VertexId),
}

/// Outcome of a merge attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The merge committed; both inputs were replaced by this vertex.
    Merged(VertexId),
    /// The merge would have closed a cycle; nothing changed.
    CycleRejected,
}

impl MergeOutcome {
    /// The merged vertex id, if the merge committed.
    pub fn merged(&self) -> Option<VertexId> {
        match self {
            Self::Merged(id) => Some(*id),
            Self::CycleRejected => None,
        }
    }

    /// Whether the merge was rejected.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::CycleRejected)
    }
}

/// A text variant graph.
///
/// Owns every [`Vertex`] of one alignment session through an id-keyed map,
/// plus the start and end sentinels present from construction. Cloning
/// yields a structurally isomorphic, fully independent copy (new vertex
/// instances, same ids, same adjacency) sharing nothing mutable with the
/// original except the id allocator.
#[derive(Debug, Clone)]
pub struct Graph {
    vertices: BTreeMap<VertexId, Vertex>,
    start: VertexId,
    end: VertexId,
    ids: Arc<IdAllocator>,
}

impl Graph {
    /// Create an empty graph holding only the two sentinels.
    pub fn new(ids: Arc<IdAllocator>) -> Self {
        let start = ids.next_id();
        let end = ids.next_id();
        let mut vertices = BTreeMap::new();
        vertices.insert(start, Vertex::sentinel(start));
        vertices.insert(end, Vertex::sentinel(end));
        Self {
            vertices,
            start,
            end,
            ids,
        }
    }

    /// The shared id allocator.
    pub fn ids(&self) -> &Arc<IdAllocator> {
        &self.ids
    }

    /// Id of the start sentinel.
    pub fn start(&self) -> VertexId {
        self.start
    }

    /// Id of the end sentinel.
    pub fn end(&self) -> VertexId {
        self.end
    }

    /// Add a fresh single-occurrence vertex and return its id.
    pub fn add_vertex(&mut self, label: impl Into<String>) -> VertexId {
        let id = self.ids.next_id();
        self.vertices.insert(id, Vertex::new(id, label));
        id
    }

    /// Look up a vertex by id.
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub(crate) fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(&id)
    }

    /// Whether the graph contains `id`.
    pub fn contains(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    /// All vertices, in id order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// All non-sentinel vertices, in id order.
    pub fn word_vertices(&self) -> impl Iterator<Item = &Vertex> {
        let (start, end) = (self.start, self.end);
        self.vertices
            .values()
            .filter(move |v| v.id != start && v.id != end)
    }

    /// Number of vertices, sentinels included.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.vertices.values().map(|v| v.successors.len()).sum()
    }

    /// Add the edge `from → to`. Duplicates collapse.
    pub fn link(&mut self, from: VertexId, to: VertexId) -> Result<(), GraphError> {
        if from == to {
            return Err(GraphError::IdenticalVertices(from));
        }
        if !self.vertices.contains_key(&from) {
            return Err(GraphError::VertexNotFound(from));
        }
        if !self.vertices.contains_key(&to) {
            return Err(GraphError::VertexNotFound(to));
        }
        if let Some(v) = self.vertices.get_mut(&from) {
            v.add_successor(to);
        }
        if let Some(v) = self.vertices.get_mut(&to) {
            v.add_predecessor(from);
        }
        Ok(())
    }

    /// Attempt to merge two vertices into one.
    ///
    /// On success the merged vertex combines both occurrence counts, source
    /// lists, and (redirected) adjacency, the two originals are removed, and
    /// their ids become stale. If committing would close a directed cycle,
    /// nothing changes and [`MergeOutcome::CycleRejected`] is returned. An
    /// edge between the two partners would collapse into a self-edge on the
    /// merged vertex, so adjacent vertices always reject.
    ///
    /// Callers must pass the *current* representatives; ids removed by a
    /// prior merge yield [`GraphError::VertexNotFound`].
    pub fn merge(&mut self, a: VertexId, b: VertexId) -> Result<MergeOutcome, GraphError> {
        if a == b {
            return Err(GraphError::IdenticalVertices(a));
        }
        for id in [a, b] {
            if id == self.start || id == self.end {
                return Err(GraphError::SentinelMerge(id));
            }
        }
        let v1 = self.vertices.get(&a).ok_or(GraphError::VertexNotFound(a))?;
        let v2 = self.vertices.get(&b).ok_or(GraphError::VertexNotFound(b))?;

        // Ids burned by rejected attempts are never reused.
        let merged_id = self.ids.next_id();
        let redirect = |id: VertexId| if id == a || id == b { merged_id } else { id };

        let merged_preds: BTreeSet<VertexId> = v1
            .predecessors
            .iter()
            .chain(v2.predecessors.iter())
            .copied()
            .map(redirect)
            .collect();
        let merged_succs: BTreeSet<VertexId> = v1
            .successors
            .iter()
            .chain(v2.successors.iter())
            .copied()
            .map(redirect)
            .collect();

        // An edge between the two partners collapses into a self-edge on the
        // merged vertex: a cycle of length one.
        if merged_succs.contains(&merged_id) {
            tracing::debug!(%a, %b, "merge rejected, partners adjacent");
            return Ok(MergeOutcome::CycleRejected);
        }

        if self.wave_detects_cycle(a, b, merged_id, &merged_preds, &merged_succs) {
            tracing::debug!(%a, %b, "merge rejected, would close a cycle");
            return Ok(MergeOutcome::CycleRejected);
        }

        // Commit. Combine the payloads, rewire every neighbor, drop the
        // originals.
        let label = v1.label.clone();
        let preference = v1.preference.clone().or_else(|| v2.preference.clone());
        let count = v1.count + v2.count;
        let mut sources = v1.sources.clone();
        sources.extend(v2.sources.iter().cloned());

        self.vertices.remove(&a);
        self.vertices.remove(&b);
        for &p in &merged_preds {
            if let Some(v) = self.vertices.get_mut(&p) {
                v.remove_successor(a);
                v.remove_successor(b);
                v.add_successor(merged_id);
            }
        }
        for &s in &merged_succs {
            if let Some(v) = self.vertices.get_mut(&s) {
                v.remove_predecessor(a);
                v.remove_predecessor(b);
                v.add_predecessor(merged_id);
            }
        }
        self.vertices.insert(
            merged_id,
            Vertex {
                id: merged_id,
                label,
                count,
                sources,
                predecessors: merged_preds,
                successors: merged_succs,
                preference,
            },
        );

        debug_assert!(self.is_acyclic(), "merge committed a cycle");
        tracing::debug!(%a, %b, %merged_id, "merged vertices");
        Ok(MergeOutcome::Merged(merged_id))
    }

    /// Forward limit/counter wave over the post-merge view of the graph.
    ///
    /// Every vertex's `limit` is its expected in-degree after the merge,
    /// with edges from the two partners redirected to the tentative merged
    /// vertex. The merged vertex starts with its counter saturated, so any
    /// wave arrival there means a path from one of its successors back into
    /// one of its predecessors, a cycle through the merge point. This is
    /// not a general cycle detector: it is only correct because the graph is
    /// acyclic before each attempt.
    fn wave_detects_cycle(
        &self,
        a: VertexId,
        b: VertexId,
        merged_id: VertexId,
        merged_preds: &BTreeSet<VertexId>,
        merged_succs: &BTreeSet<VertexId>,
    ) -> bool {
        let redirect = |id: VertexId| if id == a || id == b { merged_id } else { id };

        let mut limit: HashMap<VertexId, usize> = HashMap::with_capacity(self.vertices.len());
        for (&id, vertex) in &self.vertices {
            if id == a || id == b {
                continue;
            }
            let preds: BTreeSet<VertexId> =
                vertex.predecessors.iter().copied().map(redirect).collect();
            limit.insert(id, preds.len());
        }
        limit.insert(merged_id, merged_preds.len());

        let mut visited: HashMap<VertexId, usize> = HashMap::new();
        visited.insert(merged_id, merged_preds.len());

        let mut frontier: Vec<VertexId> = merged_succs.iter().copied().collect();
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for id in frontier {
                let seen = visited.entry(id).or_insert(0);
                *seen += 1;
                if *seen > limit.get(&id).copied().unwrap_or(0) {
                    return true;
                }
                if *seen == 1 {
                    if let Some(vertex) = self.vertices.get(&id) {
                        for &s in &vertex.successors {
                            next.push(redirect(s));
                        }
                    }
                }
            }
            frontier = next;
        }
        false
    }

    /// Whole-graph acyclicity audit (Kahn's algorithm).
    ///
    /// Merge maintains this; the audit exists for debug assertions and
    /// tests.
    pub fn is_acyclic(&self) -> bool {
        let mut indegree: BTreeMap<VertexId, usize> = self
            .vertices
            .iter()
            .map(|(&id, v)| (id, v.predecessors.len()))
            .collect();
        let mut queue: VecDeque<VertexId> = indegree
            .iter()
            .filter(|&(_, &d)| d == 0)
            .map(|(&id, _)| id)
            .collect();

        let mut released = 0usize;
        while let Some(id) = queue.pop_front() {
            released += 1;
            if let Some(vertex) = self.vertices.get(&id) {
                for &s in &vertex.successors {
                    if let Some(d) = indegree.get_mut(&s) {
                        *d -= 1;
                        if *d == 0 {
                            queue.push_back(s);
                        }
                    }
                }
            }
        }
        released == self.vertices.len()
    }

    /// Export the graph as a stable, ordered, serializable bundle.
    pub fn export(&self) -> GraphExport {
        let vertices = self
            .vertices
            .values()
            .map(|v| VertexExport {
                id: v.id,
                label: v.label.clone(),
                count: v.count,
                preference: v.preference.clone(),
                sources: v.sources.clone(),
            })
            .collect();
        let edges = self
            .vertices
            .values()
            .flat_map(|v| v.successors.iter().map(move |&s| (v.id, s)))
            .collect();
        GraphExport {
            schema_version: SCHEMA_VERSION.to_string(),
            start: self.start,
            end: self.end,
            vertices,
            edges,
        }
    }
}

/// One vertex of a [`GraphExport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexExport {
    /// Vertex id.
    pub id: VertexId,
    /// Resolved display label.
    pub label: String,
    /// Folded occurrence count.
    pub count: u32,
    /// Preference id, if any.
    pub preference: Option<String>,
    /// Contributing occurrences.
    pub sources: Vec<SourceOccurrence>,
}

/// Stable, ordered export of a graph.
///
/// Vertices are ordered by id and edges by (from, to), so two structurally
/// identical graphs produce identical exports and identical fingerprints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    /// Schema version of the exporting kernel.
    pub schema_version: String,
    /// Id of the start sentinel.
    pub start: VertexId,
    /// Id of the end sentinel.
    pub end: VertexId,
    /// All vertices, ordered by id.
    pub vertices: Vec<VertexExport>,
    /// All directed edges, ordered by (from, to).
    pub edges: Vec<(VertexId, VertexId)>,
}

impl GraphExport {
    /// Deterministic fingerprint of the exported structure.
    pub fn fingerprint(&self) -> String {
        canonical_hash_hex(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> Graph {
        Graph::new(Arc::new(IdAllocator::new()))
    }

    /// start → a → b → end, returning (graph, a, b).
    fn chain2() -> (Graph, VertexId, VertexId) {
        let mut g = graph();
        let a = g.add_vertex("a");
        let b = g.add_vertex("b");
        g.link(g.start(), a).unwrap();
        g.link(a, b).unwrap();
        g.link(b, g.end()).unwrap();
        (g, a, b)
    }

    #[test]
    fn new_graph_has_only_sentinels() {
        let g = graph();
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 0);
        assert!(g.is_acyclic());
        assert!(g.vertex(g.start()).unwrap().is_sentinel());
    }

    #[test]
    fn link_is_symmetric_and_deduplicated() {
        let (g, a, b) = chain2();
        assert!(g.vertex(a).unwrap().successors.contains(&b));
        assert!(g.vertex(b).unwrap().predecessors.contains(&a));
        let mut g = g;
        g.link(a, b).unwrap();
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn merge_combines_counts_sources_and_adjacency() {
        let mut g = graph();
        // start → a → x → end and start → b → y → end; merge x with y.
        let a = g.add_vertex("a");
        let x = g.add_vertex("x");
        let b = g.add_vertex("b");
        let y = g.add_vertex("x");
        for (from, to) in [(g.start(), a), (a, x), (x, g.end())] {
            g.link(from, to).unwrap();
        }
        for (from, to) in [(g.start(), b), (b, y), (y, g.end())] {
            g.link(from, to).unwrap();
        }
        g.vertex_mut(x).unwrap().sources.push(SourceOccurrence::new(0, "x"));
        g.vertex_mut(y).unwrap().sources.push(SourceOccurrence::new(1, "x"));

        let before = g.vertex_count();
        let outcome = g.merge(x, y).unwrap();
        let merged = outcome.merged().expect("merge should commit");

        assert_eq!(g.vertex_count(), before - 1);
        assert!(!g.contains(x));
        assert!(!g.contains(y));
        let m = g.vertex(merged).unwrap();
        assert_eq!(m.count, 2);
        assert_eq!(m.sources.len(), 2);
        assert_eq!(
            m.predecessors.iter().copied().collect::<Vec<_>>(),
            vec![a, b]
        );
        assert!(m.successors.contains(&g.end()));
        assert!(g.vertex(a).unwrap().successors.contains(&merged));
        assert!(g.is_acyclic());
    }

    #[test]
    fn merge_of_adjacent_vertices_is_rejected() {
        let (mut g, a, b) = chain2();
        let outcome = g.merge(a, b).unwrap();
        assert!(outcome.is_rejected());
        assert!(g.contains(a));
        assert!(g.contains(b));
        assert!(g.is_acyclic());
    }

    #[test]
    fn merge_closing_a_cycle_is_rejected() {
        // Sentence one: a → b. Sentence two: b' → a'. Merging the a's is
        // fine; the b's then sit on both sides of the merged a.
        let mut g = graph();
        let a1 = g.add_vertex("a");
        let b1 = g.add_vertex("b");
        let b2 = g.add_vertex("b");
        let a2 = g.add_vertex("a");
        g.link(a1, b1).unwrap();
        g.link(b2, a2).unwrap();

        let merged_a = g.merge(a1, a2).unwrap().merged().expect("first merge commits");
        let outcome = g.merge(b1, b2).unwrap();
        assert!(outcome.is_rejected());
        assert!(g.contains(b1));
        assert!(g.contains(b2));
        assert!(g.contains(merged_a));
        assert!(g.is_acyclic());
    }

    #[test]
    fn rejected_merge_leaves_structure_untouched() {
        let mut g = graph();
        let a1 = g.add_vertex("a");
        let b1 = g.add_vertex("b");
        let b2 = g.add_vertex("b");
        let a2 = g.add_vertex("a");
        g.link(a1, b1).unwrap();
        g.link(b2, a2).unwrap();
        g.merge(a1, a2).unwrap();

        let before = g.export();
        assert!(g.merge(b1, b2).unwrap().is_rejected());
        assert_eq!(g.export().fingerprint(), before.fingerprint());
    }

    #[test]
    fn stale_ids_report_not_found() {
        let mut g = graph();
        let a1 = g.add_vertex("a");
        let a2 = g.add_vertex("a");
        let c = g.add_vertex("c");
        g.merge(a1, a2).unwrap();
        assert_eq!(g.merge(a1, c), Err(GraphError::VertexNotFound(a1)));
        assert!(g.vertex(a1).is_none());
    }

    #[test]
    fn sentinels_never_merge() {
        let mut g = graph();
        let a = g.add_vertex("a");
        let start = g.start();
        assert_eq!(g.merge(start, a), Err(GraphError::SentinelMerge(start)));
        assert_eq!(g.merge(a, a), Err(GraphError::IdenticalVertices(a)));
    }

    #[test]
    fn merge_never_invents_edges() {
        let mut g = graph();
        let a = g.add_vertex("a");
        let x = g.add_vertex("x");
        let b = g.add_vertex("b");
        let y = g.add_vertex("x");
        g.link(a, x).unwrap();
        g.link(b, y).unwrap();

        let neighbor_union: BTreeSet<VertexId> = [a, b].into_iter().collect();
        let merged = g.merge(x, y).unwrap().merged().unwrap();
        let m = g.vertex(merged).unwrap();
        let neighbors: BTreeSet<VertexId> = m
            .predecessors
            .iter()
            .chain(m.successors.iter())
            .copied()
            .collect();
        assert_eq!(neighbors, neighbor_union);
    }

    #[test]
    fn clone_is_independent_but_shares_ids() {
        let (g, a, _) = chain2();
        let mut copy = g.clone();
        assert_eq!(copy.export().fingerprint(), g.export().fingerprint());

        // New ids allocated through the clone do not collide with the
        // original's.
        let fresh = copy.add_vertex("fresh");
        assert!(!g.contains(fresh));
        assert!(fresh > g.end());

        // Mutating the clone leaves the original untouched.
        copy.vertex_mut(a).unwrap().label = "changed".to_string();
        assert_eq!(g.vertex(a).unwrap().label, "a");
    }

    #[test]
    fn export_orders_vertices_and_edges() {
        let (g, _, _) = chain2();
        let export = g.export();
        let mut ids: Vec<VertexId> = export.vertices.iter().map(|v| v.id).collect();
        ids.sort();
        assert_eq!(
            ids,
            export.vertices.iter().map(|v| v.id).collect::<Vec<_>>()
        );
        let mut edges = export.edges.clone();
        edges.sort();
        assert_eq!(edges, export.edges);
    }
}
