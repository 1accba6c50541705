//! Sentence paths and the overlap-ordered path decomposition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::graph::{Graph, GraphError};
use crate::types::{Vertex, VertexId};

/// The path of one input sentence through the variant graph.
///
/// Begins at the start sentinel and ends at the end sentinel, with one entry
/// per token in between. Holds non-owning ids that must be resolved against
/// a specific [`Graph`] instance; a path is not independently valid across
/// graphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentencePath {
    vertices: Vec<VertexId>,
}

impl SentencePath {
    /// Create a path from an ordered id sequence (sentinels included).
    pub fn new(vertices: Vec<VertexId>) -> Self {
        Self { vertices }
    }

    /// The full id sequence, sentinels included.
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// The ids between the sentinels, one per token.
    pub fn interior(&self) -> &[VertexId] {
        match self.vertices.len() {
            0 | 1 | 2 => &[],
            n => &self.vertices[1..n - 1],
        }
    }

    /// Number of entries, sentinels included.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the path has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Resolve every id against `graph`.
    ///
    /// Fails with [`GraphError::VertexNotFound`] when an id has gone stale,
    /// for instance after resolving against a different graph than the path
    /// was built for.
    pub fn resolve<'g>(&self, graph: &'g Graph) -> Result<Vec<&'g Vertex>, GraphError> {
        self.vertices
            .iter()
            .map(|&id| graph.vertex(id).ok_or(GraphError::VertexNotFound(id)))
            .collect()
    }

    /// The display labels of the interior vertices, in order.
    pub fn labels(&self, graph: &Graph) -> Result<Vec<String>, GraphError> {
        self.interior()
            .iter()
            .map(|&id| {
                graph
                    .vertex(id)
                    .map(|v| v.label.clone())
                    .ok_or(GraphError::VertexNotFound(id))
            })
            .collect()
    }
}

/// Decompose sentence paths into an overlap-ordered list of render paths.
///
/// The main path is emitted first in full and its vertices marked traced.
/// Repeatedly, the remaining path with the most traced vertices is selected
/// (ties broken by the highest total frequency weight of its untraced
/// vertices, further ties by input order) and its maximal untraced runs are
/// emitted as segments bounded by a traced vertex on each side where
/// available.
pub fn paths_by_edition(
    graph: &Graph,
    paths: &[SentencePath],
    main_index: usize,
) -> Result<Vec<Vec<VertexId>>, GraphError> {
    debug_assert!(main_index < paths.len(), "main path index out of range");
    let main = match paths.get(main_index) {
        Some(path) => path,
        None => return Ok(Vec::new()),
    };

    let mut traced: BTreeSet<VertexId> = main.vertices().iter().copied().collect();
    let mut result: Vec<Vec<VertexId>> = vec![main.vertices().to_vec()];
    let mut remaining: Vec<&SentencePath> = paths
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != main_index)
        .map(|(_, p)| p)
        .collect();

    while !remaining.is_empty() {
        let mut best: Option<(usize, usize, u64)> = None;
        for (index, path) in remaining.iter().enumerate() {
            let mut overlap = 0usize;
            let mut strength = 0u64;
            for &vid in path.vertices() {
                if traced.contains(&vid) {
                    overlap += 1;
                } else {
                    let vertex = graph.vertex(vid).ok_or(GraphError::VertexNotFound(vid))?;
                    strength += u64::from(vertex.count);
                }
            }
            let better = match best {
                None => true,
                Some((_, bo, bs)) => overlap > bo || (overlap == bo && strength > bs),
            };
            if better {
                best = Some((index, overlap, strength));
            }
        }
        let chosen = match best {
            Some((index, _, _)) => index,
            None => break,
        };

        let path = remaining.remove(chosen);
        let vertices = path.vertices();
        let mut segment: Option<Vec<VertexId>> = None;
        for (index, &vid) in vertices.iter().enumerate() {
            let is_traced = traced.contains(&vid);
            segment = match segment {
                None if !is_traced => {
                    let mut run = Vec::new();
                    if index > 0 {
                        run.push(vertices[index - 1]);
                    }
                    run.push(vid);
                    Some(run)
                }
                Some(mut run) if is_traced => {
                    run.push(vid);
                    result.push(run);
                    None
                }
                Some(mut run) => {
                    run.push(vid);
                    Some(run)
                }
                None => None,
            };
            traced.insert(vid);
        }
        if let Some(run) = segment {
            result.push(run);
        }
    }

    Ok(result)
}
