//! Sentence alignment: normalization, tokenization, pairwise matching,
//! consensus-based merge ordering, and sentence-path construction.
//!
//! ## Pipeline
//!
//! ```text
//! SourceRecords → normalize/tokenize → seed chained vertices
//!               → pairwise best alignments → consensus scoring
//!               → preference-forced merges → scored merges
//!               → sentence paths (+ display-label resolution)
//! ```
//!
//! The aligner holds no graph of its own; it mutates a caller-owned
//! [`Graph`] and returns non-owning [`SentencePath`]s into it. There is no
//! internal locking; callers must not mutate the graph concurrently with an
//! in-flight alignment.

use regex_lite::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::graph::{Graph, GraphError, GraphExport, MergeOutcome};
use crate::ids::IdAllocator;
use crate::matching::best_alignment;
use crate::options::AlignerOptions;
use crate::paths::{paths_by_edition, SentencePath};
use crate::types::{SourceOccurrence, SourceRecord, Token, VertexId};

/// Base weight of every selected match pair.
const BASE_PAIR_SCORE: u32 = 2;

/// Punctuation stripped during normalization (besides the `--` digraph).
const PUNCTUATION: [char; 15] = [
    ',', '.', ';', ':', '(', ')', '[', ']', '\'', '"', '´', '`', '“', '”', '!',
];

/// Error type for alignment operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlignError {
    /// Fuzzy-match threshold outside `(0, 1]`.
    #[error("edit-distance threshold out of range: {0}")]
    InvalidThreshold(f64),
    /// Two input records carry the same edition label.
    #[error("duplicate edition label: {0}")]
    DuplicateEdition(String),
    /// The requested edition is not part of this alignment.
    #[error("unknown edition: {0}")]
    UnknownEdition(String),
    /// Graph-level failure.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// A candidate merge pair selected from one pairwise alignment.
#[derive(Debug, Clone)]
struct Candidate {
    /// (sentence, position) of the first token.
    a: (usize, usize),
    /// (sentence, position) of the second token.
    b: (usize, usize),
    /// Global sequence numbers, for consensus bookkeeping.
    a_seq: usize,
    b_seq: usize,
    /// Consensus score; pairs merge in descending order.
    score: u32,
    /// Already handled by the preference-forced pass.
    forced: bool,
}

/// The sentence aligner.
///
/// Stateless apart from its options and pre-compiled normalization regexes;
/// one instance can align any number of corpora.
pub struct Aligner {
    options: AlignerOptions,
    markup: Regex,
    spaces: Regex,
}

impl Aligner {
    /// Create an aligner with validated options.
    pub fn new(options: AlignerOptions) -> Result<Self, AlignError> {
        options.validate()?;
        // Tags start with a letter or a slash, so alignment directives like
        // `<7>word<7>` survive the strip.
        let markup = Regex::new(r"</?[A-Za-z][^>]*>").expect("static regex is valid");
        let spaces = Regex::new(r" {2,}").expect("static regex is valid");
        Ok(Self {
            options,
            markup,
            spaces,
        })
    }

    /// The options this aligner runs with.
    pub fn options(&self) -> &AlignerOptions {
        &self.options
    }

    /// Normalize one raw sentence.
    ///
    /// Strips enclosed-tag markup; when `normalize` is on, lowercases,
    /// deletes the fixed punctuation set and trailing whitespace; always
    /// collapses runs of spaces to one. Idempotent.
    pub fn normalize_sentence(&self, sentence: &str) -> String {
        let mut s = self.markup.replace_all(sentence, "").into_owned();
        if self.options.normalize {
            s = s.to_lowercase();
            s = s.replace("--", "");
            s.retain(|c| !PUNCTUATION.contains(&c));
            s.truncate(s.trim_end().len());
        }
        self.spaces.replace_all(&s, " ").into_owned()
    }

    /// Tokenize one sentence, assigning global sequence numbers from `seq`.
    fn tokenize(&self, sentence: usize, text: &str, seq: &mut usize) -> Vec<Token> {
        self.normalize_sentence(text)
            .split(' ')
            .filter(|w| !w.is_empty())
            .enumerate()
            .map(|(position, word)| {
                let token = Token::from_raw(sentence, position, *seq, word);
                *seq += 1;
                token
            })
            .collect()
    }

    /// Align the source records into `graph` and return one sentence path
    /// per record, in input order.
    ///
    /// The graph is expected to be freshly constructed; alignment seeds one
    /// vertex per token, merges equivalent tokens wherever that keeps the
    /// graph acyclic, and wires the sentinel adjacency.
    pub fn align(
        &self,
        graph: &mut Graph,
        sources: &[SourceRecord],
    ) -> Result<Vec<SentencePath>, AlignError> {
        // Seed one chained vertex per token.
        let mut seq = 0usize;
        let mut tokenized: Vec<Vec<Token>> = Vec::with_capacity(sources.len());
        let mut token_vertex: Vec<Vec<VertexId>> = Vec::with_capacity(sources.len());
        for (i, record) in sources.iter().enumerate() {
            let tokens = self.tokenize(i, &record.text, &mut seq);
            let mut row = Vec::with_capacity(tokens.len());
            let mut last: Option<VertexId> = None;
            for token in &tokens {
                let id = graph.add_vertex(token.text.as_str());
                if let Some(vertex) = graph.vertex_mut(id) {
                    vertex
                        .sources
                        .push(SourceOccurrence::new(i, token.text.clone()));
                    vertex.preference = token.preference.clone();
                }
                if let Some(prev) = last {
                    graph.link(prev, id)?;
                }
                last = Some(id);
                row.push(id);
            }
            token_vertex.push(row);
            tokenized.push(tokens);
        }

        // Best order-preserving alignment per sentence pair; every selected
        // pair becomes a merge candidate at the base weight.
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut word_matches: Vec<Vec<usize>> = vec![Vec::new(); seq];
        for i in 0..tokenized.len() {
            for j in (i + 1)..tokenized.len() {
                let best = best_alignment(&self.options, &tokenized[i], &tokenized[j]);
                for pair in best {
                    let ta = &tokenized[i][pair.a];
                    let tb = &tokenized[j][pair.b];
                    word_matches[ta.seq].push(tb.seq);
                    word_matches[tb.seq].push(ta.seq);
                    candidates.push(Candidate {
                        a: (i, pair.a),
                        b: (j, pair.b),
                        a_seq: ta.seq,
                        b_seq: tb.seq,
                        score: BASE_PAIR_SCORE,
                        forced: false,
                    });
                }
            }
        }
        tracing::debug!(
            sentences = sources.len(),
            tokens = seq,
            candidates = candidates.len(),
            "pairwise matching complete"
        );

        // Consensus: one boost per third token corroborating the pair, then
        // a stable sort so equal scores keep discovery order.
        if self.options.consensus {
            for candidate in &mut candidates {
                for &m1 in &word_matches[candidate.a_seq] {
                    if m1 == candidate.b_seq {
                        continue;
                    }
                    for &m2 in &word_matches[candidate.b_seq] {
                        if m2 == candidate.a_seq {
                            continue;
                        }
                        if m1 == m2 {
                            candidate.score += 1;
                        }
                    }
                }
            }
            candidates.sort_by(|x, y| y.score.cmp(&x.score));
        }

        // Preference-forced pass: pairs whose current vertices share a
        // preference id merge ahead of everything else.
        for index in 0..candidates.len() {
            let (v1, v2) = {
                let c = &candidates[index];
                (token_vertex[c.a.0][c.a.1], token_vertex[c.b.0][c.b.1])
            };
            if v1 == v2 {
                continue;
            }
            let same_preference = match (graph.vertex(v1), graph.vertex(v2)) {
                (Some(a), Some(b)) => {
                    a.preference.is_some() && a.preference == b.preference
                }
                _ => false,
            };
            if same_preference {
                candidates[index].forced = true;
                try_merge(graph, &mut token_vertex, v1, v2)?;
            }
        }

        // Scored pass over everything the forced pass did not handle.
        for candidate in &candidates {
            if candidate.forced {
                continue;
            }
            let v1 = token_vertex[candidate.a.0][candidate.a.1];
            let v2 = token_vertex[candidate.b.0][candidate.b.1];
            if v1 == v2 {
                continue;
            }
            try_merge(graph, &mut token_vertex, v1, v2)?;
        }

        // Sentence paths: start sentinel, post-merge representative per
        // token position, end sentinel.
        let mut paths = Vec::with_capacity(token_vertex.len());
        for row in &token_vertex {
            let mut ids = Vec::with_capacity(row.len() + 2);
            ids.push(graph.start());
            for (position, &vid) in row.iter().enumerate() {
                if position == 0 {
                    graph.link(graph.start(), vid)?;
                }
                if position == row.len() - 1 {
                    graph.link(vid, graph.end())?;
                }
                ids.push(vid);
            }
            ids.push(graph.end());
            paths.push(SentencePath::new(ids));
        }

        // Display labels settle only after all merges.
        let word_ids: Vec<VertexId> = graph.word_vertices().map(|v| v.id).collect();
        for id in word_ids {
            if let Some(vertex) = graph.vertex_mut(id) {
                vertex.resolve_label();
            }
        }

        Ok(paths)
    }
}

/// Merge two current representatives and remap every token slot that
/// pointed at either. A rejected merge is an expected outcome and remaps
/// nothing.
fn try_merge(
    graph: &mut Graph,
    token_vertex: &mut [Vec<VertexId>],
    v1: VertexId,
    v2: VertexId,
) -> Result<(), AlignError> {
    match graph.merge(v1, v2)? {
        MergeOutcome::Merged(merged) => {
            for row in token_vertex.iter_mut() {
                for slot in row.iter_mut() {
                    if *slot == v1 || *slot == v2 {
                        *slot = merged;
                    }
                }
            }
        }
        MergeOutcome::CycleRejected => {}
    }
    Ok(())
}

/// Result of aligning a corpus.
///
/// Owns the working graph, the edition labels, the sentence paths, and a
/// pristine snapshot taken right after alignment. Edits are expected to
/// mutate the working graph and, when the caller wants a clean slate, be
/// discarded wholesale via [`Alignment::restore`]; state is recomputed from
/// the retained snapshot, never patched incrementally.
#[derive(Debug, Clone)]
pub struct Alignment {
    editions: Vec<String>,
    graph: Graph,
    paths: Vec<SentencePath>,
    origin: Graph,
    origin_paths: Vec<SentencePath>,
}

impl Alignment {
    /// The working graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable access to the working graph, e.g. for speculative
    /// interactive merges.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Edition labels, in input order.
    pub fn editions(&self) -> &[String] {
        &self.editions
    }

    /// One sentence path per input record, in input order.
    pub fn paths(&self) -> &[SentencePath] {
        &self.paths
    }

    /// The sentence path of a given edition.
    pub fn path_for_edition(&self, edition: &str) -> Option<&SentencePath> {
        self.editions
            .iter()
            .position(|e| e == edition)
            .map(|i| &self.paths[i])
    }

    /// Overlap-ordered path decomposition relative to a main edition.
    ///
    /// The full main path comes first, followed by the maximal untraced
    /// segments of the remaining paths, strongest overlap first.
    pub fn decompose(&self, main_edition: &str) -> Result<Vec<Vec<VertexId>>, AlignError> {
        let main_index = self
            .editions
            .iter()
            .position(|e| e == main_edition)
            .ok_or_else(|| AlignError::UnknownEdition(main_edition.to_string()))?;
        Ok(paths_by_edition(&self.graph, &self.paths, main_index)?)
    }

    /// Discard the working state and return to the snapshot taken right
    /// after alignment.
    pub fn restore(&mut self) {
        self.graph = self.origin.clone();
        self.paths = self.origin_paths.clone();
        tracing::debug!("alignment state restored from origin snapshot");
    }

    /// Stable, ordered export of the working graph.
    pub fn export(&self) -> GraphExport {
        self.graph.export()
    }
}

/// Align a corpus of source records with the given options.
///
/// Builds a fresh graph (with its own shared allocator), aligns, and bundles
/// the outcome together with a retained snapshot. Edition labels must be
/// unique.
pub fn align_corpus(
    sources: &[SourceRecord],
    options: AlignerOptions,
) -> Result<Alignment, AlignError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for record in sources {
        if !seen.insert(record.edition.as_str()) {
            return Err(AlignError::DuplicateEdition(record.edition.clone()));
        }
    }

    let aligner = Aligner::new(options)?;
    let mut graph = Graph::new(Arc::new(IdAllocator::new()));
    let paths = aligner.align(&mut graph, sources)?;
    let origin = graph.clone();
    let origin_paths = paths.clone();
    Ok(Alignment {
        editions: sources.iter().map(|s| s.edition.clone()).collect(),
        graph,
        paths,
        origin,
        origin_paths,
    })
}
