//! # variant-graph-kernel
//!
//! Deterministic alignment of textual variants into a text variant graph.
//!
//! Multiple variants of the same passage (editions, witnesses,
//! translations) are folded into a single shared token graph: each vertex
//! is a word carried by one or more input sentences, and every input
//! sentence is a path through the graph from a virtual start vertex to a
//! virtual end vertex. Tokens judged equivalent (exactly, within an edit
//! distance, or forced by an inline alignment directive) are merged into
//! one vertex whenever doing so keeps the graph acyclic.
//!
//! ## Pipeline
//!
//! ```text
//! SourceRecords → Aligner (normalize, tokenize, match, score, merge)
//!              → Graph + SentencePaths → overlap-ordered decomposition
//! ```
//!
//! ## Invariants
//!
//! - The graph is acyclic after every individual merge, not only at the end
//! - Every sentence path reproduces its normalized token sequence exactly
//! - Same input + same options → identical graph export fingerprints
//!
//! ## Example
//!
//! ```rust
//! use variant_graph_kernel::{align_corpus, AlignerOptions, SourceRecord};
//!
//! let sources = [
//!     SourceRecord::new("first", "the cat sat"),
//!     SourceRecord::new("second", "a cat sat"),
//! ];
//! let alignment = align_corpus(&sources, AlignerOptions::default()).unwrap();
//! assert!(alignment.graph().is_acyclic());
//! assert_eq!(alignment.paths().len(), 2);
//! ```
//!
//! The kernel is single-threaded, fully synchronous, and deterministic for
//! fixed input and options. Layout, interaction, and dictionary lookups are
//! external collaborators consuming the graph and the sentence paths.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aligner;
pub mod canonical;
pub mod distance;
pub mod graph;
pub mod ids;
pub mod matching;
pub mod options;
pub mod paths;
pub mod registry;
pub mod types;

// Re-exports
pub use aligner::{align_corpus, AlignError, Aligner, Alignment};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};
pub use distance::{levenshtein, normalized_distance};
pub use graph::{Graph, GraphError, GraphExport, MergeOutcome, VertexExport};
pub use ids::IdAllocator;
pub use matching::{best_alignment, pair_alignment, MatchPair};
pub use options::AlignerOptions;
pub use paths::{paths_by_edition, SentencePath};
pub use registry::VertexRegistry;
pub use types::{parse_directive, Directive, SourceOccurrence, SourceRecord, Token, Vertex, VertexId};

/// Schema version for exported graph bundles.
/// Increment on breaking changes to any exported type.
pub const SCHEMA_VERSION: &str = "1.0.0";
