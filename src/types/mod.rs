//! Core value types of the variant graph kernel.

pub mod source;
pub mod token;
pub mod vertex;

pub use source::SourceRecord;
pub use token::{parse_directive, Directive, Token};
pub use vertex::{SourceOccurrence, Vertex, VertexId};
