//! Input source records.

use serde::{Deserialize, Serialize};

/// One textual variant handed to the aligner: an edition label and the raw
/// sentence text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Caller-chosen label for this variant (edition, witness, translation).
    pub edition: String,
    /// Raw sentence text, possibly containing markup and alignment
    /// directives.
    pub text: String,
}

impl SourceRecord {
    /// Create a new source record.
    pub fn new(edition: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            edition: edition.into(),
            text: text.into(),
        }
    }
}
