//! Ephemeral token types produced during tokenization.
//!
//! A token may carry an inline alignment directive of the form
//! `<ID>word<…`: ID forces all tokens sharing it to be judged equal by
//! matching, and `word` becomes the display text. The directive parser is an
//! explicit state machine; anything malformed falls back to literal-token
//! treatment and never aborts tokenization.

use serde::{Deserialize, Serialize};

/// A parsed alignment directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// The alignment-preference id.
    pub id: String,
    /// The display word enclosed by the directive.
    pub word: String,
}

/// One tokenized word of one input sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Index of the owning sentence in input order.
    pub sentence: usize,
    /// Position within the sentence.
    pub position: usize,
    /// Globally increasing sequence number across all sentences.
    pub seq: usize,
    /// Matching key: the literal token, or a synthetic per-directive-id
    /// string so that same-id tokens always compare equal.
    pub key: String,
    /// Display text: the literal token, or the directive word.
    pub text: String,
    /// Alignment-preference id, when the token carried a directive.
    pub preference: Option<String>,
}

impl Token {
    /// Build a token from a raw (already normalized) word.
    pub fn from_raw(sentence: usize, position: usize, seq: usize, raw: &str) -> Self {
        match parse_directive(raw) {
            Some(directive) => Self {
                sentence,
                position,
                seq,
                key: synthetic_key(&directive.id),
                text: directive.word,
                preference: Some(directive.id),
            },
            None => Self {
                sentence,
                position,
                seq,
                key: raw.to_string(),
                text: raw.to_string(),
                preference: None,
            },
        }
    }
}

/// Matching key shared by every token carrying `id`.
fn synthetic_key(id: &str) -> String {
    format!("<{id}><>")
}

/// Parse an alignment directive from a raw token.
///
/// Grammar: `<` ID `>` WORD `<` REST, where ID and WORD are non-empty and
/// contain no angle brackets. Any `<` closes the directive; REST is
/// accepted and discarded. Returns `None` for anything else.
pub fn parse_directive(raw: &str) -> Option<Directive> {
    enum State {
        Open,
        Id,
        Word,
    }

    let mut state = State::Open;
    let mut id = String::new();
    let mut word = String::new();

    for ch in raw.chars() {
        match state {
            State::Open => {
                if ch != '<' {
                    return None;
                }
                state = State::Id;
            }
            State::Id => match ch {
                '>' if id.is_empty() => return None,
                '>' => state = State::Word,
                '<' => return None,
                _ => id.push(ch),
            },
            State::Word => match ch {
                // Closing marker reached; the rest of the token is ignored.
                '<' if word.is_empty() => return None,
                '<' => return Some(Directive { id, word }),
                '>' => return None,
                _ => word.push(ch),
            },
        }
    }

    // Ran out of input before the closing marker.
    None
}
