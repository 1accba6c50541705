//! Order-preserving pairwise token matching.
//!
//! For two tokenized sentences the search produces candidate alignments: a
//! sequence of matched pairs whose positions are strictly increasing in both
//! sentences. Tokens of the first sentence are processed left to right; every
//! compatible in-progress candidate is extended, fresh single-pair candidates
//! are started, and candidates ending at the same second-sentence token are
//! pruned down to the longest. On equal length the earliest-discovered
//! candidate wins; every tie-break here is deterministic by construction.

use crate::distance::normalized_distance;
use crate::options::AlignerOptions;
use crate::types::Token;

/// A matched token pair, by position into the two sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPair {
    /// Token position in the first sentence.
    pub a: usize,
    /// Token position in the second sentence.
    pub b: usize,
}

/// Whether two tokens are judged equal for alignment purposes.
///
/// Directive tokens match exactly when their preference ids are equal and
/// never fuzzy-match anything else. Plain tokens match on key equality, or
/// within the configured normalized edit distance.
pub(crate) fn tokens_match(options: &AlignerOptions, t1: &Token, t2: &Token) -> bool {
    if t1.preference.is_some() || t2.preference.is_some() {
        return t1.preference == t2.preference;
    }
    if t1.key == t2.key {
        return true;
    }
    match options.edit_distance {
        Some(threshold) => normalized_distance(&t1.key, &t2.key) <= threshold,
        None => false,
    }
}

/// Compute all maximal order-preserving candidate alignments between two
/// tokenized sentences.
///
/// The caller selects the largest path, earliest-discovered among ties; see
/// [`best_alignment`].
pub fn pair_alignment(
    options: &AlignerOptions,
    s1: &[Token],
    s2: &[Token],
) -> Vec<Vec<MatchPair>> {
    let match_positions: Vec<Vec<usize>> = s1
        .iter()
        .map(|t1| {
            s2.iter()
                .enumerate()
                .filter(|&(_, t2)| tokens_match(options, t1, t2))
                .map(|(j, _)| j)
                .collect()
        })
        .collect();

    let mut paths: Vec<Vec<MatchPair>> = Vec::new();
    for (i, positions) in match_positions.iter().enumerate() {
        let mut next: Vec<Vec<MatchPair>> = Vec::new();

        for path in &paths {
            admit(&mut next, path.clone());
            let last_b = path[path.len() - 1].b;
            for &j in positions {
                if j > last_b {
                    let mut extended = path.clone();
                    extended.push(MatchPair { a: i, b: j });
                    admit(&mut next, extended);
                }
            }
        }
        for &j in positions {
            admit(&mut next, vec![MatchPair { a: i, b: j }]);
        }

        paths = next;
        tracing::trace!(token = i, candidates = paths.len(), "alignment frontier");
    }
    paths
}

/// The largest candidate alignment, earliest-discovered among ties.
pub fn best_alignment(
    options: &AlignerOptions,
    s1: &[Token],
    s2: &[Token],
) -> Vec<MatchPair> {
    let mut best: Vec<MatchPair> = Vec::new();
    for path in pair_alignment(options, s1, s2) {
        if path.len() > best.len() {
            best = path;
        }
    }
    best
}

/// Admit a candidate, pruning against candidates with the same final
/// second-sentence position: the longest survives, ties keep the incumbent.
fn admit(candidates: &mut Vec<Vec<MatchPair>>, path: Vec<MatchPair>) {
    let end = path[path.len() - 1].b;
    match candidates
        .iter()
        .position(|c| c[c.len() - 1].b == end)
    {
        Some(i) if candidates[i].len() < path.len() => candidates[i] = path,
        Some(_) => {}
        None => candidates.push(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(sentence: usize, words: &[&str]) -> Vec<Token> {
        words
            .iter()
            .enumerate()
            .map(|(j, w)| Token::from_raw(sentence, j, j, w))
            .collect()
    }

    #[test]
    fn aligns_common_subsequence() {
        let opts = AlignerOptions::default();
        let s1 = toks(0, &["the", "cat", "sat"]);
        let s2 = toks(1, &["a", "cat", "sat"]);
        let best = best_alignment(&opts, &s1, &s2);
        assert_eq!(
            best,
            vec![MatchPair { a: 1, b: 1 }, MatchPair { a: 2, b: 2 }]
        );
    }

    #[test]
    fn crossing_matches_never_share_a_path() {
        let opts = AlignerOptions::default();
        let s1 = toks(0, &["a", "b"]);
        let s2 = toks(1, &["b", "a"]);
        for path in pair_alignment(&opts, &s1, &s2) {
            assert_eq!(path.len(), 1);
        }
    }

    #[test]
    fn repeated_word_keeps_positions_monotonic() {
        let opts = AlignerOptions::default();
        let s1 = toks(0, &["so", "so", "it", "goes"]);
        let s2 = toks(1, &["so", "it", "goes"]);
        let best = best_alignment(&opts, &s1, &s2);
        assert_eq!(best.len(), 3);
        for window in best.windows(2) {
            assert!(window[0].a < window[1].a);
            assert!(window[0].b < window[1].b);
        }
    }

    #[test]
    fn fuzzy_threshold_admits_close_tokens() {
        let s1 = toks(0, &["heaven"]);
        let s2 = toks(1, &["heavens"]);
        assert!(best_alignment(&AlignerOptions::default(), &s1, &s2).is_empty());
        // 2·1/13 ≈ 0.154
        let fuzzy = AlignerOptions::fuzzy(0.2);
        assert_eq!(best_alignment(&fuzzy, &s1, &s2).len(), 1);
    }

    #[test]
    fn directive_tokens_match_only_on_equal_ids() {
        let fuzzy = AlignerOptions::fuzzy(0.9);
        let s1 = toks(0, &["<7>heaven<7>"]);
        let same = toks(1, &["<7>heavens<7>"]);
        let other = toks(1, &["<8>heaven<8>"]);
        let plain = toks(1, &["heaven"]);
        assert_eq!(best_alignment(&fuzzy, &s1, &same).len(), 1);
        assert!(best_alignment(&fuzzy, &s1, &other).is_empty());
        assert!(best_alignment(&fuzzy, &s1, &plain).is_empty());
    }

    #[test]
    fn empty_sentences_align_to_nothing() {
        let opts = AlignerOptions::default();
        assert!(pair_alignment(&opts, &[], &toks(1, &["a"])).is_empty());
        assert!(pair_alignment(&opts, &toks(0, &["a"]), &[]).is_empty());
    }
}
