//! Sub-token probabilities to per-token scores.
//!
//! The oracle scores every position of the combined input. This module maps
//! the context portion back onto the window's sentences: each token takes
//! the maximum over the probabilities of the sub-tokens it owns.
//!
//! The cursor advances over the *untruncated* sub-token layout even when
//! the probability array is shorter (truncated input): out-of-bounds
//! positions contribute nothing but still move the cursor, so later
//! sentences stay aligned with the schema.

use attrib_core::Sentence;
use std::collections::HashMap;

/// Aggregate a flat probability array into per-sentence token scores.
///
/// `sent_range` is the half-open window the context was merged from,
/// `context_offset` the position where the context begins in the combined
/// input. Returns one score vector per sentence id in the range.
///
/// After the walk, a cursor still inside `input_ids` must sit on the
/// trailing separator; anything else means the sub-token bookkeeping
/// disagrees with the oracle input and is logged as a warning. Scores are
/// kept best-effort either way.
#[must_use]
pub fn token_scores(
    sentences: &[Sentence],
    sent_range: (usize, usize),
    context_offset: usize,
    input_ids: &[u32],
    sep: u32,
    probs: &[f32],
) -> HashMap<usize, Vec<f32>> {
    let (s0, s1) = sent_range;
    let mut cursor = context_offset;
    let mut scores = HashMap::new();
    for sent in &sentences[s0..s1] {
        let mut token_probs = vec![0.0f32; sent.tokens.len()];
        for &tid in &sent.sub2tid {
            if cursor < probs.len() {
                token_probs[tid] = token_probs[tid].max(probs[cursor]);
            }
            cursor += 1;
        }
        scores.insert(sent.id, token_probs);
    }
    if cursor < input_ids.len() && input_ids[cursor] != sep {
        log::warn!(
            "sub-token cursor landed on id {} at position {} instead of the separator; \
             scores for sentences [{}, {}) are best-effort",
            input_ids[cursor],
            cursor,
            s0,
            s1
        );
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sentence whose tokens own the given numbers of sub-tokens.
    fn sentence(id: usize, subs_per_token: &[usize]) -> Sentence {
        let mut sub2tid = Vec::new();
        for (tid, &n) in subs_per_token.iter().enumerate() {
            sub2tid.extend(std::iter::repeat(tid).take(n));
        }
        Sentence {
            id,
            tokens: vec!["w".into(); subs_per_token.len()],
            subtoken_ids: vec![5; sub2tid.len()],
            sub2tid,
        }
    }

    #[test]
    fn max_pools_subtokens_onto_tokens() {
        let sents = vec![sentence(0, &[3])];
        let probs = [0.2, 0.9, 0.4];
        let input_ids = [101, 102, 5, 5, 5, 102];
        let scores = token_scores(&sents, (0, 1), 2, &input_ids, 102, &probs_at(2, &probs));
        assert_eq!(scores[&0], vec![0.9]);
    }

    #[test]
    fn spans_multiple_sentences() {
        let sents = vec![sentence(0, &[1, 2]), sentence(1, &[1])];
        // Context: s0 (3 sub-tokens) then s1 (1 sub-token), offset 2.
        let probs = [0.0, 0.0, 0.1, 0.8, 0.3, 0.6, 0.0];
        let input_ids = [101, 102, 5, 5, 5, 5, 102];
        let scores = token_scores(&sents, (0, 2), 2, &input_ids, 102, &probs);
        assert_eq!(scores[&0], vec![0.1, 0.8]);
        assert_eq!(scores[&1], vec![0.6]);
    }

    #[test]
    fn truncated_probabilities_leave_tail_at_zero() {
        let sents = vec![sentence(0, &[1, 1, 1])];
        // Only the first context position survived truncation.
        let probs = [0.0, 0.0, 0.7];
        let input_ids = [101, 102, 5];
        let scores = token_scores(&sents, (0, 1), 2, &input_ids, 102, &probs);
        assert_eq!(scores[&0], vec![0.7, 0.0, 0.0]);
    }

    fn probs_at(offset: usize, context_probs: &[f32]) -> Vec<f32> {
        let mut probs = vec![0.0; offset];
        probs.extend_from_slice(context_probs);
        probs.push(0.0);
        probs
    }
}
