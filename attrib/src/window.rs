//! Token-budgeted context windows.
//!
//! The oracle input holds the question, the context, and 3 special tokens.
//! Whatever the question does not consume is the context budget; sentences
//! before the target are pulled in (newest first) while they fit.

use crate::piece::TextPiece;
use attrib_core::Sentence;

/// Positions reserved for `[CLS]` and the two separators.
const RESERVED_SPECIALS: usize = 3;

/// Sub-token budget left for the context once the question and special
/// tokens are accounted for.
#[must_use]
pub fn token_budget(max_seq_length: usize, max_query_length: usize, question_len: usize) -> usize {
    max_seq_length.saturating_sub(question_len.min(max_query_length) + RESERVED_SPECIALS)
}

/// Half-open sentence range `[start, target + 1)` of the context window.
///
/// The target sentence is always included, even when it alone exceeds the
/// budget (the oracle input is truncated later). Earlier sentences are
/// added, walking backward, while at most `lookback` of them are taken,
/// index 0 is not passed, and the remaining budget stays positive.
#[must_use]
pub fn window_range(
    sentences: &[Sentence],
    target: usize,
    lookback: usize,
    budget: usize,
) -> (usize, usize) {
    let mut remaining = budget as i64 - sentences[target].subtoken_len() as i64;
    let mut start = target;
    while start > 0 && target - start < lookback {
        let prev_len = sentences[start - 1].subtoken_len() as i64;
        if remaining - prev_len <= 0 {
            break;
        }
        start -= 1;
        remaining -= prev_len;
    }
    (start, target + 1)
}

/// Build the merged context piece for a target sentence.
#[must_use]
pub fn context_window(
    sentences: &[Sentence],
    target: usize,
    lookback: usize,
    budget: usize,
) -> TextPiece {
    let (start, end) = window_range(sentences, target, lookback, budget);
    let pieces: Vec<TextPiece> = sentences[start..end]
        .iter()
        .map(TextPiece::from_sentence)
        .collect();
    TextPiece::merge(&pieces, (start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(super) fn sentences(subtoken_lens: &[usize]) -> Vec<Sentence> {
        subtoken_lens
            .iter()
            .enumerate()
            .map(|(id, &len)| Sentence {
                id,
                tokens: vec!["w".into(); len],
                subtoken_ids: (0..len as u32).collect(),
                sub2tid: (0..len).collect(),
            })
            .collect()
    }

    fn window_len(sents: &[Sentence], range: (usize, usize)) -> usize {
        sents[range.0..range.1]
            .iter()
            .map(Sentence::subtoken_len)
            .sum()
    }

    #[test]
    fn budget_subtracts_question_and_specials() {
        assert_eq!(token_budget(512, 64, 10), 512 - 10 - 3);
        // Long questions only count up to the query limit.
        assert_eq!(token_budget(512, 64, 200), 512 - 64 - 3);
        assert_eq!(token_budget(4, 64, 10), 0);
    }

    #[test]
    fn window_grows_while_budget_lasts() {
        let sents = sentences(&[4, 5, 9, 4]);
        // Budget 19: target (4) + sentence 2 (9) + sentence 1 (5) = 18 fits;
        // sentence 0 (4) would leave the budget non-positive.
        let range = window_range(&sents, 3, 5, 19);
        assert_eq!(range, (1, 4));
        assert!(window_len(&sents, range) <= 19);
    }

    #[test]
    fn lookback_caps_the_window() {
        let sents = sentences(&[1, 1, 1, 1, 1]);
        assert_eq!(window_range(&sents, 4, 2, 1000), (2, 5));
        assert_eq!(window_range(&sents, 4, 0, 1000), (4, 5));
    }

    #[test]
    fn window_stops_at_document_start() {
        let sents = sentences(&[1, 1]);
        assert_eq!(window_range(&sents, 1, 9, 1000), (0, 2));
    }

    #[test]
    fn oversized_target_is_still_included() {
        let sents = sentences(&[3, 50]);
        assert_eq!(window_range(&sents, 1, 5, 10), (1, 2));
    }

    #[test]
    fn sentence_consuming_entire_remainder_is_excluded() {
        let sents = sentences(&[6, 4]);
        // Remaining after the target is exactly 6; adding sentence 0 would
        // drive the budget to zero, so it stays out.
        assert_eq!(window_range(&sents, 1, 5, 10), (1, 2));
    }

    #[test]
    fn merged_piece_carries_the_range() {
        let sents = sentences(&[2, 3, 4]);
        let piece = context_window(&sents, 2, 5, 100);
        assert_eq!(piece.sent_range, Some((0, 3)));
        assert_eq!(piece.len(), 9);
    }
}
