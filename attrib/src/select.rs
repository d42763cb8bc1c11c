//! Candidate extraction, ranking, overlap pruning, and the document cap.
//!
//! Ranking is by mean token score only. Preferring one mention category
//! over another was tried and rejected; the sort is stable, so candidates
//! with equal means keep their extraction order.

use attrib_core::Mention;
use std::cmp::Ordering;

/// A mention enriched with the token scores covering its span.
///
/// This enrichment lives only for one document pass; mention records are
/// never mutated.
#[derive(Debug, Clone)]
pub struct ScoredMention<'a> {
    /// The underlying candidate.
    pub mention: &'a Mention,
    /// One probability per covered token.
    pub scores: Vec<f32>,
    mean: f64,
}

impl<'a> ScoredMention<'a> {
    /// Attach a score slice to a mention.
    #[must_use]
    pub fn new(mention: &'a Mention, scores: Vec<f32>) -> Self {
        let mean = if scores.is_empty() {
            0.0
        } else {
            scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64
        };
        Self {
            mention,
            scores,
            mean,
        }
    }

    /// Arithmetic mean of the attached scores.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.mean
    }
}

/// Candidates of one sentence whose span holds at least one token scoring
/// above the threshold, each with its covering score slice attached.
///
/// `token_probs` is the sentence's aggregated token score array; mentions
/// whose span reaches past it (scores missing after truncation) are judged
/// on the tokens that are there.
#[must_use]
pub fn threshold_candidates<'a>(
    mentions: &[&'a Mention],
    token_probs: &[f32],
    threshold: f32,
) -> Vec<ScoredMention<'a>> {
    let mut selected = Vec::new();
    for &mention in mentions {
        let span = mention.tok_span.range();
        let end = span.end.min(token_probs.len());
        if span.start >= end {
            continue;
        }
        let covered = &token_probs[span.start..end];
        if covered.iter().any(|&p| p > threshold) {
            selected.push(ScoredMention::new(mention, covered.to_vec()));
        }
    }
    selected
}

/// Stable sort by mean score, best first.
pub fn rank_by_mean(candidates: &mut [ScoredMention<'_>]) {
    candidates.sort_by(|a, b| b.mean().partial_cmp(&a.mean()).unwrap_or(Ordering::Equal));
}

/// Greedy overlap pruning over a ranked list.
///
/// Walks best-first and keeps a candidate only when its absolute span does
/// not intersect (half-open) any span kept so far.
#[must_use]
pub fn prune_overlaps<'a>(ranked: Vec<ScoredMention<'a>>) -> Vec<ScoredMention<'a>> {
    let mut kept: Vec<ScoredMention<'a>> = Vec::new();
    for candidate in ranked {
        let overlaps = kept
            .iter()
            .any(|k| k.mention.provenance.overlaps(&candidate.mention.provenance));
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}

/// Document-level cap: re-rank the merged survivors and keep the first
/// `ceil(ratio * sentence_count)`.
#[must_use]
pub fn select_top<'a>(
    mut survivors: Vec<ScoredMention<'a>>,
    ratio: f64,
    sentence_count: usize,
) -> Vec<ScoredMention<'a>> {
    rank_by_mean(&mut survivors);
    let cap = (ratio * sentence_count as f64).ceil() as usize;
    survivors.truncate(cap);
    survivors
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrib_core::{Provenance, TokenSpan};

    fn mention(id: &str, tok_offset: usize, tok_len: usize, start: usize, length: usize) -> Mention {
        Mention {
            id: id.into(),
            sentence: 0,
            tok_span: TokenSpan::new(tok_offset, tok_len),
            provenance: Provenance {
                scope: "s0".into(),
                start,
                length,
                text: id.into(),
            },
        }
    }

    #[test]
    fn threshold_needs_one_qualifying_token() {
        let m1 = mention("m1", 0, 2, 0, 10);
        let m2 = mention("m2", 2, 2, 10, 10);
        let probs = [0.9, 0.1, 0.4, 0.4];
        let selected = threshold_candidates(&[&m1, &m2], &probs, 0.5);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].mention.id, "m1");
        assert_eq!(selected[0].scores, vec![0.9, 0.1]);
    }

    #[test]
    fn mean_is_over_the_covered_slice() {
        let m = mention("m", 1, 2, 0, 5);
        let selected = threshold_candidates(&[&m], &[0.0, 0.6, 0.8], 0.5);
        assert!((selected[0].mean() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn ranking_is_stable_on_ties() {
        let m1 = mention("first", 0, 1, 0, 3);
        let m2 = mention("second", 1, 1, 3, 3);
        let m3 = mention("best", 2, 1, 6, 3);
        let mut cands = vec![
            ScoredMention::new(&m1, vec![0.6]),
            ScoredMention::new(&m2, vec![0.6]),
            ScoredMention::new(&m3, vec![0.9]),
        ];
        rank_by_mean(&mut cands);
        let ids: Vec<&str> = cands.iter().map(|c| c.mention.id.as_str()).collect();
        assert_eq!(ids, vec!["best", "first", "second"]);
    }

    #[test]
    fn pruning_drops_overlapping_lower_ranked() {
        let strong = mention("strong", 0, 2, 0, 12);
        let weak = mention("weak", 1, 1, 6, 10);
        let apart = mention("apart", 3, 1, 20, 4);
        let mut ranked = vec![
            ScoredMention::new(&strong, vec![0.8]),
            ScoredMention::new(&weak, vec![0.6]),
            ScoredMention::new(&apart, vec![0.55]),
        ];
        rank_by_mean(&mut ranked);
        let kept = prune_overlaps(ranked);
        let ids: Vec<&str> = kept.iter().map(|c| c.mention.id.as_str()).collect();
        assert_eq!(ids, vec!["strong", "apart"]);
        for i in 0..kept.len() {
            for j in i + 1..kept.len() {
                assert!(!kept[i].mention.provenance.overlaps(&kept[j].mention.provenance));
            }
        }
    }

    #[test]
    fn cap_is_ceil_of_ratio_times_sentences() {
        let mentions: Vec<Mention> = (0..6)
            .map(|i| mention(&format!("m{}", i), i, 1, i * 10, 5))
            .collect();
        let survivors: Vec<ScoredMention<'_>> = mentions
            .iter()
            .map(|m| ScoredMention::new(m, vec![0.5 + 0.01 * m.tok_span.offset as f32]))
            .collect();
        // ceil(0.5 * 5) = 3.
        let selected = select_top(survivors, 0.5, 5);
        assert_eq!(selected.len(), 3);
        // Highest means first.
        assert_eq!(selected[0].mention.id, "m5");
    }
}
