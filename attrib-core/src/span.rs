//! Span types used across the attribution pipeline.
//!
//! Two coordinate systems are in play:
//!
//! - [`TokenSpan`]: (offset, length) in *token* positions, local to one
//!   sentence. This is how mentions address the tokens they cover, and how
//!   aggregated token scores are sliced.
//! - [`Provenance`]: (start, length) in an *absolute* document coordinate
//!   space shared by mentions and claim events, plus the governing scope.
//!   Overlap and containment tests between spans only make sense in this
//!   space.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A token span local to one sentence: offset + length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenSpan {
    /// Token offset within the sentence (inclusive).
    pub offset: usize,
    /// Number of tokens covered.
    pub length: usize,
}

impl TokenSpan {
    /// Create a token span.
    #[must_use]
    pub const fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Half-open token range covered by this span.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }

    /// One past the last covered token.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Where a span-bearing item came from: its absolute span and governing scope.
///
/// `start`/`length` are expressed in one document-wide coordinate space for
/// all items, so a mention and a claim event can be compared directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Governing scope identifier (the sentence or broader unit this item
    /// belongs to). Claim-event lookup is keyed on this string.
    pub scope: String,
    /// Absolute span start (inclusive).
    pub start: usize,
    /// Absolute span length.
    pub length: usize,
    /// Surface text of the span.
    #[serde(default)]
    pub text: String,
}

impl Provenance {
    /// One past the last covered position.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.length
    }

    /// Half-open interval intersection test.
    #[must_use]
    pub const fn overlaps(&self, other: &Provenance) -> bool {
        (other.start >= self.start && other.start < self.end())
            || (self.start >= other.start && self.start < other.end())
    }

    /// Inclusive containment: does `self` fully contain `other`?
    #[must_use]
    pub const fn contains(&self, other: &Provenance) -> bool {
        other.start >= self.start && other.end() <= self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prov(start: usize, length: usize) -> Provenance {
        Provenance {
            scope: "s".into(),
            start,
            length,
            text: String::new(),
        }
    }

    #[test]
    fn token_span_range() {
        let span = TokenSpan::new(3, 2);
        assert_eq!(span.range(), 3..5);
        assert_eq!(span.end(), 5);
    }

    #[test]
    fn overlap_is_half_open() {
        // [0, 5) and [5, 8) touch but do not overlap.
        assert!(!prov(0, 5).overlaps(&prov(5, 3)));
        assert!(prov(0, 5).overlaps(&prov(4, 3)));
        assert!(prov(4, 3).overlaps(&prov(0, 5)));
        // Nested spans overlap.
        assert!(prov(0, 10).overlaps(&prov(2, 3)));
    }

    #[test]
    fn containment_is_inclusive() {
        assert!(prov(0, 10).contains(&prov(0, 10)));
        assert!(prov(0, 10).contains(&prov(3, 4)));
        assert!(!prov(0, 10).contains(&prov(8, 4)));
        assert!(!prov(3, 4).contains(&prov(0, 10)));
    }
}
