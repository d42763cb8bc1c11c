//! # attrib
//!
//! Claimer attribution for claim frames: given documents with candidate
//! mentions and a question-answering scoring oracle, decide who asserted
//! each claim.
//!
//! - **Windowing**: token-budgeted multi-sentence context windows
//! - **Batching**: length-sorted, padding-efficient oracle calls with
//!   order restoration
//! - **Aggregation**: sub-token probabilities max-pooled onto tokens
//! - **Selection**: threshold, mean-score ranking, overlap pruning, and a
//!   document-level cap
//! - **Matching**: smallest enclosing claim event per selected candidate
//!
//! Core record types (`Document`, `Mention`, `ClaimFrame`, ...) live in
//! `attrib-core` and are re-exported here.
//!
//! The scoring oracle itself is an external collaborator behind the
//! [`Oracle`] trait; [`MockOracle`] stands in for tests and dry runs.

#![warn(missing_docs)]

pub mod aggregate;
pub mod batch;
pub mod config;
pub mod error;
pub mod matcher;
pub mod piece;
pub mod pipeline;
pub mod select;
pub mod window;

pub use config::AttribConfig;
pub use error::{Error, Result};
pub use piece::{QaInstance, TextPiece};
pub use pipeline::{ClaimerAttributor, PassCounts, RunSummary};

// Re-export attrib-core types for convenience
pub use attrib_core::{
    ClaimEvent, ClaimFrame, Document, DocumentIndex, Mention, Provenance, QuestionTemplates,
    Sentence, TokenSpan, TopicConfig,
};

use batch::PaddedBatch;
use std::collections::HashMap;

/// Special sub-token ids of the oracle's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    /// Sequence-start token id.
    pub cls: u32,
    /// Separator token id.
    pub sep: u32,
    /// Padding token id.
    pub pad: u32,
}

/// The scoring oracle: a labeling model plus its tokenizer.
///
/// Implementations must be deterministic for fixed weights and inputs.
/// The trait is `Send + Sync` so independent workers can process documents
/// in parallel, each holding its own handle or sharing one.
pub trait Oracle: Send + Sync {
    /// Sub-tokenize raw text into a [`TextPiece`].
    fn encode(&self, text: &str) -> Result<TextPiece>;

    /// Special token ids of the vocabulary.
    fn specials(&self) -> SpecialTokens;

    /// Maximum combined input length in sub-tokens.
    fn max_seq_length(&self) -> usize;

    /// Maximum question length in sub-tokens.
    fn max_query_length(&self) -> usize;

    /// Score one padded batch, returning for every instance one probability
    /// per input position (padded positions included).
    ///
    /// A failure here aborts the whole run; there is no retry inside the
    /// pipeline.
    fn score_batch(&self, batch: &PaddedBatch) -> Result<Vec<Vec<f32>>>;

    /// Get the oracle name/identifier.
    fn name(&self) -> &'static str {
        "unknown"
    }
}

/// A mock scoring oracle for tests and dry runs.
///
/// Sub-tokenization splits on whitespace and hashes each lowercased word to
/// a stable vocabulary id. Scores come from three sources, in order:
///
/// 1. per-instance scripted scores registered with
///    [`with_instance_scores`](MockOracle::with_instance_scores), keyed by
///    the unpadded input ids;
/// 2. a constant set via [`with_constant_score`](MockOracle::with_constant_score);
/// 3. otherwise a deterministic per-position value derived from the input
///    id, which gives every instance a distinct, reproducible score
///    profile.
///
/// # Example
///
/// ```rust
/// use attrib::{MockOracle, Oracle};
///
/// let oracle = MockOracle::new().with_constant_score(0.25);
/// let piece = oracle.encode("Reports said so").unwrap();
/// assert_eq!(piece.len(), 3);
/// ```
#[derive(Clone)]
pub struct MockOracle {
    scripted: HashMap<Vec<u32>, Vec<f32>>,
    constant: Option<f32>,
    max_seq_length: usize,
    max_query_length: usize,
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOracle {
    /// Create a mock oracle with BERT-like limits (512/64).
    #[must_use]
    pub fn new() -> Self {
        Self {
            scripted: HashMap::new(),
            constant: None,
            max_seq_length: 512,
            max_query_length: 64,
        }
    }

    /// Script the score vector returned for one instance, keyed by its
    /// unpadded input ids.
    ///
    /// # Panics
    ///
    /// Panics if any score is outside `[0.0, 1.0]`.
    #[must_use]
    pub fn with_instance_scores(mut self, input_ids: Vec<u32>, scores: Vec<f32>) -> Self {
        for (i, s) in scores.iter().enumerate() {
            assert!(
                (0.0..=1.0).contains(s),
                "MockOracle score {}: {} must be in [0.0, 1.0]",
                i,
                s
            );
        }
        self.scripted.insert(input_ids, scores);
        self
    }

    /// Return this constant for every unscripted position.
    #[must_use]
    pub fn with_constant_score(mut self, score: f32) -> Self {
        self.constant = Some(score);
        self
    }

    /// Override the maximum combined input length.
    #[must_use]
    pub fn with_max_seq_length(mut self, len: usize) -> Self {
        self.max_seq_length = len;
        self
    }

    /// Override the maximum question length.
    #[must_use]
    pub fn with_max_query_length(mut self, len: usize) -> Self {
        self.max_query_length = len;
        self
    }

    /// Stable vocabulary id for one lowercased word (FNV-1a, folded into
    /// the non-special id range).
    fn word_id(word: &str) -> u32 {
        let mut hash: u32 = 0x811c_9dc5;
        for byte in word.bytes() {
            hash ^= u32::from(byte);
            hash = hash.wrapping_mul(0x0100_0193);
        }
        1000 + hash % 29000
    }

    fn default_score(id: u32) -> f32 {
        (id % 97) as f32 / 96.0
    }
}

impl Oracle for MockOracle {
    fn encode(&self, text: &str) -> Result<TextPiece> {
        let mut subtokens = Vec::new();
        let mut subtoken_ids = Vec::new();
        for word in text.split_whitespace() {
            let word = word.to_lowercase();
            subtoken_ids.push(Self::word_id(&word));
            subtokens.push(word);
        }
        Ok(TextPiece::new(subtokens, subtoken_ids))
    }

    fn specials(&self) -> SpecialTokens {
        SpecialTokens {
            cls: 101,
            sep: 102,
            pad: 0,
        }
    }

    fn max_seq_length(&self) -> usize {
        self.max_seq_length
    }

    fn max_query_length(&self) -> usize {
        self.max_query_length
    }

    fn score_batch(&self, batch: &PaddedBatch) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(batch.len());
        for row in 0..batch.len() {
            let ids = &batch.input_ids[row];
            let real_len = batch.attention_mask[row]
                .iter()
                .filter(|&&m| m == 1)
                .count();
            let mut scores = if let Some(scripted) = self.scripted.get(&ids[..real_len]) {
                scripted.clone()
            } else if let Some(constant) = self.constant {
                vec![constant; real_len]
            } else {
                ids[..real_len]
                    .iter()
                    .map(|&id| Self::default_score(id))
                    .collect()
            };
            scores.resize(ids.len(), 0.0);
            out.push(scores);
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
