//! Sub-token text pieces and the combined QA input they form.
//!
//! A [`TextPiece`] is an ordered run of sub-tokens with stable positions:
//! position `i` of a merged piece always refers to the `i`-th sub-token of
//! the concatenation, so cursors computed against the untruncated layout
//! stay meaningful even when the oracle input was cut short.
//!
//! A [`QaInstance`] packs one context piece and one question piece into the
//! oracle's `[CLS] question [SEP] context [SEP]` layout and remembers where
//! the context begins.

use crate::SpecialTokens;
use attrib_core::Sentence;

/// An ordered sequence of sub-tokens derived from text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPiece {
    /// Display forms of the sub-tokens. Empty when the piece was built from
    /// a pre-tokenized sentence, which stores only ids.
    pub subtokens: Vec<String>,
    /// Sub-token ids in the oracle's vocabulary.
    pub subtoken_ids: Vec<u32>,
    /// Half-open sentence-index range this piece was merged from, if any.
    pub sent_range: Option<(usize, usize)>,
}

impl TextPiece {
    /// Create a piece from parallel sub-token forms and ids.
    #[must_use]
    pub fn new(subtokens: Vec<String>, subtoken_ids: Vec<u32>) -> Self {
        Self {
            subtokens,
            subtoken_ids,
            sent_range: None,
        }
    }

    /// View a sentence's sub-token layer as a piece tagged with its own
    /// one-sentence range.
    #[must_use]
    pub fn from_sentence(sentence: &Sentence) -> Self {
        Self {
            subtokens: Vec::new(),
            subtoken_ids: sentence.subtoken_ids.clone(),
            sent_range: Some((sentence.id, sentence.id + 1)),
        }
    }

    /// Concatenate pieces into one, tagged with the given sentence range.
    #[must_use]
    pub fn merge(pieces: &[TextPiece], sent_range: (usize, usize)) -> Self {
        let mut subtokens = Vec::new();
        let mut subtoken_ids = Vec::new();
        for piece in pieces {
            subtokens.extend(piece.subtokens.iter().cloned());
            subtoken_ids.extend(piece.subtoken_ids.iter().copied());
        }
        Self {
            subtokens,
            subtoken_ids,
            sent_range: Some(sent_range),
        }
    }

    /// Number of sub-tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subtoken_ids.len()
    }

    /// Check if the piece has no sub-tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subtoken_ids.is_empty()
    }
}

/// One scoring unit: a context piece paired with a question piece.
#[derive(Debug, Clone)]
pub struct QaInstance {
    /// The context window.
    pub context: TextPiece,
    /// The question.
    pub question: TextPiece,
    /// Combined `[CLS] question [SEP] context [SEP]` sub-token ids,
    /// truncated to the oracle's maximum input length.
    pub input_ids: Vec<u32>,
    /// Position in `input_ids` where the context begins.
    pub context_offset: usize,
}

impl QaInstance {
    /// Build the combined input for one (context, question) pair.
    ///
    /// The question is cut to `max_query_length` sub-tokens; the combined
    /// sequence is cut to `max_seq_length`. Truncation can eat into the
    /// context or even the trailing separator; consumers must bound reads
    /// by `input_ids.len()`.
    #[must_use]
    pub fn new(
        context: TextPiece,
        question: TextPiece,
        specials: SpecialTokens,
        max_seq_length: usize,
        max_query_length: usize,
    ) -> Self {
        let question_len = question.len().min(max_query_length);
        let mut input_ids = Vec::with_capacity(question_len + context.len() + 3);
        input_ids.push(specials.cls);
        input_ids.extend(question.subtoken_ids.iter().take(question_len).copied());
        input_ids.push(specials.sep);
        let context_offset = input_ids.len();
        input_ids.extend(context.subtoken_ids.iter().copied());
        input_ids.push(specials.sep);
        input_ids.truncate(max_seq_length);
        Self {
            context,
            question,
            input_ids,
            context_offset,
        }
    }

    /// Combined sequence length after truncation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    /// Check if the combined sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}
