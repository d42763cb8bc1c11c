//! The document record: sentences, candidate mentions, claim events, and
//! claim frames.
//!
//! A document is loaded once from JSON, mutated in place by the attribution
//! pass (only the claim frames' output fields change), then serialized back.
//! Everything else is immutable after load.
//!
//! Lookup structures (mentions by sentence, claim events by scope, mention
//! by id) are *not* part of the serialized record; they are rebuilt on load
//! and kept in a side index so repeated passes never leak state into the
//! stored form.

use crate::error::{Error, Result};
use crate::span::{Provenance, TokenSpan};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// One sentence: tokens plus the sub-token layer the oracle scores over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    /// Document-local sentence id.
    pub id: usize,
    /// Word-like tokens.
    pub tokens: Vec<String>,
    /// Sub-token ids produced by the oracle's tokenizer.
    pub subtoken_ids: Vec<u32>,
    /// For each sub-token position, the index of the token that owns it.
    /// A token's positions are contiguous; the mapping is non-decreasing.
    pub sub2tid: Vec<usize>,
}

impl Sentence {
    /// Number of sub-tokens in this sentence.
    #[must_use]
    pub fn subtoken_len(&self) -> usize {
        self.subtoken_ids.len()
    }
}

/// A candidate claimer: an entity or event mention anchored in one sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    /// Stable mention id, referenced by claim frames.
    pub id: String,
    /// Index of the sentence this mention belongs to.
    pub sentence: usize,
    /// Token span local to that sentence.
    pub tok_span: TokenSpan,
    /// Absolute span and governing scope.
    pub provenance: Provenance,
}

/// A claiming act: a span used only to scope candidate search by containment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimEvent {
    /// Stable event id.
    pub id: String,
    /// Absolute span and governing scope.
    pub provenance: Provenance,
}

/// An extracted assertion whose claimer the pipeline attributes.
///
/// The three `claimer*` fields start as `None` and are written at most once
/// per pass; when several selected candidates remain, the last write wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimFrame {
    /// Stable frame id.
    pub id: String,
    /// Subtopic id selecting the question templates.
    pub subtopic: String,
    /// Id of the trigger mention ("x").
    pub x: String,
    /// Surface text of the trigger, substituted into the template.
    pub x_text: String,
    /// Selects the negated question template.
    #[serde(default)]
    pub negated: bool,
    /// Id of the attributed claimer mention.
    #[serde(default)]
    pub claimer: Option<String>,
    /// Mean token score of the attributed claimer.
    #[serde(default)]
    pub claimer_score: Option<f64>,
    /// Surface text of the attributed claimer.
    #[serde(default)]
    pub claimer_text: Option<String>,
}

impl ClaimFrame {
    /// Reset the output fields to their unattributed state.
    pub fn clear_claimer(&mut self) {
        self.claimer = None;
        self.claimer_score = None;
        self.claimer_text = None;
    }
}

/// A full document record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document id; also names the output file.
    pub doc_id: String,
    /// Sentences in order.
    pub sentences: Vec<Sentence>,
    /// Candidate mentions across all sentences.
    pub mentions: Vec<Mention>,
    /// Claim events across all scopes.
    pub claim_events: Vec<ClaimEvent>,
    /// Claim frames to attribute.
    pub claim_frames: Vec<ClaimFrame>,
}

impl Document {
    /// Read a document from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Document> {
        let file = File::open(path.as_ref())?;
        let doc: Document = serde_json::from_reader(BufReader::new(file))?;
        doc.validate()?;
        Ok(doc)
    }

    /// Write the document (with any attributed claimers) to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Check structural invariants that the pipeline relies on.
    ///
    /// - sentence ids match their position,
    /// - `sub2tid` has one entry per sub-token, each naming a real token,
    /// - mention sentences exist and token spans stay inside them.
    pub fn validate(&self) -> Result<()> {
        for (idx, sent) in self.sentences.iter().enumerate() {
            if sent.id != idx {
                return Err(Error::invalid_document(format!(
                    "sentence at position {} has id {}",
                    idx, sent.id
                )));
            }
            if sent.sub2tid.len() != sent.subtoken_ids.len() {
                return Err(Error::invalid_document(format!(
                    "sentence {}: {} sub-tokens but {} sub2tid entries",
                    sent.id,
                    sent.subtoken_ids.len(),
                    sent.sub2tid.len()
                )));
            }
            if let Some(&tid) = sent.sub2tid.iter().find(|&&tid| tid >= sent.tokens.len()) {
                return Err(Error::invalid_document(format!(
                    "sentence {}: sub2tid references token {} of {}",
                    sent.id,
                    tid,
                    sent.tokens.len()
                )));
            }
        }
        for mention in &self.mentions {
            let sent = self.sentences.get(mention.sentence).ok_or_else(|| {
                Error::invalid_document(format!(
                    "mention {} references missing sentence {}",
                    mention.id, mention.sentence
                ))
            })?;
            if mention.tok_span.end() > sent.tokens.len() {
                return Err(Error::invalid_document(format!(
                    "mention {} spans tokens {:?} but sentence {} has {}",
                    mention.id,
                    mention.tok_span.range(),
                    sent.id,
                    sent.tokens.len()
                )));
            }
        }
        Ok(())
    }

    /// Build the per-pass lookup index.
    #[must_use]
    pub fn index(&self) -> DocumentIndex<'_> {
        DocumentIndex::new(self)
    }
}

/// Side index over an immutable document, rebuilt per pass.
#[derive(Debug)]
pub struct DocumentIndex<'a> {
    mentions_by_sentence: HashMap<usize, Vec<&'a Mention>>,
    events_by_scope: HashMap<&'a str, Vec<&'a ClaimEvent>>,
    mention_by_id: HashMap<&'a str, &'a Mention>,
}

impl<'a> DocumentIndex<'a> {
    fn new(doc: &'a Document) -> Self {
        let mut mentions_by_sentence: HashMap<usize, Vec<&'a Mention>> = HashMap::new();
        let mut mention_by_id: HashMap<&'a str, &'a Mention> = HashMap::new();
        for mention in &doc.mentions {
            mentions_by_sentence
                .entry(mention.sentence)
                .or_default()
                .push(mention);
            mention_by_id.insert(mention.id.as_str(), mention);
        }
        let mut events_by_scope: HashMap<&'a str, Vec<&'a ClaimEvent>> = HashMap::new();
        for event in &doc.claim_events {
            events_by_scope
                .entry(event.provenance.scope.as_str())
                .or_default()
                .push(event);
        }
        Self {
            mentions_by_sentence,
            events_by_scope,
            mention_by_id,
        }
    }

    /// Candidate mentions of one sentence, in extraction order.
    #[must_use]
    pub fn mentions_in_sentence(&self, sentence: usize) -> &[&'a Mention] {
        self.mentions_by_sentence
            .get(&sentence)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Claim events sharing a governing scope, in document order.
    #[must_use]
    pub fn events_in_scope(&self, scope: &str) -> &[&'a ClaimEvent] {
        self.events_by_scope
            .get(scope)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up a mention by id.
    #[must_use]
    pub fn mention(&self, id: &str) -> Option<&'a Mention> {
        self.mention_by_id.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(id: usize, tokens: &[&str], subs_per_token: usize) -> Sentence {
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        let mut subtoken_ids = Vec::new();
        let mut sub2tid = Vec::new();
        for (tid, _) in tokens.iter().enumerate() {
            for s in 0..subs_per_token {
                subtoken_ids.push((100 + tid * subs_per_token + s) as u32);
                sub2tid.push(tid);
            }
        }
        Sentence {
            id,
            tokens,
            subtoken_ids,
            sub2tid,
        }
    }

    fn tiny_doc() -> Document {
        Document {
            doc_id: "d1".into(),
            sentences: vec![
                sentence(0, &["Reports", "said", "so"], 1),
                sentence(1, &["He", "denied", "it"], 2),
            ],
            mentions: vec![Mention {
                id: "m1".into(),
                sentence: 0,
                tok_span: TokenSpan::new(0, 1),
                provenance: Provenance {
                    scope: "d1-s0".into(),
                    start: 0,
                    length: 7,
                    text: "Reports".into(),
                },
            }],
            claim_events: vec![ClaimEvent {
                id: "e1".into(),
                provenance: Provenance {
                    scope: "d1-s0".into(),
                    start: 0,
                    length: 15,
                    text: String::new(),
                },
            }],
            claim_frames: vec![ClaimFrame {
                id: "f1".into(),
                subtopic: "t1".into(),
                x: "m1".into(),
                x_text: "Reports".into(),
                negated: false,
                claimer: None,
                claimer_score: None,
                claimer_text: None,
            }],
        }
    }

    #[test]
    fn validate_accepts_consistent_document() {
        assert!(tiny_doc().validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_mention() {
        let mut doc = tiny_doc();
        doc.mentions[0].tok_span = TokenSpan::new(2, 5);
        assert!(doc.validate().is_err());
    }

    #[test]
    fn validate_rejects_misnumbered_sentences() {
        let mut doc = tiny_doc();
        doc.sentences[1].id = 7;
        assert!(doc.validate().is_err());
    }

    #[test]
    fn index_groups_by_sentence_and_scope() {
        let doc = tiny_doc();
        let index = doc.index();
        assert_eq!(index.mentions_in_sentence(0).len(), 1);
        assert!(index.mentions_in_sentence(1).is_empty());
        assert_eq!(index.events_in_scope("d1-s0").len(), 1);
        assert!(index.events_in_scope("d1-s1").is_empty());
        assert_eq!(index.mention("m1").unwrap().id, "m1");
        assert!(index.mention("m9").is_none());
    }

    #[test]
    fn json_roundtrip_preserves_claimer_fields() {
        let mut doc = tiny_doc();
        doc.claim_frames[0].claimer = Some("m1".into());
        doc.claim_frames[0].claimer_score = Some(0.75);
        doc.claim_frames[0].claimer_text = Some("Reports".into());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d1.claims.json");
        doc.save(&path).unwrap();
        let loaded = Document::load(&path).unwrap();
        assert_eq!(loaded.claim_frames[0].claimer.as_deref(), Some("m1"));
        assert_eq!(loaded.claim_frames[0].claimer_score, Some(0.75));
    }
}
