//! The per-document attribution pass and the directory driver.
//!
//! ```text
//! claim frame ──► question (topic template) ──┐
//!                                             ├──► QaInstance ─┐
//! trigger sentence ──► context window ────────┘                │
//!                                                              ▼
//!                                            batch scheduler + oracle
//!                                                              │
//!                                                              ▼
//!                    token scores ──► threshold/rank/prune ──► cap
//!                                                              │
//!                                                              ▼
//!                              enclosing claim event, write claimer
//! ```
//!
//! Scoring for a document is a barrier: selection never starts until the
//! oracle has answered for all of the document's instances.

use crate::batch::scored_in_order;
use crate::config::AttribConfig;
use crate::error::Result;
use crate::piece::QaInstance;
use crate::select::ScoredMention;
use crate::{aggregate, matcher, select, window, Oracle};
use attrib_core::{Document, TopicConfig};
use std::fmt;
use std::fs;
use std::path::Path;

/// Suffix of document records in a run directory.
pub const DOCUMENT_SUFFIX: &str = ".claims.json";

/// Counters of one attribution pass over a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassCounts {
    /// Sentences in the document.
    pub sentences: usize,
    /// Questions actually scored (frames minus skipped ones).
    pub questions: usize,
    /// Frames skipped for an unknown subtopic or trigger.
    pub skipped_frames: usize,
    /// Candidates passing the threshold, before pruning.
    pub cand_initial: usize,
    /// Candidates surviving per-sentence overlap pruning.
    pub cand_pruned: usize,
    /// Candidates surviving the document cap.
    pub cand_selected: usize,
    /// Selected candidates with an enclosing claim event.
    pub matched_events: usize,
    /// Selected candidates with no enclosing claim event.
    pub unmatched_events: usize,
}

impl PassCounts {
    /// Fold another pass's counters into this one.
    pub fn absorb(&mut self, other: &PassCounts) {
        self.sentences += other.sentences;
        self.questions += other.questions;
        self.skipped_frames += other.skipped_frames;
        self.cand_initial += other.cand_initial;
        self.cand_pruned += other.cand_pruned;
        self.cand_selected += other.cand_selected;
        self.matched_events += other.matched_events;
        self.unmatched_events += other.unmatched_events;
    }
}

impl fmt::Display for PassCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sentences={} questions={} skipped={} candidates={}/{}/{} events matched={} unmatched={}",
            self.sentences,
            self.questions,
            self.skipped_frames,
            self.cand_initial,
            self.cand_pruned,
            self.cand_selected,
            self.matched_events,
            self.unmatched_events
        )
    }
}

/// Outcome of a directory run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    /// Documents attributed and written.
    pub processed: usize,
    /// Documents skipped because they failed to load.
    pub failed: usize,
    /// Accumulated pass counters.
    pub counts: PassCounts,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} documents ({} failed to load); {}",
            self.processed, self.failed, self.counts
        )
    }
}

/// A claimer assignment decided for one frame.
struct Assignment {
    frame_idx: usize,
    claimer: String,
    score: f64,
    text: String,
}

/// The attribution pipeline: oracle handle, topic templates, and tunables,
/// threaded explicitly through every step.
pub struct ClaimerAttributor {
    oracle: Box<dyn Oracle>,
    topics: TopicConfig,
    config: AttribConfig,
}

impl ClaimerAttributor {
    /// Create an attributor with default tunables.
    #[must_use]
    pub fn new(oracle: Box<dyn Oracle>, topics: TopicConfig) -> Self {
        Self {
            oracle,
            topics,
            config: AttribConfig::default(),
        }
    }

    /// Replace the tunables.
    #[must_use]
    pub fn with_config(mut self, config: AttribConfig) -> Self {
        self.config = config;
        self
    }

    /// Attribute claimers for every claim frame of one document, in place.
    ///
    /// Frames referencing an unknown subtopic or trigger mention are
    /// cleared and skipped; an oracle failure aborts with an error.
    pub fn attribute(&self, doc: &mut Document) -> Result<PassCounts> {
        let mut counts = PassCounts {
            sentences: doc.sentences.len(),
            ..PassCounts::default()
        };
        let specials = self.oracle.specials();

        let assignments = {
            let index = doc.index();

            // Build one instance per scorable frame.
            let mut frame_indices: Vec<usize> = Vec::new();
            let mut instances: Vec<QaInstance> = Vec::new();
            for (frame_idx, frame) in doc.claim_frames.iter().enumerate() {
                let question_text =
                    match self
                        .topics
                        .question(&frame.subtopic, frame.negated, &frame.x_text)
                    {
                        Some(q) => q,
                        None => {
                            log::warn!(
                                "claim frame {}: subtopic {:?} not in topic config, skipping",
                                frame.id,
                                frame.subtopic
                            );
                            counts.skipped_frames += 1;
                            continue;
                        }
                    };
                let trigger = match index.mention(&frame.x) {
                    Some(m) => m,
                    None => {
                        log::warn!(
                            "claim frame {}: trigger mention {:?} not in document, skipping",
                            frame.id,
                            frame.x
                        );
                        counts.skipped_frames += 1;
                        continue;
                    }
                };
                let question = self.oracle.encode(&question_text)?;
                let budget = window::token_budget(
                    self.oracle.max_seq_length(),
                    self.oracle.max_query_length(),
                    question.len(),
                );
                let context = window::context_window(
                    &doc.sentences,
                    trigger.sentence,
                    self.config.context_lookback,
                    budget,
                );
                frame_indices.push(frame_idx);
                instances.push(QaInstance::new(
                    context,
                    question,
                    specials,
                    self.oracle.max_seq_length(),
                    self.oracle.max_query_length(),
                ));
            }
            counts.questions = instances.len();

            // Barrier: everything below needs the full score set.
            let all_probs =
                scored_in_order(self.oracle.as_ref(), &instances, self.config.batch_size)?;

            let mut assignments: Vec<Assignment> = Vec::new();
            for ((&frame_idx, instance), probs) in
                frame_indices.iter().zip(&instances).zip(&all_probs)
            {
                let sent_range = match instance.context.sent_range {
                    Some(range) => range,
                    None => {
                        log::warn!("instance for frame {} has an untagged context", frame_idx);
                        continue;
                    }
                };
                let token_scores = aggregate::token_scores(
                    &doc.sentences,
                    sent_range,
                    instance.context_offset,
                    &instance.input_ids,
                    specials.sep,
                    probs,
                );

                // Per-sentence extraction and pruning.
                let mut survivors: Vec<ScoredMention<'_>> = Vec::new();
                for sent in &doc.sentences[sent_range.0..sent_range.1] {
                    let mentions = index.mentions_in_sentence(sent.id);
                    let mut cands = select::threshold_candidates(
                        mentions,
                        &token_scores[&sent.id],
                        self.config.prob_threshold,
                    );
                    counts.cand_initial += cands.len();
                    select::rank_by_mean(&mut cands);
                    survivors.extend(select::prune_overlaps(cands));
                }
                counts.cand_pruned += survivors.len();

                // Document cap, then claim-event matching per survivor.
                let selected = select::select_top(
                    survivors,
                    self.config.selection_ratio,
                    doc.sentences.len(),
                );
                counts.cand_selected += selected.len();
                for cand in &selected {
                    let events = index.events_in_scope(&cand.mention.provenance.scope);
                    match matcher::enclosing_event(&cand.mention.provenance, events) {
                        Some(event) => {
                            log::debug!(
                                "candidate {} governed by claim event {}",
                                cand.mention.id,
                                event.id
                            );
                            counts.matched_events += 1;
                        }
                        None => {
                            log::debug!(
                                "candidate {}: no claim event in scope {:?} contains it",
                                cand.mention.id,
                                cand.mention.provenance.scope
                            );
                            counts.unmatched_events += 1;
                        }
                    }
                    assignments.push(Assignment {
                        frame_idx,
                        claimer: cand.mention.id.clone(),
                        score: cand.mean(),
                        text: cand.mention.provenance.text.clone(),
                    });
                }
            }
            assignments
        };

        // Apply: reset every frame, then write assignments in ranking
        // order. Repeated writes to one frame overwrite; the last stands.
        for frame in &mut doc.claim_frames {
            frame.clear_claimer();
        }
        for assignment in assignments {
            let frame = &mut doc.claim_frames[assignment.frame_idx];
            frame.claimer = Some(assignment.claimer);
            frame.claimer_score = Some(assignment.score);
            frame.claimer_text = Some(assignment.text);
        }
        Ok(counts)
    }

    /// Attribute every `*.claims.json` document under `input_dir`, writing
    /// results to `output_dir`.
    ///
    /// Files are handled in sorted order. A document that fails to load is
    /// logged and skipped; only an oracle failure aborts the run.
    pub fn run_directory(
        &self,
        input_dir: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Result<RunSummary> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;

        let mut paths: Vec<_> = fs::read_dir(input_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(DOCUMENT_SUFFIX))
            })
            .collect();
        paths.sort();

        let total = paths.len();
        let mut summary = RunSummary::default();
        for (file_idx, path) in paths.iter().enumerate() {
            let mut doc = match Document::load(path) {
                Ok(doc) => doc,
                Err(e) => {
                    log::warn!("error loading {}, skipping document: {}", path.display(), e);
                    summary.failed += 1;
                    continue;
                }
            };
            let counts = self.attribute(&mut doc)?;
            log::info!(
                "{} [{}/{}]: {}",
                doc.doc_id,
                file_idx + 1,
                total,
                counts
            );
            doc.save(output_dir.join(format!("{}{}", doc.doc_id, DOCUMENT_SUFFIX)))?;
            summary.processed += 1;
            summary.counts.absorb(&counts);
        }
        log::info!("finished: {}", summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_absorb_adds_fields() {
        let mut a = PassCounts {
            sentences: 2,
            questions: 1,
            cand_initial: 3,
            ..PassCounts::default()
        };
        let b = PassCounts {
            sentences: 5,
            questions: 2,
            cand_initial: 1,
            unmatched_events: 4,
            ..PassCounts::default()
        };
        a.absorb(&b);
        assert_eq!(a.sentences, 7);
        assert_eq!(a.questions, 3);
        assert_eq!(a.cand_initial, 4);
        assert_eq!(a.unmatched_events, 4);
    }

    #[test]
    fn counts_display_is_compact() {
        let counts = PassCounts {
            sentences: 5,
            questions: 2,
            cand_initial: 6,
            cand_pruned: 4,
            cand_selected: 3,
            matched_events: 2,
            unmatched_events: 1,
            ..PassCounts::default()
        };
        let line = counts.to_string();
        assert!(line.contains("sentences=5"));
        assert!(line.contains("candidates=6/4/3"));
    }
}
