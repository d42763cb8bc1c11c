//! Topic configuration: per-subtopic question templates.
//!
//! Each subtopic carries an affirmative and a negated template containing an
//! `X` placeholder. The pipeline substitutes the claim frame's trigger text
//! for `X` and wraps the result into the attribution question.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Placeholder substituted with the trigger mention's text.
const PLACEHOLDER: &str = "X";

/// Affirmative/negated question templates for one subtopic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionTemplates {
    /// Template used when the claim frame is not negated.
    pub affirmative: String,
    /// Template used when the claim frame is negated.
    pub negated: String,
}

/// Mapping from subtopic id to its question templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicConfig {
    /// Subtopics by id.
    pub subtopics: HashMap<String, QuestionTemplates>,
}

impl TopicConfig {
    /// Read a topic configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<TopicConfig> {
        let file = File::open(path.as_ref()).map_err(|e| {
            Error::topic_config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Build the attribution question for a claim frame.
    ///
    /// Returns `None` when the subtopic is unknown; the caller skips the
    /// frame in that case. The statement's first letter is lowercased so it
    /// reads naturally inside the question.
    #[must_use]
    pub fn question(&self, subtopic: &str, negated: bool, x_text: &str) -> Option<String> {
        let templates = self.subtopics.get(subtopic)?;
        let template = if negated {
            &templates.negated
        } else {
            &templates.affirmative
        };
        let statement = template.replace(PLACEHOLDER, x_text);
        let mut chars = statement.chars();
        let statement = match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect::<String>(),
            None => statement,
        };
        Some(format!("Who said that {}?", statement))
    }
}
