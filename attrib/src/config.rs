//! Tunable parameters for the attribution pass.

/// Recognized knobs of the attribution pipeline.
///
/// The oracle's own limits (maximum combined and question sub-token
/// lengths) are not here; they come from [`crate::Oracle`] so the pipeline
/// and the model can never disagree.
#[derive(Debug, Clone)]
pub struct AttribConfig {
    /// A candidate qualifies only if some covered token scores above this.
    pub prob_threshold: f32,
    /// Final candidates are capped at `ceil(ratio * sentence_count)`.
    pub selection_ratio: f64,
    /// Maximum number of sentences to look back when building a context
    /// window.
    pub context_lookback: usize,
    /// Instances per oracle call.
    pub batch_size: usize,
}

impl Default for AttribConfig {
    fn default() -> Self {
        Self {
            prob_threshold: 0.5,
            selection_ratio: 0.5,
            context_lookback: 5,
            batch_size: 16,
        }
    }
}

impl AttribConfig {
    /// Create a config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the candidate probability threshold.
    #[must_use]
    pub fn with_prob_threshold(mut self, threshold: f32) -> Self {
        self.prob_threshold = threshold;
        self
    }

    /// Set the document selection ratio.
    #[must_use]
    pub fn with_selection_ratio(mut self, ratio: f64) -> Self {
        self.selection_ratio = ratio;
        self
    }

    /// Set the context look-back sentence count.
    #[must_use]
    pub fn with_context_lookback(mut self, lookback: usize) -> Self {
        self.context_lookback = lookback;
        self
    }

    /// Set the oracle batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}
