//! Batch scheduling for oracle calls.
//!
//! Padding cost is driven by the longest instance in a batch, so instances
//! are sorted by combined length before being grouped. The sort is purely a
//! throughput optimization: outputs are permuted back so the caller always
//! sees scores in input order.

use crate::error::{Error, Result};
use crate::piece::QaInstance;
use crate::Oracle;

/// Equal-length model input for one oracle call.
#[derive(Debug, Clone)]
pub struct PaddedBatch {
    /// Sub-token ids, one row per instance, padded to the batch width.
    pub input_ids: Vec<Vec<u32>>,
    /// 1 for real positions, 0 for padding.
    pub attention_mask: Vec<Vec<u8>>,
    /// 0 for the question segment (including `[CLS]` and its separator),
    /// 1 for the context segment, 0 for padding.
    pub type_ids: Vec<Vec<u8>>,
}

impl PaddedBatch {
    /// Pad a group of instances to a common width.
    #[must_use]
    pub fn from_instances(instances: &[&QaInstance], pad: u32) -> Self {
        let width = instances.iter().map(|inst| inst.len()).max().unwrap_or(0);
        let mut input_ids = Vec::with_capacity(instances.len());
        let mut attention_mask = Vec::with_capacity(instances.len());
        let mut type_ids = Vec::with_capacity(instances.len());
        for inst in instances {
            let mut ids = inst.input_ids.clone();
            let mut mask = vec![1u8; inst.len()];
            let mut types: Vec<u8> = (0..inst.len())
                .map(|pos| u8::from(pos >= inst.context_offset))
                .collect();
            ids.resize(width, pad);
            mask.resize(width, 0);
            types.resize(width, 0);
            input_ids.push(ids);
            attention_mask.push(mask);
            type_ids.push(types);
        }
        Self {
            input_ids,
            attention_mask,
            type_ids,
        }
    }

    /// Number of instances in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    /// Check if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// Score all instances, returning one probability vector per instance in
/// the original input order.
///
/// Instances are stably sorted by combined length, grouped into batches of
/// at most `batch_size`, scored group by group, and the outputs permuted
/// back. The i-th output is always the score for the i-th input, whatever
/// the batch size or length distribution.
pub fn scored_in_order(
    oracle: &dyn Oracle,
    instances: &[QaInstance],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    if batch_size == 0 {
        return Err(Error::invalid_input("batch size must be positive"));
    }
    if instances.is_empty() {
        return Ok(Vec::new());
    }

    let mut order: Vec<usize> = (0..instances.len()).collect();
    order.sort_by_key(|&i| instances[i].len());

    let pad = oracle.specials().pad;
    let mut out: Vec<Vec<f32>> = vec![Vec::new(); instances.len()];
    for group in order.chunks(batch_size) {
        let refs: Vec<&QaInstance> = group.iter().map(|&i| &instances[i]).collect();
        let batch = PaddedBatch::from_instances(&refs, pad);
        let scores = oracle.score_batch(&batch)?;
        if scores.len() != group.len() {
            return Err(Error::inference(format!(
                "oracle returned {} score vectors for a batch of {}",
                scores.len(),
                group.len()
            )));
        }
        for (&orig_idx, inst_scores) in group.iter().zip(scores) {
            out[orig_idx] = inst_scores;
        }
    }
    Ok(out)
}
