//! Reciprocal Rank Fusion.
//!
//! Two entry points:
//! - [`rrf_score`] sums `1 / (k + rank)` over a flat evidence list, each rank
//!   owned by the stage that produced it. This is what the trust analyst uses.
//! - [`fuse_ranked_lists`] is classical RRF over several ranked lists of the
//!   same items, where an item's rank is its 1-based position in each list.

use crate::types::Evidence;
use std::collections::HashMap;

/// Standard RRF damping constant.
pub const DEFAULT_RRF_K: u32 = 60;

/// Score threshold above which fused items count as high confidence.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.01;

/// Parameters for multi-list fusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RrfConfig {
    pub k: u32,
    /// Keep only the best `top_k` items, if set.
    pub top_k: Option<usize>,
}

impl RrfConfig {
    pub fn new(k: u32) -> Self {
        Self { k, top_k: None }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

impl Default for RrfConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RRF_K)
    }
}

/// Contribution of one item at `rank`.
pub fn reciprocal_rank(k: u32, rank: u32) -> f64 {
    1.0 / (f64::from(k) + f64::from(rank))
}

/// Unrounded RRF sum over `evidence`. Empty input yields `0.0`.
pub fn raw_rrf_score(evidence: &[Evidence], k: u32) -> f64 {
    evidence.iter().map(|e| reciprocal_rank(k, e.rank)).sum()
}

/// RRF sum over `evidence`, rounded to two decimal places.
pub fn rrf_score(evidence: &[Evidence], k: u32) -> f64 {
    round2(raw_rrf_score(evidence, k))
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fuse several ranked lists of item keys.
///
/// Position 0 in a list is rank 1. Duplicates within one list each
/// contribute. Output is sorted by descending score, ties broken by key.
pub fn fuse_ranked_lists<S: AsRef<str>>(lists: &[Vec<S>], config: RrfConfig) -> Vec<(String, f64)> {
    let mut scores: HashMap<&str, f64> = HashMap::new();
    for list in lists {
        for (position, item) in list.iter().enumerate() {
            let rank = u32::try_from(position + 1).unwrap_or(u32::MAX);
            *scores.entry(item.as_ref()).or_insert(0.0) += reciprocal_rank(config.k, rank);
        }
    }

    let mut fused: Vec<(String, f64)> = scores
        .into_iter()
        .map(|(key, score)| (key.to_string(), score))
        .collect();
    fused.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    if let Some(top_k) = config.top_k {
        fused.truncate(top_k);
    }
    fused
}

/// Keep fused entries scoring strictly above `threshold`.
pub fn high_confidence(fused: &[(String, f64)], threshold: f64) -> Vec<(String, f64)> {
    fused
        .iter()
        .filter(|(_, score)| *score > threshold)
        .cloned()
        .collect()
}
