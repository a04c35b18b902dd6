//! Ranking of integrated-gradients token attributions for display.

use std::cmp::Ordering;

use crate::toxicity_api::TokenAttribution;

/// Number of tokens shown in the attribution panel.
pub const MAX_RANKED_ATTRIBUTIONS: usize = 30;

/// Sort attributions by descending score and keep the first `limit`.
///
/// The sort is stable, so equal scores keep their service order. The input is
/// left untouched.
pub fn rank_attributions(attributions: &[TokenAttribution], limit: usize) -> Vec<TokenAttribution> {
    let mut ranked = attributions.to_vec();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(limit);
    ranked
}

/// Ranked attributions cached per explanation.
///
/// `key` identifies the explanation (the run that produced it); ranking only
/// happens again when the key changes.
#[derive(Debug, Default)]
pub struct RankedAttributions {
    key: Option<u64>,
    ranked: Vec<TokenAttribution>,
    computations: usize,
}

impl RankedAttributions {
    pub fn get_or_rank(&mut self, key: u64, attributions: &[TokenAttribution]) -> &[TokenAttribution] {
        if self.key != Some(key) {
            self.ranked = rank_attributions(attributions, MAX_RANKED_ATTRIBUTIONS);
            self.key = Some(key);
            self.computations += 1;
        }
        &self.ranked
    }

    /// Drop the cached ranking.
    pub fn clear(&mut self) {
        self.key = None;
        self.ranked.clear();
    }

    /// How many times a ranking has been computed.
    pub fn computations(&self) -> usize {
        self.computations
    }
}
