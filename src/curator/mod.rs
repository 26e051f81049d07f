//! Curator: compatibility scoring, match ranking, and mashup-type selection
//!
//! The curator answers two questions: "which songs in the catalog pair well
//! with this one?" and "what kind of mashup should these two songs become?".

mod matcher;
mod pairs;
mod recommend;
mod scoring;

pub use matcher::{Curator, MatchQuery, MatchStrategy};
pub use pairs::{find_all_pairs, PairQuery};
pub use recommend::recommend_mashup_type;
pub use scoring::{score_pair, ScoreWeights};

/// Tunables for the matching engine
#[derive(Debug, Clone)]
pub struct CuratorConfig {
    /// BPM window half-width as a fraction of the target BPM
    pub bpm_tolerance: f64,
    /// Default number of candidates returned
    pub max_candidates: usize,
    /// Harmonic over-fetch size feeding the hybrid semantic rerank
    pub hybrid_prefetch: usize,
    /// Strategy used when the caller does not pick one
    pub default_strategy: MatchStrategy,
    /// Factor weights for the compatibility scorer
    pub weights: ScoreWeights,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            bpm_tolerance: 0.05,
            max_candidates: 5,
            hybrid_prefetch: 50,
            default_strategy: MatchStrategy::Hybrid,
            weights: ScoreWeights::default(),
        }
    }
}
