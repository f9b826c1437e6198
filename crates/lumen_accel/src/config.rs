//! BVH build configuration.

use serde::{Deserialize, Serialize};

/// Number of SAH split candidates per axis when none is given.
pub const DEFAULT_SAH_CANDIDATES: usize = 5;

/// How a BVH node chooses its split plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    /// Longest axis, split at the centroid median (balanced by count).
    Median,
    /// Surface area heuristic over evenly spaced candidate planes.
    #[default]
    Sah,
}

/// Parameters for [`crate::Bvh::build`].
///
/// Changing a config has no effect on an existing BVH; it applies on the
/// next explicit build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub strategy: SplitStrategy,
    /// Candidate split positions evaluated per axis (SAH only).
    pub sah_candidates: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            strategy: SplitStrategy::Sah,
            sah_candidates: DEFAULT_SAH_CANDIDATES,
        }
    }
}

impl BuildConfig {
    /// Median split configuration.
    pub fn median() -> Self {
        Self {
            strategy: SplitStrategy::Median,
            ..Default::default()
        }
    }

    /// SAH configuration with the given candidate count per axis.
    pub fn sah(candidates: usize) -> Self {
        Self {
            strategy: SplitStrategy::Sah,
            sah_candidates: candidates,
        }
    }

    /// Set the split strategy.
    pub fn with_strategy(mut self, strategy: SplitStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the SAH candidate count.
    pub fn with_sah_candidates(mut self, candidates: usize) -> Self {
        self.sah_candidates = candidates;
        self
    }

    /// Candidate count actually used by the builder (at least one).
    pub(crate) fn effective_candidates(&self) -> usize {
        if self.sah_candidates == 0 {
            log::warn!("sah_candidates is 0, using 1 split candidate per axis");
            1
        } else {
            self.sah_candidates
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sah_with_five_candidates() {
        let config = BuildConfig::default();
        assert_eq!(config.strategy, SplitStrategy::Sah);
        assert_eq!(config.sah_candidates, 5);
    }

    #[test]
    fn test_builders() {
        assert_eq!(BuildConfig::median().strategy, SplitStrategy::Median);
        assert_eq!(BuildConfig::sah(12).sah_candidates, 12);

        let config = BuildConfig::default()
            .with_strategy(SplitStrategy::Median)
            .with_sah_candidates(3);
        assert_eq!(config.strategy, SplitStrategy::Median);
        assert_eq!(config.sah_candidates, 3);
    }

    #[test]
    fn test_zero_candidates_clamped() {
        assert_eq!(BuildConfig::sah(0).effective_candidates(), 1);
        assert_eq!(BuildConfig::sah(7).effective_candidates(), 7);
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: BuildConfig = serde_json::from_str(r#"{ "strategy": "median" }"#).unwrap();
        assert_eq!(config.strategy, SplitStrategy::Median);
        assert_eq!(config.sah_candidates, DEFAULT_SAH_CANDIDATES);
    }
}
