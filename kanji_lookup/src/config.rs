use serde_derive::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::error::{RecogError, RecogResult};

/// Tuning knobs for ranking and scoring.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MatchConfig {
    /// Results scoring below this share of the best score are dropped
    pub prune_ratio: f32,
    /// Candidate points ranked up front per drawn point in the fuzzy comparer
    pub fuzzy_top_k: usize,
    /// Stroke-count buckets at least this large are scored in parallel
    pub parallel_threshold: usize,
    /// Comparers kept for reuse before the cache is emptied
    pub cache_capacity: usize,
    /// Optional cap on returned matches
    pub max_results: Option<usize>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            prune_ratio: 0.75,
            fuzzy_top_k: 5,
            parallel_threshold: 64,
            cache_capacity: 32,
            max_results: None,
        }
    }
}

impl MatchConfig {
    /// Reads a JSON config; missing fields take their defaults.
    pub fn load(path: &Path) -> RecogResult<MatchConfig> {
        let data = fs::read_to_string(path)?;
        MatchConfig::from_json(&data)
            .map_err(|e| RecogError::Config(format!("failed to load {}: {}", path.display(), e)))
    }

    pub fn from_json(data: &str) -> RecogResult<MatchConfig> {
        let config: MatchConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RecogResult<()> {
        if !(self.prune_ratio > 0f32 && self.prune_ratio <= 1f32) {
            return Err(RecogError::Config(format!("prune_ratio {} must be in (0, 1]", self.prune_ratio)));
        }
        if self.fuzzy_top_k == 0 {
            return Err(RecogError::Config("fuzzy_top_k must be at least 1".to_string()));
        }
        if self.max_results == Some(0) {
            return Err(RecogError::Config("max_results must be positive when set".to_string()));
        }
        Ok(())
    }
}
