//! Aggregation bounds from TOML (`[aggregation]` section)

use std::time::Duration;

use serde::{Deserialize, Serialize};
use switchboard_application::AggregationParams;

use super::ConfigValidationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAggregationConfig {
    /// Shards kept after discovery (default: 100)
    pub max_shards: usize,
    /// Pages fetched per branch (default: 50)
    pub max_pages_per_branch: usize,
    /// Branches running at once (default: 8)
    pub max_concurrent_branches: usize,
    /// Wall-clock bound on one aggregation call (default: 60)
    pub deadline_seconds: Option<u64>,
}

impl Default for FileAggregationConfig {
    fn default() -> Self {
        let params = AggregationParams::default();
        Self {
            max_shards: params.max_shards,
            max_pages_per_branch: params.max_pages_per_branch,
            max_concurrent_branches: params.max_concurrent_branches,
            deadline_seconds: params.deadline.map(|d| d.as_secs()),
        }
    }
}

impl FileAggregationConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let bounds = [
            ("aggregation.max_shards", self.max_shards),
            ("aggregation.max_pages_per_branch", self.max_pages_per_branch),
            (
                "aggregation.max_concurrent_branches",
                self.max_concurrent_branches,
            ),
        ];
        if let Some((field, _)) = bounds.into_iter().find(|(_, value)| *value == 0) {
            return Err(ConfigValidationError::ZeroValue(field));
        }
        if self.deadline_seconds == Some(0) {
            return Err(ConfigValidationError::ZeroValue("aggregation.deadline_seconds"));
        }
        Ok(())
    }

    pub fn to_params(&self) -> AggregationParams {
        AggregationParams::default()
            .with_max_shards(self.max_shards)
            .with_max_pages_per_branch(self.max_pages_per_branch)
            .with_max_concurrent_branches(self.max_concurrent_branches)
            .with_deadline(self.deadline_seconds.map(Duration::from_secs))
    }
}
