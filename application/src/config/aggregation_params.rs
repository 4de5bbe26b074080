//! Aggregation bounds: fan-out/fan-in resource control.
//!
//! [`AggregationParams`] bounds every aggregation call made by an action:
//! how many shards may be fanned out to, how far a single branch may
//! paginate, how many branches run at once, and the wall-clock deadline
//! shared by discovery and all branches.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Aggregation bounds.
///
/// | Bound | On overflow |
/// |-------|-------------|
/// | `max_shards` | extra discovered shards are dropped (warning) |
/// | `max_pages_per_branch` | the branch stops and keeps what it fetched (warning) |
/// | `max_concurrent_branches` | further branches wait for a slot |
/// | `deadline` | unfinished branches fail with `DeadlineExceeded`; discovery fails the call |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationParams {
    pub max_shards: usize,
    pub max_pages_per_branch: usize,
    pub max_concurrent_branches: usize,
    pub deadline: Option<Duration>,
}

impl Default for AggregationParams {
    fn default() -> Self {
        Self {
            max_shards: 100,
            max_pages_per_branch: 50,
            max_concurrent_branches: 8,
            deadline: Some(Duration::from_secs(60)),
        }
    }
}

impl AggregationParams {
    // ==================== Builder Methods ====================

    pub fn with_max_shards(mut self, max: usize) -> Self {
        self.max_shards = max;
        self
    }

    pub fn with_max_pages_per_branch(mut self, max: usize) -> Self {
        self.max_pages_per_branch = max;
        self
    }

    pub fn with_max_concurrent_branches(mut self, max: usize) -> Self {
        self.max_concurrent_branches = max;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}
