//! Fan-in merge of settled branch outcomes.
//!
//! Pure and single-threaded: runs after every branch has settled.
//!
//! 1. Order outcomes by enumeration index (never completion order)
//! 2. Drop failed branches, recording them in the report
//! 3. Apply the per-item filter
//! 4. Deduplicate by identity key, first-seen-wins, no field merging
//! 5. Truncate to `limit`

use std::collections::HashSet;

use super::value_objects::IdentityKeyed;
use crate::action::error::ActionError;

/// Settled result of one concurrent branch
#[derive(Debug, Clone)]
pub struct BranchOutcome<T> {
    /// Position of the branch in enumeration order
    pub index: usize,
    /// Human-readable branch name for logs (scope or shard name)
    pub label: String,
    pub result: Result<Vec<T>, ActionError>,
}

impl<T> BranchOutcome<T> {
    pub fn success(index: usize, label: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            index,
            label: label.into(),
            result: Ok(items),
        }
    }

    pub fn failure(index: usize, label: impl Into<String>, error: ActionError) -> Self {
        Self {
            index,
            label: label.into(),
            result: Err(error),
        }
    }
}

/// A branch that contributed nothing to the merge
#[derive(Debug, Clone, PartialEq)]
pub struct BranchFailure {
    pub index: usize,
    pub label: String,
    pub error: ActionError,
}

/// Outcome of a merge
#[derive(Debug, Clone)]
pub struct MergeReport<T> {
    pub items: Vec<T>,
    /// Total branches that were run
    pub branch_count: usize,
    /// Branches excluded from the merge, in enumeration order
    pub failed: Vec<BranchFailure>,
    pub duplicates_dropped: usize,
    /// Whether `limit` cut the merged list short
    pub truncated: bool,
}

impl<T> MergeReport<T> {
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn succeeded_branches(&self) -> usize {
        self.branch_count - self.failed.len()
    }
}

/// Merge without filtering
pub fn merge_branches<T: IdentityKeyed>(
    outcomes: Vec<BranchOutcome<T>>,
    limit: Option<usize>,
) -> MergeReport<T> {
    merge_branches_with(outcomes, limit, |_| true)
}

/// Merge keeping only items for which `keep` returns true. The filter runs
/// per item before deduplication, so a filtered-out item never shadows a
/// later item with the same identity key.
pub fn merge_branches_with<T, F>(
    mut outcomes: Vec<BranchOutcome<T>>,
    limit: Option<usize>,
    keep: F,
) -> MergeReport<T>
where
    T: IdentityKeyed,
    F: Fn(&T) -> bool,
{
    outcomes.sort_by_key(|o| o.index);

    let branch_count = outcomes.len();
    let mut failed = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut items = Vec::new();
    let mut duplicates_dropped = 0usize;

    for outcome in outcomes {
        match outcome.result {
            Ok(branch_items) => {
                for item in branch_items {
                    if !keep(&item) {
                        continue;
                    }
                    if seen.insert(item.identity_key().to_string()) {
                        items.push(item);
                    } else {
                        duplicates_dropped += 1;
                    }
                }
            }
            Err(error) => failed.push(BranchFailure {
                index: outcome.index,
                label: outcome.label,
                error,
            }),
        }
    }

    let mut truncated = false;
    if let Some(limit) = limit
        && items.len() > limit
    {
        items.truncate(limit);
        truncated = true;
    }

    MergeReport {
        items,
        branch_count,
        failed,
        duplicates_dropped,
        truncated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::value_objects::AggregationItem;
    use serde_json::json;

    fn item(id: &str, extra: serde_json::Value) -> AggregationItem {
        let mut value = extra;
        value["id"] = json!(id);
        AggregationItem::from_value(value, "id").unwrap()
    }

    fn ids(report: &MergeReport<AggregationItem>) -> Vec<&str> {
        report.items.iter().map(|i| i.identity_key()).collect()
    }

    #[test]
    fn test_first_seen_wins() {
        let outcomes = vec![
            BranchOutcome::success(0, "a", vec![item("42", json!({"from": "A"}))]),
            BranchOutcome::success(1, "b", vec![item("42", json!({"from": "B", "only_b": true}))]),
        ];

        let report = merge_branches(outcomes, None);

        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].get_str("from"), Some("A"));
        assert!(report.items[0].get("only_b").is_none());
        assert_eq!(report.duplicates_dropped, 1);
    }

    #[test]
    fn test_enumeration_order_not_arrival_order() {
        // Outcomes arrive out of order; merge must follow index.
        let outcomes = vec![
            BranchOutcome::success(2, "c", vec![item("c1", json!({}))]),
            BranchOutcome::success(0, "a", vec![item("a1", json!({}))]),
            BranchOutcome::success(1, "b", vec![item("b1", json!({}))]),
        ];

        let report = merge_branches(outcomes, None);
        assert_eq!(ids(&report), vec!["a1", "b1", "c1"]);
    }

    #[test]
    fn test_failed_branch_contributes_nothing() {
        let outcomes = vec![
            BranchOutcome::success(0, "a", vec![item("1", json!({})), item("2", json!({}))]),
            BranchOutcome::failure(1, "b", ActionError::upstream("503")),
            BranchOutcome::success(2, "c", vec![item("3", json!({}))]),
        ];

        let report = merge_branches(outcomes, None);

        assert_eq!(ids(&report), vec!["1", "2", "3"]);
        assert!(report.is_partial());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].label, "b");
        assert_eq!(report.succeeded_branches(), 2);
    }

    #[test]
    fn test_limit_truncates_merged_list() {
        let outcomes = vec![
            BranchOutcome::success(0, "a", vec![item("1", json!({})), item("2", json!({}))]),
            BranchOutcome::success(1, "b", vec![item("2", json!({})), item("3", json!({})), item("4", json!({}))]),
        ];

        let report = merge_branches(outcomes, Some(3));

        assert_eq!(ids(&report), vec!["1", "2", "3"]);
        assert!(report.truncated);
    }

    #[test]
    fn test_limit_larger_than_result_is_not_truncation() {
        let outcomes = vec![BranchOutcome::success(0, "a", vec![item("1", json!({}))])];
        let report = merge_branches(outcomes, Some(10));
        assert_eq!(report.items.len(), 1);
        assert!(!report.truncated);
    }

    #[test]
    fn test_filter_runs_before_dedup() {
        // The folder entry in branch A is filtered out, so branch B's file
        // with the same id survives.
        let outcomes = vec![
            BranchOutcome::success(0, "a", vec![item("x", json!({"kind": "folder"}))]),
            BranchOutcome::success(1, "b", vec![item("x", json!({"kind": "file"}))]),
        ];

        let report = merge_branches_with(outcomes, None, |i: &AggregationItem| {
            i.get_str("kind") != Some("folder")
        });

        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].get_str("kind"), Some("file"));
        assert_eq!(report.duplicates_dropped, 0);
    }

    #[test]
    fn test_three_shard_scenario() {
        let outcomes = vec![
            BranchOutcome::success(0, "A", vec![item("a1", json!({})), item("dup", json!({"from": "A"}))]),
            BranchOutcome::failure(1, "B", ActionError::upstream("boom")),
            BranchOutcome::success(
                2,
                "C",
                vec![item("c1", json!({})), item("dup", json!({"from": "C"})), item("c2", json!({}))],
            ),
        ];

        let report = merge_branches(outcomes, None);

        assert_eq!(report.items.len(), 4);
        assert_eq!(ids(&report), vec!["a1", "dup", "c1", "c2"]);
        assert_eq!(report.items[1].get_str("from"), Some("A"));
    }
}
