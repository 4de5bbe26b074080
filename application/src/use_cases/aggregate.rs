//! Fan-out/fan-in aggregation engine
//!
//! Runs independent paginated branches concurrently and merges them once
//! every branch has settled.
//!
//! # Topologies
//!
//! - [`AggregationEngine::broad_query`]: a fixed set of scoped queries
//! - [`AggregationEngine::per_shard`]: discover shards first, then one
//!   branch per shard (plus any leading branches, e.g. a personal store)
//!
//! # Failure handling
//!
//! A failed branch is logged and excluded; the call still succeeds with
//! partial data. A failed discovery fails the whole call with
//! [`ActionError::Discovery`]. Cancellation aborts every in-flight branch
//! and fails the call with [`ActionError::Cancelled`].

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use switchboard_domain::{
    ActionError, BranchOutcome, IdentityKeyed, MergeReport, PaginationState, SourceDescriptor,
    merge_branches,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::shared::{check_cancelled, panic_message};
use crate::config::AggregationParams;
use crate::ports::page_source::PageSource;

/// Predicate deciding whether an item takes part in the merge
pub type ItemFilter<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Per-call options shared by every branch
pub struct AggregateOptions<T> {
    /// Post-merge result count; also lets a branch stop early once it alone has this many items
    pub limit: Option<usize>,
    filter: Option<ItemFilter<T>>,
}

impl<T> AggregateOptions<T> {
    pub fn new() -> Self {
        Self {
            limit: None,
            filter: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_filter(mut self, filter: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn keeps(&self, item: &T) -> bool {
        self.filter.as_ref().is_none_or(|keep| keep(item))
    }
}

impl<T> Default for AggregateOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for AggregateOptions<T> {
    fn clone(&self) -> Self {
        Self {
            limit: self.limit,
            filter: self.filter.clone(),
        }
    }
}

/// Result of a per-shard aggregation
#[derive(Debug, Clone)]
pub struct ShardedReport<T> {
    /// Shards that were fanned out to, after dedup and the shard bound
    pub shards: Vec<SourceDescriptor>,
    pub report: MergeReport<T>,
}

/// Concurrent fan-out over [`PageSource`]s.
///
/// One deadline covers discovery and every branch of a call. Cloned into
/// each branch task; clones share the cancellation token.
#[derive(Debug, Clone)]
pub struct AggregationEngine {
    params: AggregationParams,
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl AggregationEngine {
    pub fn new(params: AggregationParams) -> Self {
        Self {
            params,
            cancellation: CancellationToken::new(),
            deadline: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn params(&self) -> &AggregationParams {
        &self.params
    }

    /// Paginate a single source to exhaustion (or to the page bound / limit).
    pub async fn paginate<T: Send>(
        &self,
        source: &dyn PageSource<T>,
        options: &AggregateOptions<T>,
    ) -> Result<Vec<T>, ActionError> {
        self.armed().paginate_branch(source, options).await
    }

    /// Broad-query topology: every scope is one branch.
    pub async fn broad_query<T>(
        &self,
        scopes: Vec<Arc<dyn PageSource<T>>>,
        options: AggregateOptions<T>,
    ) -> Result<MergeReport<T>, ActionError>
    where
        T: IdentityKeyed + Send + 'static,
    {
        let run = self.armed();
        info!("Starting broad-query aggregation over {} scopes", scopes.len());

        let outcomes = run.fan_out(scopes, &options).await?;
        Ok(run.settle(outcomes, options.limit))
    }

    /// Per-shard topology.
    ///
    /// `leading` branches come first in enumeration order, followed by one
    /// branch per discovered shard built with `shard_source`.
    pub async fn per_shard<T, F>(
        &self,
        discovery: &dyn PageSource<SourceDescriptor>,
        leading: Vec<Arc<dyn PageSource<T>>>,
        shard_source: F,
        options: AggregateOptions<T>,
    ) -> Result<ShardedReport<T>, ActionError>
    where
        T: IdentityKeyed + Send + 'static,
        F: Fn(&SourceDescriptor) -> Arc<dyn PageSource<T>> + Send,
    {
        let run = self.armed();
        let shards = run.discover(discovery).await?;

        let mut sources = leading;
        sources.extend(shards.iter().map(&shard_source));
        info!(
            "Starting per-shard aggregation: {} shards, {} branches",
            shards.len(),
            sources.len()
        );

        let outcomes = run.fan_out(sources, &options).await?;
        Ok(ShardedReport {
            shards,
            report: run.settle(outcomes, options.limit),
        })
    }

    /// Copy of this engine with the call deadline fixed.
    fn armed(&self) -> Self {
        let mut run = self.clone();
        if run.deadline.is_none() {
            run.deadline = self.params.deadline.map(|d| Instant::now() + d);
        }
        run
    }

    /// Race a future against cancellation and the call deadline.
    async fn bounded<R>(
        &self,
        future: impl Future<Output = Result<R, ActionError>>,
    ) -> Result<R, ActionError> {
        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(ActionError::Cancelled),
            _ = deadline => Err(ActionError::DeadlineExceeded(
                "aggregation deadline reached".to_string(),
            )),
            result = future => result,
        }
    }

    /// Sequential pagination of one branch: `Start -> HasCursor* -> Exhausted`.
    async fn paginate_branch<T: Send>(
        &self,
        source: &dyn PageSource<T>,
        options: &AggregateOptions<T>,
    ) -> Result<Vec<T>, ActionError> {
        let label = source.label();
        let mut state = PaginationState::Start;
        let mut items = Vec::new();
        let mut pages = 0usize;

        loop {
            if pages >= self.params.max_pages_per_branch {
                warn!(
                    "Source {} hit the page bound ({}), keeping {} items",
                    label,
                    pages,
                    items.len()
                );
                break;
            }

            let page = match self
                .bounded(source.fetch_page(state.next_request_cursor()))
                .await
            {
                Ok(page) => page,
                Err(ActionError::DeadlineExceeded(_)) if pages > 0 => {
                    warn!(
                        "Source {} hit the aggregation deadline after {} pages, keeping {} items",
                        label,
                        pages,
                        items.len()
                    );
                    break;
                }
                Err(e) => return Err(e),
            };
            pages += 1;
            debug!(
                "Source {} page {}: {} items, more: {}",
                label,
                pages,
                page.items.len(),
                page.next_cursor.is_some()
            );

            items.extend(page.items.into_iter().filter(|item| options.keeps(item)));
            state = state.advance(page.next_cursor);

            if state.is_exhausted() {
                break;
            }
            if let Some(limit) = options.limit
                && items.len() >= limit
            {
                debug!("Source {} reached limit {}, stopping early", label, limit);
                break;
            }
        }

        Ok(items)
    }

    /// List shards. Any failure other than cancellation is a discovery failure.
    async fn discover(
        &self,
        discovery: &dyn PageSource<SourceDescriptor>,
    ) -> Result<Vec<SourceDescriptor>, ActionError> {
        let listed = match self
            .paginate_branch(discovery, &AggregateOptions::new())
            .await
        {
            Ok(listed) => listed,
            Err(ActionError::Cancelled) => return Err(ActionError::Cancelled),
            Err(ActionError::Discovery(message)) => return Err(ActionError::Discovery(message)),
            Err(e) => {
                warn!("Shard discovery via {} failed: {}", discovery.label(), e);
                return Err(ActionError::discovery(e.to_string()));
            }
        };

        let mut seen = HashSet::new();
        let mut shards: Vec<SourceDescriptor> = listed
            .into_iter()
            .filter(|shard| seen.insert(shard.id.clone()))
            .collect();

        if shards.len() > self.params.max_shards {
            warn!(
                "Discovered {} shards, fanning out to the first {}",
                shards.len(),
                self.params.max_shards
            );
            shards.truncate(self.params.max_shards);
        }

        Ok(shards)
    }

    /// Run every source as its own task and wait for all of them (settle-all).
    ///
    /// Outcomes are returned in enumeration order regardless of completion order.
    async fn fan_out<T: Send + 'static>(
        &self,
        sources: Vec<Arc<dyn PageSource<T>>>,
        options: &AggregateOptions<T>,
    ) -> Result<Vec<BranchOutcome<T>>, ActionError> {
        check_cancelled(&self.cancellation)?;

        let permits = Arc::new(Semaphore::new(self.params.max_concurrent_branches.max(1)));
        let mut join_set = JoinSet::new();
        let mut labels = Vec::with_capacity(sources.len());
        let mut task_index = HashMap::new();

        for (index, source) in sources.into_iter().enumerate() {
            labels.push(source.label());
            let engine = self.clone();
            let options = options.clone();
            let permits = Arc::clone(&permits);

            let handle = join_set.spawn(async move {
                let result = async {
                    let _permit = engine
                        .bounded(async {
                            permits
                                .acquire_owned()
                                .await
                                .map_err(|_| ActionError::Cancelled)
                        })
                        .await?;
                    engine.paginate_branch(source.as_ref(), &options).await
                }
                .await;
                (index, result)
            });
            task_index.insert(handle.id(), index);
        }

        let mut settled: Vec<Option<BranchOutcome<T>>> =
            (0..labels.len()).map(|_| None).collect();

        loop {
            let joined = tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => {
                    join_set.abort_all();
                    return Err(ActionError::Cancelled);
                }
                joined = join_set.join_next_with_id() => joined,
            };

            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok((_, (index, Ok(items)))) => {
                    debug!("Branch {} settled with {} items", labels[index], items.len());
                    settled[index] = Some(BranchOutcome::success(
                        index,
                        labels[index].clone(),
                        items,
                    ));
                }
                Ok((_, (index, Err(e)))) => {
                    warn!("Branch {} failed, excluding from merge: {}", labels[index], e);
                    settled[index] = Some(BranchOutcome::failure(index, labels[index].clone(), e));
                }
                Err(e) => {
                    let Some(&index) = task_index.get(&e.id()) else {
                        warn!("Task join error: {}", e);
                        continue;
                    };
                    warn!("Branch {} task failed: {}", labels[index], e);
                    let message = if e.is_panic() {
                        panic_message(e.into_panic())
                    } else {
                        e.to_string()
                    };
                    settled[index] = Some(BranchOutcome::failure(
                        index,
                        labels[index].clone(),
                        ActionError::Fault(message),
                    ));
                }
            }
        }

        check_cancelled(&self.cancellation)?;

        Ok(settled
            .into_iter()
            .enumerate()
            .map(|(index, outcome)| {
                outcome.unwrap_or_else(|| {
                    BranchOutcome::failure(
                        index,
                        labels[index].clone(),
                        ActionError::Fault("branch did not report".to_string()),
                    )
                })
            })
            .collect())
    }

    fn settle<T: IdentityKeyed>(
        &self,
        outcomes: Vec<BranchOutcome<T>>,
        limit: Option<usize>,
    ) -> MergeReport<T> {
        let report = merge_branches(outcomes, limit);

        if report.is_partial() {
            warn!(
                "Returning partial result: {} of {} branches failed",
                report.failed.len(),
                report.branch_count
            );
        }
        info!(
            "Merged {} items from {} branches ({} duplicates dropped, truncated: {})",
            report.items.len(),
            report.succeeded_branches(),
            report.duplicates_dropped,
            report.truncated
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use switchboard_domain::{Page, PageCursor};

    #[derive(Debug, Clone, PartialEq)]
    struct Doc {
        id: String,
        origin: String,
    }

    impl IdentityKeyed for Doc {
        fn identity_key(&self) -> &str {
            &self.id
        }
    }

    fn docs(ids: impl IntoIterator<Item = usize>, origin: &str) -> Vec<Doc> {
        ids.into_iter()
            .map(|i| Doc {
                id: i.to_string(),
                origin: origin.to_string(),
            })
            .collect()
    }

    #[derive(Default)]
    struct Gauge {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    /// Serves `pages[n]` for cursor `"p{n}"` and counts requests
    struct MockSource<T> {
        label: String,
        pages: Vec<Page<T>>,
        error: Option<ActionError>,
        delay: Option<Duration>,
        slow_from: usize,
        gauge: Option<Arc<Gauge>>,
        calls: AtomicUsize,
    }

    impl<T> MockSource<T> {
        fn new(label: &str, pages: Vec<Page<T>>) -> Self {
            Self {
                label: label.to_string(),
                pages,
                error: None,
                delay: None,
                slow_from: 0,
                gauge: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn single(label: &str, items: Vec<T>) -> Self {
            Self::new(label, vec![Page::last(items)])
        }

        fn failing(label: &str, error: ActionError) -> Self {
            let mut source = Self::new(label, Vec::new());
            source.error = Some(error);
            source
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Delay only the calls from the `from`-th one onwards.
        fn with_delay_from(mut self, delay: Duration, from: usize) -> Self {
            self.delay = Some(delay);
            self.slow_from = from;
            self
        }

        fn with_gauge(mut self, gauge: Arc<Gauge>) -> Self {
            self.gauge = Some(gauge);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<T: Clone + Send + Sync> PageSource<T> for MockSource<T> {
        fn label(&self) -> String {
            self.label.clone()
        }

        async fn fetch_page(&self, cursor: Option<&PageCursor>) -> Result<Page<T>, ActionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gauge) = &self.gauge {
                let now = gauge.current.fetch_add(1, Ordering::SeqCst) + 1;
                gauge.peak.fetch_max(now, Ordering::SeqCst);
            }
            if let Some(delay) = self.delay.filter(|_| call >= self.slow_from) {
                tokio::time::sleep(delay).await;
            }
            if let Some(gauge) = &self.gauge {
                gauge.current.fetch_sub(1, Ordering::SeqCst);
            }
            if let Some(error) = &self.error {
                return Err(error.clone());
            }

            let index = cursor
                .and_then(|c| c.as_str().trim_start_matches('p').parse::<usize>().ok())
                .unwrap_or(0);
            Ok(self.pages[index].clone())
        }
    }

    fn three_pages() -> Vec<Page<Doc>> {
        vec![
            Page::with_cursor(docs(0..100, "x"), "p1"),
            Page::with_cursor(docs(100..200, "x"), "p2"),
            Page::last(docs(200..242, "x")),
        ]
    }

    fn engine() -> AggregationEngine {
        AggregationEngine::new(AggregationParams::default())
    }

    fn shard_lister(ids: &[&str]) -> MockSource<SourceDescriptor> {
        MockSource::single(
            "shared drives",
            ids.iter()
                .map(|id| SourceDescriptor::new(*id, format!("Drive {}", id)))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_paginates_until_cursor_absent() {
        let source = MockSource::new("scope", three_pages());

        let items = engine()
            .paginate(&source, &AggregateOptions::new())
            .await
            .unwrap();

        assert_eq!(items.len(), 242);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_branch_stops_early_at_limit() {
        let source = MockSource::new("scope", three_pages());

        let items = engine()
            .paginate(&source, &AggregateOptions::new().with_limit(Some(150)))
            .await
            .unwrap();

        // The branch keeps whole pages; truncation happens in the merge
        assert_eq!(items.len(), 200);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_page_bound_keeps_fetched_items() {
        let source = MockSource::new("scope", three_pages());
        let engine =
            AggregationEngine::new(AggregationParams::default().with_max_pages_per_branch(2));

        let items = engine
            .paginate(&source, &AggregateOptions::new())
            .await
            .unwrap();

        assert_eq!(items.len(), 200);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_filter_counts_toward_early_stop() {
        let source = MockSource::new("scope", three_pages());
        let options = AggregateOptions::new()
            .with_limit(Some(60))
            .with_filter(|d: &Doc| d.id.parse::<usize>().unwrap() % 2 == 0);

        let items = engine().paginate(&source, &options).await.unwrap();

        // 50 even ids on page one is not enough, page two brings it to 100
        assert_eq!(items.len(), 100);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_broad_query_partial_failure() {
        let scopes: Vec<Arc<dyn PageSource<Doc>>> = vec![
            Arc::new(MockSource::single("shared", docs([1, 2], "shared"))),
            Arc::new(MockSource::failing(
                "organization",
                ActionError::upstream("503 from upstream"),
            )),
            Arc::new(MockSource::single("domain", docs([3], "domain"))),
        ];

        let report = engine()
            .broad_query(scopes, AggregateOptions::new())
            .await
            .unwrap();

        let ids: Vec<_> = report.items.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(report.is_partial());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].index, 1);
        assert_eq!(report.failed[0].label, "organization");
        assert!(matches!(report.failed[0].error, ActionError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_broad_query_truncates_after_merge() {
        let scopes: Vec<Arc<dyn PageSource<Doc>>> = vec![
            Arc::new(MockSource::single("a", docs(0..3, "a"))),
            Arc::new(MockSource::single("b", docs(3..6, "b"))),
        ];

        let report = engine()
            .broad_query(scopes, AggregateOptions::new().with_limit(Some(4)))
            .await
            .unwrap();

        let ids: Vec<_> = report.items.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3"]);
        assert!(report.truncated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_order_ignores_completion_order() {
        let scopes: Vec<Arc<dyn PageSource<Doc>>> = vec![
            Arc::new(
                MockSource::single("slow", docs([42], "slow"))
                    .with_delay(Duration::from_millis(500)),
            ),
            Arc::new(MockSource::single("fast", docs([42, 7], "fast"))),
        ];

        let report = engine()
            .broad_query(scopes, AggregateOptions::new())
            .await
            .unwrap();

        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].id, "42");
        assert_eq!(report.items[0].origin, "slow");
        assert_eq!(report.items[1].id, "7");
        assert_eq!(report.duplicates_dropped, 1);
    }

    #[tokio::test]
    async fn test_per_shard_scenario() {
        // Shards [A, B, C]: A yields 2, B fails, C yields 3 with one duplicate of A
        let discovery = shard_lister(&["A", "B", "C"]);
        let shard_a: Arc<dyn PageSource<Doc>> =
            Arc::new(MockSource::single("A", docs([1, 2], "A")));
        let shard_b: Arc<dyn PageSource<Doc>> =
            Arc::new(MockSource::failing("B", ActionError::upstream("boom")));
        let shard_c: Arc<dyn PageSource<Doc>> =
            Arc::new(MockSource::single("C", docs([2, 3, 4], "C")));

        let by_id = move |shard: &SourceDescriptor| match shard.id.as_str() {
            "A" => shard_a.clone(),
            "B" => shard_b.clone(),
            _ => shard_c.clone(),
        };

        let sharded = engine()
            .per_shard(&discovery, Vec::new(), by_id, AggregateOptions::new())
            .await
            .unwrap();

        let report = sharded.report;
        assert_eq!(sharded.shards.len(), 3);
        assert_eq!(report.items.len(), 4);
        let ids: Vec<_> = report.items.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(report.items[1].origin, "A");
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].label, "B");
    }

    #[tokio::test]
    async fn test_leading_branch_precedes_shards() {
        let discovery = shard_lister(&["S1"]);
        let personal: Arc<dyn PageSource<Doc>> =
            Arc::new(MockSource::single("personal", docs([9], "personal")));
        let shard: Arc<dyn PageSource<Doc>> =
            Arc::new(MockSource::single("S1", docs([9, 10], "S1")));

        let sharded = engine()
            .per_shard(
                &discovery,
                vec![personal],
                move |_| shard.clone(),
                AggregateOptions::new(),
            )
            .await
            .unwrap();

        assert_eq!(sharded.report.branch_count, 2);
        assert_eq!(sharded.report.items[0].origin, "personal");
        assert_eq!(sharded.report.items.len(), 2);
    }

    #[tokio::test]
    async fn test_discovery_failure_is_fatal() {
        let discovery: MockSource<SourceDescriptor> =
            MockSource::failing("shared drives", ActionError::upstream("401"));
        let personal = Arc::new(MockSource::single("personal", docs([1], "personal")));
        let leading: Vec<Arc<dyn PageSource<Doc>>> = vec![personal.clone()];

        let result = engine()
            .per_shard(
                &discovery,
                leading,
                |_| -> Arc<dyn PageSource<Doc>> { unreachable!("no shards") },
                AggregateOptions::new(),
            )
            .await;

        assert!(matches!(result, Err(ActionError::Discovery(_))));
        assert_eq!(personal.calls(), 0);
    }

    #[tokio::test]
    async fn test_shard_bound_and_dedup() {
        let discovery = shard_lister(&["A", "A", "B", "C"]);
        let shard = Arc::new(MockSource::single("any", docs([1], "any")));
        let engine = AggregationEngine::new(AggregationParams::default().with_max_shards(2));

        let sharded = {
            let shard = shard.clone();
            engine
                .per_shard(
                    &discovery,
                    Vec::new(),
                    move |_| shard.clone() as Arc<dyn PageSource<Doc>>,
                    AggregateOptions::new(),
                )
                .await
                .unwrap()
        };

        let ids: Vec<_> = sharded.shards.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(shard.calls(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let source = Arc::new(MockSource::single("scope", docs([1], "scope")));
        let scopes: Vec<Arc<dyn PageSource<Doc>>> = vec![source.clone()];

        let result = engine()
            .with_cancellation(token)
            .broad_query(scopes, AggregateOptions::new())
            .await;

        assert_eq!(result.unwrap_err(), ActionError::Cancelled);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_aborts_in_flight_branches() {
        let token = CancellationToken::new();
        let scopes: Vec<Arc<dyn PageSource<Doc>>> = vec![Arc::new(
            MockSource::single("slow", docs([1], "slow")).with_delay(Duration::from_secs(30)),
        )];

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = engine()
            .with_cancellation(token)
            .broad_query(scopes, AggregateOptions::new())
            .await;

        assert_eq!(result.unwrap_err(), ActionError::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fails_only_slow_branches() {
        let scopes: Vec<Arc<dyn PageSource<Doc>>> = vec![
            Arc::new(MockSource::single("fast", docs([1], "fast"))),
            Arc::new(
                MockSource::single("slow", docs([2], "slow")).with_delay(Duration::from_secs(10)),
            ),
        ];
        let engine = AggregationEngine::new(
            AggregationParams::default().with_deadline(Some(Duration::from_millis(50))),
        );

        let report = engine
            .broad_query(scopes, AggregateOptions::new())
            .await
            .unwrap();

        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].id, "1");
        assert!(matches!(
            report.failed[0].error,
            ActionError::DeadlineExceeded(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_keeps_pages_already_fetched() {
        let scopes: Vec<Arc<dyn PageSource<Doc>>> = vec![Arc::new(
            MockSource::new("paged", three_pages()).with_delay_from(Duration::from_secs(10), 1),
        )];
        let engine = AggregationEngine::new(
            AggregationParams::default().with_deadline(Some(Duration::from_millis(50))),
        );

        let report = engine
            .broad_query(scopes, AggregateOptions::new())
            .await
            .unwrap();

        assert_eq!(report.items.len(), 100);
        assert!(!report.is_partial());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_bound() {
        let gauge = Arc::new(Gauge::default());
        let scopes: Vec<Arc<dyn PageSource<Doc>>> = (0..5)
            .map(|i| -> Arc<dyn PageSource<Doc>> {
                Arc::new(
                    MockSource::single(&format!("s{}", i), docs([i], "s"))
                        .with_delay(Duration::from_millis(20))
                        .with_gauge(gauge.clone()),
                )
            })
            .collect();
        let engine =
            AggregationEngine::new(AggregationParams::default().with_max_concurrent_branches(2));

        let report = engine
            .broad_query(scopes, AggregateOptions::new())
            .await
            .unwrap();

        assert_eq!(report.items.len(), 5);
        assert!(gauge.peak.load(Ordering::SeqCst) <= 2);
    }
}
