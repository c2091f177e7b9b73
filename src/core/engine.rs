use crate::config::{FiltersConfig, SyncConfig};
use crate::core::candidates::{derive_candidates, CandidateSet};
use crate::core::notifier::Notifier;
use crate::core::progress::{JobCounter, JobGuard};
use crate::core::reconcile::{PassState, ReconcilePolicy, Reconciler};
use crate::domain::model::{Candidate, PassSummary};
use crate::domain::ports::{CatalogClient, ClassificationStore, LibraryInventory, LogSink};
use crate::utils::error::{Result, SyncError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs synchronization passes: one concurrent job per candidate, joined
/// before the pass reports completion.
pub struct SyncEngine {
    client: Arc<dyn CatalogClient>,
    store: Arc<dyn ClassificationStore>,
    sink: Arc<dyn LogSink>,
    filters: FiltersConfig,
    policy: ReconcilePolicy,
    notifier: Notifier,
    concurrent_requests: usize,
    job_delay: Duration,
}

/// Everything a job needs, shared by all jobs of one pass.
struct JobContext {
    client: Arc<dyn CatalogClient>,
    store: Arc<dyn ClassificationStore>,
    sink: Arc<dyn LogSink>,
    policy: ReconcilePolicy,
    notifier: Notifier,
    state: PassState,
    counter: JobCounter,
    permits: Semaphore,
    job_delay: Duration,
}

impl SyncEngine {
    pub fn new(
        config: &SyncConfig,
        client: Arc<dyn CatalogClient>,
        store: Arc<dyn ClassificationStore>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            client,
            store,
            sink,
            filters: config.filters.clone(),
            policy: ReconcilePolicy::from_filters(&config.filters),
            notifier: Notifier::new(config.notification_format()),
            concurrent_requests: config.sync.concurrent_requests.max(1),
            job_delay: Duration::from_millis(config.sync.job_delay_ms),
        }
    }

    pub fn candidates(&self, inventory: &dyn LibraryInventory) -> Result<CandidateSet> {
        let items = inventory.items()?;
        Ok(derive_candidates(&items, &self.filters))
    }

    /// Derives candidates from the library and runs one pass over them.
    pub async fn run(&self, inventory: &dyn LibraryInventory) -> Result<PassSummary> {
        let candidates = self.candidates(inventory)?;
        self.run_pass(candidates).await
    }

    /// Returns the first classification store error any job hit, after every
    /// job has finished; remote failures only show up in the summary.
    pub async fn run_pass(&self, candidates: CandidateSet) -> Result<PassSummary> {
        let total = candidates.len();
        tracing::info!(
            "🔍 Checking for new entries: {} artists, {} creators",
            candidates.artists.len(),
            candidates.creators.len()
        );

        let ctx = Arc::new(JobContext {
            client: Arc::clone(&self.client),
            store: Arc::clone(&self.store),
            sink: Arc::clone(&self.sink),
            policy: self.policy.clone(),
            notifier: self.notifier.clone(),
            state: PassState::default(),
            counter: JobCounter::new(total),
            permits: Semaphore::new(self.concurrent_requests),
            job_delay: self.job_delay,
        });

        let mut jobs = JoinSet::new();
        for candidate in candidates.into_candidates() {
            let ctx = Arc::clone(&ctx);
            jobs.spawn(run_job(ctx, candidate));
        }

        let mut summary = PassSummary {
            candidates: total,
            ..PassSummary::default()
        };
        let mut first_error = None;

        while let Some(joined) = jobs.join_next().await {
            match joined {
                Ok(Ok(outcome)) => summary.absorb(&outcome),
                Ok(Err(e)) => {
                    summary.failed += 1;
                    self.sink.error(&format!("Candidate job aborted: {}", e));
                    first_error.get_or_insert(e);
                }
                Err(join_error) => {
                    summary.failed += 1;
                    let e = SyncError::TaskFailed {
                        message: join_error.to_string(),
                    };
                    self.sink.error(&e.to_string());
                    first_error.get_or_insert(e);
                }
            }
        }

        if ctx.counter.try_complete() {
            self.sink.complete(&summary);
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }
}

fn finish(ctx: &JobContext, guard: JobGuard<'_>) {
    if guard.finish() {
        tracing::debug!("All {} candidate jobs finished", ctx.counter.total());
    } else {
        tracing::debug!("{} candidate jobs remaining", ctx.counter.remaining());
    }
}

async fn run_job(ctx: Arc<JobContext>, candidate: Candidate) -> Result<PassSummary> {
    let guard = ctx.counter.guard();
    let mut outcome = PassSummary::default();

    let _permit = ctx
        .permits
        .acquire()
        .await
        .map_err(|e| SyncError::TaskFailed {
            message: e.to_string(),
        })?;

    let remote_id = match ctx
        .client
        .resolve_id(&candidate.name, candidate.query_type)
        .await
    {
        Ok(Some(id)) => id,
        Ok(None) => {
            tracing::debug!("No remote match for {} '{}'", candidate.query_type, candidate.name);
            outcome.unmatched = 1;
            finish(&ctx, guard);
            return Ok(outcome);
        }
        Err(e) => {
            ctx.sink.error(&format!(
                "Could not look up {} '{}': {}",
                candidate.query_type, candidate.name, e
            ));
            outcome.failed = 1;
            finish(&ctx, guard);
            return Ok(outcome);
        }
    };

    let entries = match ctx
        .client
        .fetch_entries(remote_id, candidate.query_type)
        .await
    {
        Ok(entries) => entries,
        Err(e) => {
            ctx.sink.error(&format!(
                "Something went wrong fetching entries for {} '{}': {}",
                candidate.query_type, candidate.name, e
            ));
            outcome.failed = 1;
            Vec::new()
        }
    };
    outcome.entries_fetched = entries.len();

    // Store access is synchronous SQLite, so it runs off the async workers.
    let job_ctx = Arc::clone(&ctx);
    let reconciled = tokio::task::spawn_blocking(move || {
        Reconciler {
            policy: &job_ctx.policy,
            store: job_ctx.store.as_ref(),
            notifier: &job_ctx.notifier,
            sink: job_ctx.sink.as_ref(),
            state: &job_ctx.state,
        }
        .reconcile(&entries)
    })
    .await
    .map_err(|e| SyncError::TaskFailed {
        message: e.to_string(),
    })??;

    tracing::debug!(
        "{} '{}': {} fetched, {} announced, {} already handled",
        candidate.query_type,
        candidate.name,
        outcome.entries_fetched,
        reconciled.announced,
        reconciled.already_handled
    );
    outcome.announced = reconciled.announced;
    outcome.refreshed = reconciled.refreshed;

    finish(&ctx, guard);

    if !ctx.job_delay.is_zero() {
        tokio::time::sleep(ctx.job_delay).await;
    }

    Ok(outcome)
}
