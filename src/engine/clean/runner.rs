use tracing::{info, warn};

use crate::engine::clean::executor::CleanExecutor;
use crate::engine::clean::lifecycle::CleanLifecycle;
use crate::engine::clean::metadata::CleanMetadata;
use crate::engine::clean::plan::CleanPlan;
use crate::engine::clean::planner;
use crate::engine::clean::policy::{RetentionPolicy, earliest_retained_commit};
use crate::engine::errors::CleanError;
use crate::engine::inventory::build_inventory;
use crate::engine::table::TableContext;
use crate::engine::timeline::{Instant, InstantState};
use crate::shared::config::model::CleanerConfig;

/// End-to-end clean invocation over one table snapshot.
///
/// Planning and publication are single-threaded; only the executor fans out.
/// A leftover requested/inflight clean from an interrupted run is resumed
/// from its persisted plan instead of starting a new one. Deletions are
/// idempotent, so re-running the same plan is safe.
pub struct CleanRunner {
    ctx: TableContext,
    policy: RetentionPolicy,
    max_concurrency: usize,
}

impl CleanRunner {
    pub fn new(ctx: TableContext, policy: RetentionPolicy, max_concurrency: usize) -> Self {
        Self {
            ctx,
            policy,
            max_concurrency,
        }
    }

    /// Build a runner from loaded cleaner configuration; malformed policy
    /// settings fail here, before any deletion.
    pub fn from_config(ctx: TableContext, cfg: &CleanerConfig) -> Result<Self, CleanError> {
        let policy = RetentionPolicy::from_config(cfg)?;
        Ok(Self::new(ctx, policy, cfg.max_concurrency))
    }

    pub async fn run(&self) -> Result<CleanMetadata, CleanError> {
        if let Some(pending) = self.ctx.timeline().pending_clean() {
            let pending = pending.clone();
            return self.resume(pending).await;
        }
        self.run_fresh().await
    }

    async fn run_fresh(&self) -> Result<CleanMetadata, CleanError> {
        let plan = self.build_plan()?;

        let lifecycle = CleanLifecycle::new(self.ctx.root());
        let requested = lifecycle.begin(self.ctx.timeline(), &plan)?;
        let inflight = lifecycle.mark_inflight(requested)?;

        // A fatal executor error leaves the instant inflight on disk; the
        // next run picks it up and resumes.
        let executor = CleanExecutor::new(self.ctx.root(), self.max_concurrency);
        let metadata = executor.execute(&plan).await?;

        lifecycle.complete(inflight, &metadata)?;
        Ok(metadata)
    }

    async fn resume(&self, pending: Instant) -> Result<CleanMetadata, CleanError> {
        warn!(
            target: "clean_runner::resume",
            instant = %pending,
            "Resuming interrupted clean"
        );

        let lifecycle = CleanLifecycle::new(self.ctx.root());
        let plan = match lifecycle.requested_plan(&pending.timestamp) {
            Ok(plan) => plan,
            // A crash between the marker reservation and the payload write
            // leaves an empty requested artifact. Re-plan from the current
            // snapshot rather than leaving the lease held forever.
            Err(CleanError::Json(_)) if pending.state == InstantState::Requested => {
                warn!(
                    target: "clean_runner::resume",
                    instant = %pending,
                    "Requested artifact has no readable plan, replanning"
                );
                let plan = self.build_plan()?;
                lifecycle.republish_plan(&pending, &plan)?;
                plan
            }
            Err(e) => return Err(e),
        };

        let inflight = match pending.state {
            InstantState::Requested => lifecycle.mark_inflight(pending)?,
            InstantState::Inflight => pending,
            InstantState::Completed => {
                return Err(CleanError::IllegalTransition {
                    from: pending.marker_name(),
                    to: InstantState::Inflight.as_str().to_string(),
                });
            }
        };

        let executor = CleanExecutor::new(self.ctx.root(), self.max_concurrency);
        let metadata = executor.execute(&plan).await?;
        let completed = lifecycle.complete(inflight, &metadata)?;

        info!(
            target: "clean_runner::resume",
            instant = %completed,
            "Resumed clean completed"
        );
        Ok(metadata)
    }

    fn build_plan(&self) -> Result<CleanPlan, CleanError> {
        let partitions = self.ctx.partitions()?;
        let inventory = build_inventory(&self.ctx, &partitions)?;
        let earliest = earliest_retained_commit(self.ctx.timeline(), &self.policy)?;
        Ok(planner::plan(&inventory, earliest.as_deref(), &self.policy))
    }
}
