// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! The agent lifecycle manager (spec §4.1, §8): brings the configured
//! pipeline up and down under a bounded time budget, isolating slow or
//! misbehaving components so one bad actor never blocks the others or the
//! hosting service control manager.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use tapline_domain::error::AgentResult;

pub const SERVICE_NAME: &str = "tapline-agent";
pub const MAXIMUM_SERVICE_OPERATION_DURATION: Duration = Duration::from_secs(30);

/// Something the lifecycle manager brings up and down. Production
/// components (`PipelineRunner` in `pipeline.rs`) wrap a `Source`/`Sink`
/// pair; tests use bare doubles with parameterized delays (spec §9: "the
/// test surface is the lifecycle manager").
#[async_trait]
pub trait ManagedComponent: Send + Sync {
    fn name(&self) -> &str;
    async fn start(&self) -> AgentResult<()>;
    async fn stop(&self) -> AgentResult<()>;
}

/// A one-shot, race-free completion signal (same shape as
/// `tapline_bootstrap::shutdown::CancellationToken`, but for "this phase
/// finished" rather than "please cancel").
#[derive(Clone, Default)]
struct CompletionSignal {
    completed: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CompletionSignal {
    fn complete(&self) {
        self.completed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    async fn wait(&self) {
        if self.completed.load(Ordering::SeqCst) {
            return;
        }
        self.notify.notified().await;
    }
}

pub struct AgentLifecycleManager {
    service_name: String,
    max_operation_duration: Duration,
    sources: Vec<Arc<dyn ManagedComponent>>,
    sinks: Vec<Arc<dyn ManagedComponent>>,
    start_completed: CompletionSignal,
    stop_completed: CompletionSignal,
}

impl AgentLifecycleManager {
    pub fn new(sources: Vec<Arc<dyn ManagedComponent>>, sinks: Vec<Arc<dyn ManagedComponent>>) -> Self {
        Self::with_budget(SERVICE_NAME, MAXIMUM_SERVICE_OPERATION_DURATION, sources, sinks)
    }

    pub fn with_budget(
        service_name: impl Into<String>,
        max_operation_duration: Duration,
        sources: Vec<Arc<dyn ManagedComponent>>,
        sinks: Vec<Arc<dyn ManagedComponent>>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            max_operation_duration,
            sources,
            sinks,
            start_completed: CompletionSignal::default(),
            stop_completed: CompletionSignal::default(),
        }
    }

    pub async fn wait_for_start_completed(&self) {
        self.start_completed.wait().await
    }

    pub async fn wait_for_stop_completed(&self) {
        self.stop_completed.wait().await
    }

    /// Starts every sink then every source concurrently (spec §4.1 step 1-2
    /// order sinks before sources only for factory/instantiation, but start
    /// itself fans both groups out together), isolating failures so one
    /// component can never block or abort another. Returns once either all
    /// components finished or the budget elapsed; `StartCompleted` fires
    /// either way.
    pub async fn start(&self) {
        let all: Vec<Arc<dyn ManagedComponent>> =
            self.sinks.iter().chain(self.sources.iter()).cloned().collect();

        let started = run_isolated(&all, |c| async move { c.start().await });
        if tokio::time::timeout(self.max_operation_duration, started).await.is_err() {
            tracing::warn!(
                "{} took longer than {:?} to start.",
                self.service_name,
                self.max_operation_duration
            );
        }
        self.start_completed.complete();
    }

    /// Stops every source, then every sink (spec §4.1 step 4: sources drain
    /// before the sinks they feed stop), each phase isolated and bounded by
    /// the remaining budget.
    pub async fn stop(&self) {
        let deadline = tokio::time::Instant::now() + self.max_operation_duration;
        let mut within_budget = true;

        let sources_done = run_isolated(&self.sources, |c| async move { c.stop().await });
        if tokio::time::timeout_at(deadline, sources_done).await.is_err() {
            within_budget = false;
        }

        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        let sinks_done = run_isolated(&self.sinks, |c| async move { c.stop().await });
        if tokio::time::timeout(remaining, sinks_done).await.is_err() {
            within_budget = false;
        }

        if !within_budget {
            tracing::warn!(
                "{} could not shut down all components within the maximum service stop interval.",
                self.service_name
            );
        }
        self.stop_completed.complete();
    }
}

/// Runs `op` over every component concurrently; a component that errors is
/// logged and otherwise ignored, never allowed to abort the others (spec
/// §4.1 step 2, §7: "log-and-swallow at the lifecycle boundary").
async fn run_isolated<F, Fut>(components: &[Arc<dyn ManagedComponent>], op: F)
where
    F: Fn(Arc<dyn ManagedComponent>) -> Fut,
    Fut: std::future::Future<Output = AgentResult<()>>,
{
    let futures = components.iter().cloned().map(|c| {
        let op_result = op(Arc::clone(&c));
        async move {
            if let Err(err) = op_result.await {
                tracing::error!(component = %c.name(), error = %err, "component operation failed");
            }
        }
    });
    futures::future::join_all(futures).await;
}
