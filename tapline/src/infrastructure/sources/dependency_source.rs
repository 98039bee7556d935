// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Wraps an inner source with a dependency precondition (spec §4.2): while
//! the dependency reports unavailable, the wrapped source stays quiescent;
//! `BeforeDependencyAvailable`/`AfterDependencyAvailable` hooks fire exactly
//! once on each transition.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use tapline_domain::entities::{Dependency, DependencyState, Envelope};
use tapline_domain::error::AgentResult;
use tapline_domain::ports::Source;

type Hook = Box<dyn Fn() + Send + Sync>;

pub struct DependencySource {
    name: String,
    inner: Arc<dyn Source>,
    dependency: Arc<dyn Dependency>,
    poll_interval: Duration,
    state: Mutex<DependencyState>,
    before_dependency_available: Option<Hook>,
    after_dependency_available: Option<Hook>,
}

impl DependencySource {
    pub fn new(name: impl Into<String>, inner: Arc<dyn Source>, dependency: Arc<dyn Dependency>) -> Self {
        Self {
            name: name.into(),
            inner,
            dependency,
            poll_interval: Duration::from_secs(60),
            state: Mutex::new(DependencyState::Unknown),
            before_dependency_available: None,
            after_dependency_available: None,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_before_dependency_available(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.before_dependency_available = Some(Box::new(hook));
        self
    }

    pub fn with_after_dependency_available(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.after_dependency_available = Some(Box::new(hook));
        self
    }

    async fn probe(&self) -> bool {
        match self.dependency.is_dependency_available().await {
            Ok(available) => available,
            Err(err) => {
                tracing::warn!(source = %self.name, dependency = %self.dependency.name(), error = %err, "dependency probe failed, treating as unavailable");
                false
            }
        }
    }

    fn transition(&self, available: bool) -> (DependencyState, DependencyState) {
        let mut state = self.state.lock().expect("dependency state mutex poisoned");
        let previous = *state;
        let next = previous.on_probe_result(available);
        *state = next;
        (previous, next)
    }
}

#[async_trait]
impl Source for DependencySource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&self) -> AgentResult<Vec<Envelope<String>>> {
        let available = self.probe().await;
        let (previous, next) = self.transition(available);

        if previous.is_available() && !next.is_available() {
            if let Some(hook) = &self.before_dependency_available {
                hook();
            }
        }
        if !previous.is_available() && next.is_available() {
            tracing::info!(source = %self.name, dependency = %self.dependency.name(), "dependency recovered");
            if let Some(hook) = &self.after_dependency_available {
                hook();
            }
        }

        if !next.is_available() {
            tracing::warn!(source = %self.name, dependency = %self.dependency.name(), "dependency unavailable, source quiescent");
            tokio::time::sleep(self.poll_interval).await;
            return Ok(Vec::new());
        }

        self.inner.poll().await
    }
}
