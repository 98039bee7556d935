// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Regional failover sink (spec §4.3): routes to the best available
//! regional client, degrading to a secondary under error pressure and
//! recovering to the primary once it returns.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use tapline_domain::entities::Envelope;
use tapline_domain::error::{AgentError, AgentResult};
use tapline_domain::ports::{FailoverDecision, RegionalFailoverStrategy, Sink};

/// A region a failover strategy can select (spec §4.3:
/// `GetCurrentRegion()` returning a descriptor with a human-readable name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDescriptor {
    pub system_name: String,
    pub endpoint: Option<String>,
}

/// The concrete transport a region resolves to. Infrastructure adapters for
/// a particular cloud endpoint implement this; the sink only ever calls
/// `send`.
#[async_trait]
pub trait RegionClient: Send + Sync {
    fn region(&self) -> RegionDescriptor;
    async fn send(&self, records: &[Envelope<String>]) -> AgentResult<()>;
}

/// Supplies primary/secondary region clients to the failover sink (spec
/// §4.3's strategy contract). A health-check shape is intentionally not
/// modeled here: the sink only asks for a client when it has already
/// decided to switch, it never probes speculatively.
pub trait RegionClientProvider: Send + Sync {
    fn primary(&self) -> Option<std::sync::Arc<dyn RegionClient>>;
    fn secondary(&self) -> Option<std::sync::Arc<dyn RegionClient>>;
}

/// Logs each batch at `info` level instead of shipping it anywhere. Used as
/// the default region client until a real cloud transport is configured, the
/// same role the teacher's `ConsoleLogger` plays for bootstrap logging.
pub struct LoggingRegionClient {
    descriptor: RegionDescriptor,
}

impl LoggingRegionClient {
    pub fn new(system_name: impl Into<String>, endpoint: Option<String>) -> Self {
        Self {
            descriptor: RegionDescriptor {
                system_name: system_name.into(),
                endpoint,
            },
        }
    }
}

#[async_trait]
impl RegionClient for LoggingRegionClient {
    fn region(&self) -> RegionDescriptor {
        self.descriptor.clone()
    }

    async fn send(&self, records: &[Envelope<String>]) -> AgentResult<()> {
        for record in records {
            tracing::info!(region = %self.descriptor.system_name, record = %record.data(), "delivered record");
        }
        Ok(())
    }
}

pub struct FailoverSink {
    name: String,
    provider: Box<dyn RegionClientProvider>,
    strategy: Mutex<RegionalFailoverStrategy>,
    current: Mutex<Option<std::sync::Arc<dyn RegionClient>>>,
}

impl FailoverSink {
    /// Rejects construction with `AgentError::Configuration` when either
    /// threshold is non-positive (spec §4.3/§6: both options are required
    /// and must validate as positive).
    pub fn new(
        name: impl Into<String>,
        provider: Box<dyn RegionClientProvider>,
        max_consecutive_errors: u32,
        max_failover_interval: chrono::Duration,
    ) -> AgentResult<Self> {
        let name = name.into();
        if max_consecutive_errors == 0 {
            return Err(AgentError::Configuration(format!(
                "sink '{name}': MAX_ERRORS_COUNT_BEFORE_FAILOVER must be a positive integer"
            )));
        }
        if max_failover_interval <= chrono::Duration::zero() {
            return Err(AgentError::Configuration(format!(
                "sink '{name}': MAX_FAILOVER_INTERVAL_IN_MINUTES must be a positive integer"
            )));
        }
        let primary = provider.primary();
        Ok(Self {
            name,
            provider,
            strategy: Mutex::new(RegionalFailoverStrategy::new(max_consecutive_errors, max_failover_interval)),
            current: Mutex::new(primary),
        })
    }

    fn on_failure(&self) {
        let decision = self.strategy.lock().record_failure(Utc::now());
        if decision == FailoverDecision::UseFailover {
            match self.provider.secondary() {
                Some(secondary) => {
                    tracing::info!(sink = %self.name, region = %secondary.region().system_name, "failing over to secondary region");
                    *self.current.lock() = Some(secondary);
                }
                None => {
                    tracing::error!(sink = %self.name, "failover triggered but no secondary region client is available");
                }
            }
        }
    }

    fn on_success(&self) {
        let decision = self.strategy.lock().record_success(Utc::now());
        if decision == FailoverDecision::Failback {
            match self.provider.primary() {
                Some(primary) => {
                    tracing::info!(sink = %self.name, region = %primary.region().system_name, "failed back to primary region");
                    *self.current.lock() = Some(primary);
                }
                None => {
                    tracing::debug!(sink = %self.name, "failback requested but primary region is still unavailable");
                }
            }
        }
    }
}

#[async_trait]
impl Sink for FailoverSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, records: &[Envelope<String>]) -> AgentResult<()> {
        let client = self.current.lock().clone();
        let Some(client) = client else {
            return Err(tapline_domain::error::AgentError::FatalTransport(format!(
                "sink '{}' has no region client available",
                self.name
            )));
        };

        match client.send(records).await {
            Ok(()) => {
                self.on_success();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(sink = %self.name, error = %err, "send failed");
                self.on_failure();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct FlakyClient {
        name: &'static str,
        should_fail: bool,
    }

    #[async_trait]
    impl RegionClient for FlakyClient {
        fn region(&self) -> RegionDescriptor {
            RegionDescriptor {
                system_name: self.name.to_string(),
                endpoint: None,
            }
        }
        async fn send(&self, _records: &[Envelope<String>]) -> AgentResult<()> {
            if self.should_fail {
                Err(tapline_domain::error::AgentError::TransientTransport("down".into()))
            } else {
                Ok(())
            }
        }
    }

    struct StaticProvider {
        primary_fails: AtomicBool,
    }

    impl RegionClientProvider for StaticProvider {
        fn primary(&self) -> Option<Arc<dyn RegionClient>> {
            Some(Arc::new(FlakyClient {
                name: "us-east-1",
                should_fail: self.primary_fails.load(Ordering::SeqCst),
            }))
        }
        fn secondary(&self) -> Option<Arc<dyn RegionClient>> {
            Some(Arc::new(FlakyClient {
                name: "us-west-2",
                should_fail: false,
            }))
        }
    }

    fn envelopes() -> Vec<Envelope<String>> {
        vec![Envelope::new(Utc::now(), "x".to_string())]
    }

    #[tokio::test]
    async fn fails_over_to_secondary_after_consecutive_errors_then_fails_back() {
        let provider = StaticProvider {
            primary_fails: AtomicBool::new(true),
        };
        let sink = FailoverSink::new("fo", Box::new(provider), 2, chrono::Duration::hours(1)).unwrap();

        assert!(sink.send(&envelopes()).await.is_err());
        assert!(sink.send(&envelopes()).await.is_err());

        // Strategy has failed over; the sink's current client is now the
        // secondary, whose sends succeed regardless of the primary's state.
        assert!(sink.send(&envelopes()).await.is_ok());
    }

    #[test]
    fn rejects_zero_max_consecutive_errors() {
        let provider = StaticProvider {
            primary_fails: AtomicBool::new(false),
        };
        let result = FailoverSink::new("fo", Box::new(provider), 0, chrono::Duration::hours(1));
        assert!(matches!(result, Err(AgentError::Configuration(_))));
    }

    #[test]
    fn rejects_non_positive_max_failover_interval() {
        let provider = StaticProvider {
            primary_fails: AtomicBool::new(false),
        };
        let result = FailoverSink::new("fo", Box::new(provider), 2, chrono::Duration::zero());
        assert!(matches!(result, Err(AgentError::Configuration(_))));
    }
}
