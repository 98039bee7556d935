use async_trait::async_trait;

use crate::entities::Envelope;
use crate::error::AgentResult;

/// A pluggable destination for records (spec §4.3). A batch either ships
/// entirely or fails entirely — partial-batch semantics, if a concrete sink
/// needs them, are that sink's problem to retry, not this trait's.
#[async_trait]
pub trait Sink: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, records: &[Envelope<String>]) -> AgentResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FlakySink {
        should_fail: AtomicBool,
    }

    #[async_trait]
    impl Sink for FlakySink {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn send(&self, records: &[Envelope<String>]) -> AgentResult<()> {
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(AgentError::TransientTransport("endpoint unreachable".to_string()));
            }
            assert!(!records.is_empty());
            Ok(())
        }
    }

    #[tokio::test]
    async fn send_surfaces_transient_transport_errors() {
        let sink = FlakySink {
            should_fail: AtomicBool::new(true),
        };
        let batch = vec![Envelope::new(Utc::now(), "hi".to_string())];
        assert!(matches!(sink.send(&batch).await, Err(AgentError::TransientTransport(_))));
    }
}
