use async_trait::async_trait;

use crate::entities::Envelope;
use crate::error::AgentResult;

/// A pluggable source of records (spec §4.1/§4.2). Infrastructure adapters
/// (directory tailers, dependency-gated wrappers, ...) implement this;
/// the application layer only ever talks to the trait object.
#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &str;

    /// Pulls whatever records are currently available without blocking
    /// indefinitely. Returning an empty vector is normal — it means the
    /// source has nothing new, not that it failed.
    async fn poll(&self) -> AgentResult<Vec<Envelope<String>>>;
}
