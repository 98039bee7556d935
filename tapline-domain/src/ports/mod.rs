mod failover;
mod sink;
mod source;

pub use failover::{FailoverDecision, RegionalFailoverStrategy};
pub use sink::Sink;
pub use source::Source;
