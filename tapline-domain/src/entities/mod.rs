mod credentials;
mod delimited_log_context;
mod dependency;
mod envelope;
mod metric_scope;
mod record;
mod throttle;

pub use credentials::{Credentials, CredentialsRefreshState};
pub use delimited_log_context::DelimitedLogContext;
pub use dependency::{Dependency, DependencyState};
pub use envelope::Envelope;
pub use metric_scope::{CloudWatchMetric, MetricScope, MetricUnit, MetricValueDef};
pub use record::{DelimitedRecord, Record};
pub use throttle::Throttle;
