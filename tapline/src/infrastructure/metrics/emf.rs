// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Wires a `MetricScope` (spec §4.8) into the sink pipeline: each scope is
//! serialized to its EMF JSON envelope and delivered as one record.

use chrono::{TimeZone, Utc};
use std::sync::Arc;

use tapline_domain::entities::{Envelope, MetricScope};
use tapline_domain::error::AgentResult;
use tapline_domain::ports::Sink;

pub struct EmfSink {
    inner: Arc<dyn Sink>,
}

impl EmfSink {
    pub fn new(inner: Arc<dyn Sink>) -> Self {
        Self { inner }
    }

    pub async fn emit(&self, scope: &MetricScope) -> AgentResult<()> {
        let json = scope.to_emf_json();
        let timestamp = Utc
            .timestamp_millis_opt(scope.epoch_millis())
            .single()
            .unwrap_or_else(Utc::now);
        let envelope = Envelope::new(timestamp, json.to_string());
        self.inner.send(&[envelope]).await
    }
}
