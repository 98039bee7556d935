// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

mod emf;
mod prometheus_service;

pub use emf::EmfSink;
pub use prometheus_service::PrometheusMetrics;
