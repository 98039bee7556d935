// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Adapters: concrete sources, sinks, credential providers, and the
//! internal/cloud metrics surfaces, plus the catalogs that turn config
//! entries into live components.

pub mod credentials;
pub mod factories;
pub mod metrics;
pub mod sinks;
pub mod sources;

pub use factories::{SinkCatalog, SourceCatalog};
