// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

mod failover_sink;

pub use failover_sink::{FailoverSink, LoggingRegionClient, RegionClient, RegionClientProvider, RegionDescriptor};
