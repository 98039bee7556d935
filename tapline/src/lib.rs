// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Runtime layer: turns a loaded [`config::AgentConfig`] into a running
//! agent. `main.rs` is thin; this crate owns the wiring between
//! configuration, the factory catalogs, and the lifecycle manager.

pub mod application;
pub mod config;
pub mod infrastructure;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tapline_domain::error::{AgentError, AgentResult};
use tapline_domain::expression::{register_builtins, FunctionBinder};
use tapline_domain::parsing::{exchange_parser, uls_parser};

use application::{AgentLifecycleManager, ManagedComponent, PipelineRunner};
use config::{AgentConfig, ComponentConfig};
use infrastructure::sinks::{FailoverSink, LoggingRegionClient, RegionClientProvider};
use infrastructure::sources::{DependencySource, DirectorySource, NetworkStatus};
use infrastructure::{SinkCatalog, SourceCatalog};

/// Primary/secondary region clients built straight from a sink's own
/// configuration (spec §4.3) rather than probed at runtime — see
/// [`RegionClientProvider`]'s doc comment for why.
struct StaticRegionClientProvider {
    primary: Arc<LoggingRegionClient>,
    secondary: Option<Arc<LoggingRegionClient>>,
}

impl RegionClientProvider for StaticRegionClientProvider {
    fn primary(&self) -> Option<Arc<dyn infrastructure::sinks::RegionClient>> {
        Some(self.primary.clone())
    }
    fn secondary(&self) -> Option<Arc<dyn infrastructure::sinks::RegionClient>> {
        self.secondary.clone().map(|s| s as Arc<dyn infrastructure::sinks::RegionClient>)
    }
}

fn default_source_catalog() -> SourceCatalog {
    let mut catalog = SourceCatalog::new();

    catalog.register(
        "directorysource",
        Box::new(|cfg: &ComponentConfig| {
            let directory = cfg.option_str("Directory").ok_or_else(|| {
                AgentError::Configuration(format!("source '{}' is missing required option 'Directory'", cfg.id))
            })?;
            let format = cfg.option_str("Format").unwrap_or("uls");
            let parser = match format {
                "exchange" => exchange_parser(None),
                _ => uls_parser(None),
            };
            let source: Arc<dyn tapline_domain::ports::Source> =
                Arc::new(DirectorySource::new(cfg.id.clone(), PathBuf::from(directory), parser));
            Ok(source)
        }),
    );

    catalog
}

fn default_sink_catalog() -> SinkCatalog {
    let mut catalog = SinkCatalog::new();

    catalog.register(
        "regionalfailoversink",
        Box::new(|cfg: &ComponentConfig| {
            let primary_region = cfg.option_str("PrimaryRegion").unwrap_or("primary").to_string();
            let secondary_region = cfg.option_str("SecondaryRegion").map(|s| s.to_string());
            let max_consecutive_errors = cfg.option_u64("MAX_ERRORS_COUNT_BEFORE_FAILOVER").ok_or_else(|| {
                AgentError::Configuration(format!(
                    "sink '{}' is missing required option 'MAX_ERRORS_COUNT_BEFORE_FAILOVER'",
                    cfg.id
                ))
            })? as u32;
            let max_failover_interval_minutes = cfg.option_u64("MAX_FAILOVER_INTERVAL_IN_MINUTES").ok_or_else(|| {
                AgentError::Configuration(format!(
                    "sink '{}' is missing required option 'MAX_FAILOVER_INTERVAL_IN_MINUTES'",
                    cfg.id
                ))
            })? as i64;

            let provider = StaticRegionClientProvider {
                primary: Arc::new(LoggingRegionClient::new(primary_region, None)),
                secondary: secondary_region.map(|r| Arc::new(LoggingRegionClient::new(r, None))),
            };
            let sink: Arc<dyn tapline_domain::ports::Sink> = Arc::new(FailoverSink::new(
                cfg.id.clone(),
                Box::new(provider),
                max_consecutive_errors,
                chrono::Duration::minutes(max_failover_interval_minutes),
            )?);
            Ok(sink)
        }),
    );

    catalog
}

/// Builds every `ManagedComponent` the configured pipes describe: each pipe
/// resolves its source and sink ids against the catalogs, optionally wraps
/// the source in a [`DependencySource`] gated on network reachability when
/// `RequiresNetwork = true`, and wraps both in a `PipelineRunner`.
pub fn build_pipeline_components(config: &AgentConfig) -> AgentResult<Vec<Arc<dyn ManagedComponent>>> {
    build_pipeline_components_with_catalogs(config, &default_source_catalog(), &default_sink_catalog())
}

pub fn build_pipeline_components_with_catalogs(
    config: &AgentConfig,
    sources: &SourceCatalog,
    sinks: &SinkCatalog,
) -> AgentResult<Vec<Arc<dyn ManagedComponent>>> {
    let mut binder = FunctionBinder::new();
    register_builtins(&mut binder);
    let binder = Arc::new(binder);

    let source_configs: HashMap<&str, &ComponentConfig> =
        config.sources.iter().map(|c| (c.id.as_str(), c)).collect();
    let sink_configs: HashMap<&str, &ComponentConfig> = config.sinks.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut components: Vec<Arc<dyn ManagedComponent>> = Vec::new();

    for pipe in &config.pipes {
        let source_cfg = source_configs
            .get(pipe.source_id.as_str())
            .ok_or_else(|| AgentError::Configuration(format!("pipe '{}' references unknown source '{}'", pipe.id, pipe.source_id)))?;
        let sink_cfg = sink_configs
            .get(pipe.sink_id.as_str())
            .ok_or_else(|| AgentError::Configuration(format!("pipe '{}' references unknown sink '{}'", pipe.id, pipe.sink_id)))?;

        let mut source = sources.create(source_cfg)?;
        if source_cfg.options.get("RequiresNetwork").and_then(|v| v.as_bool()).unwrap_or(false) {
            let dependency: Arc<dyn tapline_domain::entities::Dependency> = Arc::new(NetworkStatus::new(Vec::new()));
            source = Arc::new(DependencySource::new(source_cfg.id.clone(), source, dependency));
        }
        let sink = sinks.create(sink_cfg)?;

        let decoration_templates: Vec<(String, String)> = pipe.decoration.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let runner = PipelineRunner::new(pipe.id.clone(), source, sink, Arc::clone(&binder), &decoration_templates, HashMap::new())?;
        components.push(Arc::new(runner));
    }

    Ok(components)
}

/// Builds the lifecycle manager for a loaded configuration. Production
/// `main.rs` loads `AgentConfig`, calls this, and drives `start()`/`stop()`
/// from the shutdown signal.
pub fn build_lifecycle_manager(config: &AgentConfig) -> AgentResult<AgentLifecycleManager> {
    let components = build_pipeline_components(config)?;
    Ok(AgentLifecycleManager::new(Vec::new(), components))
}
