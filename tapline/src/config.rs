// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Configuration binding (spec §6). A hierarchical key-value tree loaded at
//! startup via the `config` crate, resolved from `KINESISTAP_CONFIG_PATH` if
//! set, otherwise falling back to a conventional default path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tapline_domain::entities::{MetricScope, MetricUnit};
use tapline_domain::error::{AgentError, AgentResult};

pub const CONFIG_PATH_ENV_VAR: &str = "KINESISTAP_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "/etc/tapline/tapline.toml";

/// One `Sources` / `Sinks` / `Credentials` entry: an id, a type tag looked
/// up case-insensitively against a factory catalog, and whatever
/// type-specific options it carries.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentConfig {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Type")]
    pub type_tag: String,
    #[serde(flatten)]
    pub options: HashMap<String, serde_json::Value>,
}

impl ComponentConfig {
    pub fn type_tag_lower(&self) -> String {
        self.type_tag.to_lowercase()
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(|v| v.as_str())
    }

    pub fn option_u64(&self, key: &str) -> Option<u64> {
        self.options.get(key).and_then(|v| v.as_u64())
    }
}

/// `Pipes` wire a source to a sink, optionally through a decoration map
/// (spec §4.5) of output field name to `${expr}` template.
#[derive(Debug, Clone, Deserialize)]
pub struct PipeConfig {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "SourceId")]
    pub source_id: String,
    #[serde(rename = "SinkId")]
    pub sink_id: String,
    #[serde(rename = "Decoration", default)]
    pub decoration: HashMap<String, String>,
}

/// One entry of a [`MetricDefinitionConfig`]'s `Metrics` array (spec §6): a
/// name, an optional unit (defaults to `MetricUnit::None`), and an optional
/// default value that is silently dropped if it can't be parsed as a number.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricEntryConfig {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Unit", default)]
    pub unit: Option<String>,
    #[serde(rename = "Value", default)]
    pub value: Option<serde_json::Value>,
}

fn parse_metric_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

/// A metric definition section (spec §6): a namespace plus the metrics and
/// dimension groups to record under it. An empty `Dimensions` array means
/// "no dimension groups declared"; an explicit empty inner array is the
/// "no-dimensions" tuple (spec §9's resolved Open Question, DESIGN.md).
#[derive(Debug, Clone, Deserialize)]
pub struct MetricDefinitionConfig {
    #[serde(rename = "Namespace")]
    pub namespace: String,
    #[serde(rename = "Metrics", default)]
    pub metrics: Vec<MetricEntryConfig>,
    #[serde(rename = "Dimensions", default)]
    pub dimensions: Vec<Vec<String>>,
}

impl MetricDefinitionConfig {
    pub fn validate(&self) -> AgentResult<()> {
        if self.namespace.trim().is_empty() {
            return Err(AgentError::Configuration(
                "metric definition 'Namespace' must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds a [`MetricScope`] from this definition (spec §6), resolving
    /// each declared dimension name against `fields` — a name with no entry
    /// in `fields` resolves to an empty value, the same as any other unset
    /// field.
    pub fn build_scope(&self, timestamp: DateTime<Utc>, fields: &HashMap<String, String>) -> AgentResult<MetricScope> {
        self.validate()?;
        let mut scope = MetricScope::new(timestamp);

        let groups: Vec<Vec<(&str, &str)>> = if self.dimensions.is_empty() {
            vec![Vec::new()]
        } else {
            self.dimensions
                .iter()
                .map(|group| {
                    group
                        .iter()
                        .map(|name| (name.as_str(), fields.get(name).map(String::as_str).unwrap_or("")))
                        .collect()
                })
                .collect()
        };
        let group_refs: Vec<&[(&str, &str)]> = groups.iter().map(Vec::as_slice).collect();

        for metric in &self.metrics {
            let unit = metric.unit.as_deref().map(MetricUnit::parse).unwrap_or_default();
            let value = metric.value.as_ref().and_then(parse_metric_value).unwrap_or(0.0);
            scope.add_cloudwatch_metric_with_groups(&self.namespace, &metric.name, value, unit, &group_refs);
        }

        Ok(scope)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AgentConfig {
    #[serde(rename = "Sources", default)]
    pub sources: Vec<ComponentConfig>,
    #[serde(rename = "Sinks", default)]
    pub sinks: Vec<ComponentConfig>,
    #[serde(rename = "Credentials", default)]
    pub credentials: Vec<ComponentConfig>,
    #[serde(rename = "Pipes", default)]
    pub pipes: Vec<PipeConfig>,
}

impl AgentConfig {
    /// Resolves the configuration path from `KINESISTAP_CONFIG_PATH`, falling
    /// back to the conventional default, then loads and parses it.
    pub fn load_from_env() -> AgentResult<Self> {
        let path = resolve_config_path();
        Self::load(&path)
    }

    pub fn load(path: &Path) -> AgentResult<Self> {
        if !path.exists() {
            return Err(AgentError::Configuration(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .map_err(|e| AgentError::Configuration(format!("failed to read {}: {e}", path.display())))?;
        settings
            .try_deserialize()
            .map_err(|e| AgentError::Configuration(format!("failed to parse {}: {e}", path.display())))
    }
}

pub fn resolve_config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_config_file_is_a_configuration_error() {
        let err = AgentConfig::load(Path::new("/nonexistent/tapline.toml")).unwrap_err();
        assert!(matches!(err, AgentError::Configuration(_)));
    }

    #[test]
    fn loads_sources_sinks_and_pipes_from_toml() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        write!(
            file,
            r#"
            [[Sources]]
            Id = "dir1"
            Type = "DirectorySource"
            Directory = "/var/log/app"

            [[Sinks]]
            Id = "sink1"
            Type = "RegionalFailoverSink"

            [[Pipes]]
            Id = "pipe1"
            SourceId = "dir1"
            SinkId = "sink1"
            "#
        )
        .unwrap();

        let config = AgentConfig::load(file.path()).unwrap();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].type_tag_lower(), "directorysource");
        assert_eq!(config.sources[0].option_str("Directory"), Some("/var/log/app"));
        assert_eq!(config.pipes.len(), 1);
        assert_eq!(config.pipes[0].source_id, "dir1");
    }

    #[test]
    fn metric_definition_rejects_empty_namespace() {
        let def = MetricDefinitionConfig {
            namespace: "  ".to_string(),
            metrics: Vec::new(),
            dimensions: Vec::new(),
        };
        assert!(matches!(def.validate(), Err(AgentError::Configuration(_))));
    }

    #[test]
    fn metric_definition_defaults_missing_unit_and_ignores_unparseable_value() {
        let def = MetricDefinitionConfig {
            namespace: "NS".to_string(),
            metrics: vec![MetricEntryConfig {
                name: "Errors".to_string(),
                unit: None,
                value: Some(serde_json::Value::String("not-a-number".to_string())),
            }],
            dimensions: vec![Vec::new(), vec!["Env".to_string()]],
        };
        let mut fields = HashMap::new();
        fields.insert("Env".to_string(), "Prod".to_string());

        let scope = def.build_scope(chrono::Utc::now(), &fields).unwrap();
        let json = scope.to_emf_json();
        assert!(json.to_string().contains("\"Unit\":\"None\""));
        assert!(json.to_string().contains("\"Dimensions\":[[],[\"Env\"]]"));
    }

    #[test]
    fn metric_definition_loads_from_toml() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        write!(
            file,
            r#"
            [[Sources]]
            Id = "dir1"
            Type = "DirectorySource"
            Directory = "/var/log/app"

            [[MetricDefinitions]]
            Namespace = "App"
            Dimensions = [[], ["Env"]]

            [[MetricDefinitions.Metrics]]
            Name = "Errors"
            Unit = "Count"
            Value = 1
            "#
        )
        .unwrap();

        let settings = config::Config::builder()
            .add_source(config::File::from(file.path()))
            .build()
            .unwrap();
        let defs: Vec<MetricDefinitionConfig> = settings.get("MetricDefinitions").unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].namespace, "App");
        assert_eq!(defs[0].metrics[0].name, "Errors");
        assert_eq!(defs[0].dimensions, vec![Vec::<String>::new(), vec!["Env".to_string()]]);
    }
}
