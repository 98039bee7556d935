use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// A CloudWatch unit name. `None` is the default CloudWatch unit, distinct
/// from the Rust `Option::None` — spelled `MetricUnit::None` to avoid the
/// clash, and whatever string a sink config supplies but doesn't recognize
/// is kept verbatim via `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricUnit {
    None,
    Count,
    Milliseconds,
    Seconds,
    Bytes,
    Percent,
    Other(String),
}

impl Default for MetricUnit {
    fn default() -> Self {
        MetricUnit::None
    }
}

impl MetricUnit {
    pub fn as_str(&self) -> &str {
        match self {
            MetricUnit::None => "None",
            MetricUnit::Count => "Count",
            MetricUnit::Milliseconds => "Milliseconds",
            MetricUnit::Seconds => "Seconds",
            MetricUnit::Bytes => "Bytes",
            MetricUnit::Percent => "Percent",
            MetricUnit::Other(s) => s.as_str(),
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "None" => MetricUnit::None,
            "Count" => MetricUnit::Count,
            "Milliseconds" => MetricUnit::Milliseconds,
            "Seconds" => MetricUnit::Seconds,
            "Bytes" => MetricUnit::Bytes,
            "Percent" => MetricUnit::Percent,
            other => MetricUnit::Other(other.to_string()),
        }
    }
}

/// A metric name/unit/default triple (spec §3: "set of MetricValue (name,
/// unit, optional default)").
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValueDef {
    pub name: String,
    pub unit: MetricUnit,
    pub default: Option<f64>,
}

/// One CloudWatch namespace's accumulated metric/dimension shape.
///
/// `UniqueDimensions` is derived lazily from `dimension_groups` and cached
/// until the groups mutate (spec §3), modeled here with a `RefCell` cache
/// since the scope is built single-threaded per envelope.
#[derive(Debug, Clone)]
pub struct CloudWatchMetric {
    pub namespace: String,
    dimension_groups: Vec<Vec<String>>,
    metrics: Vec<MetricValueDef>,
    unique_dimensions_cache: RefCell<Option<Vec<String>>>,
}

impl CloudWatchMetric {
    fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            dimension_groups: Vec::new(),
            metrics: Vec::new(),
            unique_dimensions_cache: RefCell::new(None),
        }
    }

    pub fn dimension_groups(&self) -> &[Vec<String>] {
        &self.dimension_groups
    }

    pub fn metrics(&self) -> &[MetricValueDef] {
        &self.metrics
    }

    fn add_dimension_group(&mut self, group: Vec<String>) {
        if !self.dimension_groups.iter().any(|g| g == &group) {
            self.dimension_groups.push(group);
            *self.unique_dimensions_cache.borrow_mut() = None;
        }
    }

    fn add_metric_value(&mut self, def: MetricValueDef) {
        if !self.metrics.iter().any(|m| m.name == def.name) {
            self.metrics.push(def);
        }
    }

    /// Union of every dimension name referenced by any group, cached until
    /// the next mutation.
    pub fn unique_dimensions(&self) -> Vec<String> {
        if let Some(cached) = self.unique_dimensions_cache.borrow().as_ref() {
            return cached.clone();
        }
        let mut union = Vec::new();
        for group in &self.dimension_groups {
            for name in group {
                if !union.contains(name) {
                    union.push(name.clone());
                }
            }
        }
        *self.unique_dimensions_cache.borrow_mut() = Some(union.clone());
        union
    }
}

/// A unit of emission: an event timestamp plus every metric, dimension and
/// property accumulated for it (spec §3, §4.8).
#[derive(Debug, Clone)]
pub struct MetricScope {
    timestamp: DateTime<Utc>,
    version: String,
    cloudwatch_metrics: Vec<CloudWatchMetric>,
    dimension_values: HashMap<String, String>,
    metric_values: HashMap<String, f64>,
    properties: HashMap<String, Value>,
}

impl MetricScope {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            version: "0".to_string(),
            cloudwatch_metrics: Vec::new(),
            dimension_values: HashMap::new(),
            metric_values: HashMap::new(),
            properties: HashMap::new(),
        }
    }

    pub fn epoch_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.entry(key.into()).or_insert_with(|| value.into());
    }

    fn metric_for_namespace(&mut self, namespace: &str) -> &mut CloudWatchMetric {
        if let Some(idx) = self.cloudwatch_metrics.iter().position(|m| m.namespace == namespace) {
            return &mut self.cloudwatch_metrics[idx];
        }
        self.cloudwatch_metrics.push(CloudWatchMetric::new(namespace));
        self.cloudwatch_metrics.last_mut().unwrap()
    }

    /// `AddCloudWatchMetric(ns, name, value, unit, dimensions)` — the
    /// single-dimension-group form (spec §4.8).
    pub fn add_cloudwatch_metric(
        &mut self,
        namespace: &str,
        name: &str,
        value: f64,
        unit: MetricUnit,
        dimensions: &[(&str, &str)],
    ) {
        self.add_cloudwatch_metric_with_groups(namespace, name, value, unit, &[dimensions]);
    }

    /// Variant accepting explicit dimension groups (spec §4.8). Passing an
    /// empty group records the "no-dimensions" tuple explicitly, per the
    /// config-shape decision in DESIGN.md.
    pub fn add_cloudwatch_metric_with_groups(
        &mut self,
        namespace: &str,
        name: &str,
        value: f64,
        unit: MetricUnit,
        groups: &[&[(&str, &str)]],
    ) {
        self.metric_values.entry(name.to_string()).or_insert(value);

        for group in groups {
            for (dim_name, dim_value) in *group {
                self.dimension_values
                    .entry(dim_name.to_string())
                    .or_insert_with(|| dim_value.to_string());
            }
        }

        let metric = self.metric_for_namespace(namespace);
        metric.add_metric_value(MetricValueDef {
            name: name.to_string(),
            unit,
            default: None,
        });
        for group in groups {
            let names: Vec<String> = group.iter().map(|(k, _)| k.to_string()).collect();
            metric.add_dimension_group(names);
        }
    }

    pub fn cloudwatch_metrics(&self) -> &[CloudWatchMetric] {
        &self.cloudwatch_metrics
    }

    /// Verifies the invariant from spec §3: every dimension name referenced
    /// by a metric's dimension groups has a matching `DimensionValues` entry.
    pub fn check_dimension_invariant(&self) -> bool {
        self.cloudwatch_metrics.iter().all(|m| {
            m.unique_dimensions()
                .iter()
                .all(|name| self.dimension_values.contains_key(name))
        })
    }

    /// Renders the CloudWatch-EMF JSON envelope (spec §4.8, §6): `Timestamp`,
    /// `Version`, `CloudWatchMetrics`, then every dimension value, metric
    /// value and property as sibling top-level fields. Dimension-group
    /// arrays are sorted by name (spec §6).
    pub fn to_emf_json(&self) -> Value {
        let mut root = Map::new();
        root.insert("Timestamp".to_string(), Value::from(self.epoch_millis()));
        root.insert("Version".to_string(), Value::from(self.version.clone()));

        let cw_metrics: Vec<Value> = self
            .cloudwatch_metrics
            .iter()
            .map(|m| {
                let mut dims: Vec<Vec<String>> = m.dimension_groups().to_vec();
                for group in &mut dims {
                    group.sort();
                }
                let metrics: Vec<Value> = m
                    .metrics()
                    .iter()
                    .map(|mv| {
                        let mut obj = Map::new();
                        obj.insert("Name".to_string(), Value::from(mv.name.clone()));
                        obj.insert("Unit".to_string(), Value::from(mv.unit.as_str().to_string()));
                        Value::Object(obj)
                    })
                    .collect();
                let mut obj = Map::new();
                obj.insert("Namespace".to_string(), Value::from(m.namespace.clone()));
                obj.insert("Dimensions".to_string(), Value::from(dims));
                obj.insert("Metrics".to_string(), Value::from(metrics));
                Value::Object(obj)
            })
            .collect();
        root.insert("CloudWatchMetrics".to_string(), Value::from(cw_metrics));

        for (name, value) in &self.dimension_values {
            root.insert(name.clone(), Value::from(value.clone()));
        }
        for (name, value) in &self.metric_values {
            root.insert(name.clone(), Value::from(*value));
        }
        for (name, value) in &self.properties {
            root.insert(name.clone(), value.clone());
        }

        Value::Object(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_expected_emf_shape() {
        let mut scope = MetricScope::new(Utc::now());
        scope.add_cloudwatch_metric("NS", "Errors", 1.0, MetricUnit::Count, &[("Env", "Prod")]);

        let json = scope.to_emf_json();
        assert_eq!(json["CloudWatchMetrics"][0]["Namespace"], "NS");
        assert_eq!(json["CloudWatchMetrics"][0]["Dimensions"], serde_json::json!([["Env"]]));
        assert_eq!(
            json["CloudWatchMetrics"][0]["Metrics"],
            serde_json::json!([{"Name": "Errors", "Unit": "Count"}])
        );
        assert_eq!(json["Env"], "Prod");
        assert_eq!(json["Errors"], 1.0);
    }

    #[test]
    fn first_write_wins_on_duplicate_dimension_value() {
        let mut scope = MetricScope::new(Utc::now());
        scope.add_cloudwatch_metric("NS", "A", 1.0, MetricUnit::Count, &[("Env", "Prod")]);
        scope.add_cloudwatch_metric("NS", "B", 2.0, MetricUnit::Count, &[("Env", "Staging")]);
        assert_eq!(scope.to_emf_json()["Env"], "Prod");
    }

    #[test]
    fn dedups_identical_dimension_groups() {
        let mut scope = MetricScope::new(Utc::now());
        scope.add_cloudwatch_metric("NS", "A", 1.0, MetricUnit::Count, &[("Env", "Prod")]);
        scope.add_cloudwatch_metric("NS", "B", 1.0, MetricUnit::Count, &[("Env", "Prod")]);
        assert_eq!(scope.cloudwatch_metrics()[0].dimension_groups().len(), 1);
    }

    #[test]
    fn dimension_invariant_holds_after_additions() {
        let mut scope = MetricScope::new(Utc::now());
        scope.add_cloudwatch_metric("NS", "A", 1.0, MetricUnit::Count, &[("Env", "Prod")]);
        assert!(scope.check_dimension_invariant());
    }

    #[test]
    fn round_trip_through_serialized_json() {
        let mut scope = MetricScope::new(Utc::now());
        scope.add_cloudwatch_metric("NS", "Errors", 1.0, MetricUnit::Count, &[]);
        let json = scope.to_emf_json();
        let reparsed: Value = serde_json::from_str(&json.to_string()).unwrap();
        assert_eq!(reparsed["Timestamp"], scope.epoch_millis());
        let namespaces: std::collections::HashSet<_> = reparsed["CloudWatchMetrics"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["Namespace"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(namespaces, std::collections::HashSet::from(["NS".to_string()]));
    }
}
