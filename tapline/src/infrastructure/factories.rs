// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Factory catalogs (spec §6/§9): a type tag from configuration is looked
//! up case-insensitively against a table of constructor closures. Unknown
//! tags fail fast with `AgentError::Configuration` at startup, never at
//! runtime.

use std::collections::HashMap;
use std::sync::Arc;

use tapline_domain::error::{AgentError, AgentResult};
use tapline_domain::ports::{Sink, Source};

use crate::config::ComponentConfig;

type SourceCtor = Box<dyn Fn(&ComponentConfig) -> AgentResult<Arc<dyn Source>> + Send + Sync>;
type SinkCtor = Box<dyn Fn(&ComponentConfig) -> AgentResult<Arc<dyn Sink>> + Send + Sync>;

#[derive(Default)]
pub struct SourceCatalog {
    ctors: HashMap<String, SourceCtor>,
}

impl SourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_tag: &str, ctor: SourceCtor) {
        self.ctors.insert(type_tag.to_lowercase(), ctor);
    }

    pub fn create(&self, config: &ComponentConfig) -> AgentResult<Arc<dyn Source>> {
        let tag = config.type_tag_lower();
        let ctor = self
            .ctors
            .get(tag.as_str())
            .ok_or_else(|| AgentError::Configuration(format!("unknown source type '{}'", config.type_tag)))?;
        ctor(config)
    }
}

#[derive(Default)]
pub struct SinkCatalog {
    ctors: HashMap<String, SinkCtor>,
}

impl SinkCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_tag: &str, ctor: SinkCtor) {
        self.ctors.insert(type_tag.to_lowercase(), ctor);
    }

    pub fn create(&self, config: &ComponentConfig) -> AgentResult<Arc<dyn Sink>> {
        let tag = config.type_tag_lower();
        let ctor = self
            .ctors
            .get(tag.as_str())
            .ok_or_else(|| AgentError::Configuration(format!("unknown sink type '{}'", config.type_tag)))?;
        ctor(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tapline_domain::entities::Envelope;

    struct NullSource;

    #[async_trait]
    impl Source for NullSource {
        fn name(&self) -> &str {
            "null"
        }
        async fn poll(&self) -> AgentResult<Vec<Envelope<String>>> {
            Ok(Vec::new())
        }
    }

    fn sample_config(type_tag: &str) -> ComponentConfig {
        ComponentConfig {
            id: "x".to_string(),
            type_tag: type_tag.to_string(),
            options: HashMap::new(),
        }
    }

    #[test]
    fn unknown_type_tag_is_a_configuration_error() {
        let catalog = SourceCatalog::new();
        let result = catalog.create(&sample_config("NoSuchSource"));
        assert!(matches!(result, Err(AgentError::Configuration(_))));
    }

    #[test]
    fn type_tag_lookup_is_case_insensitive() {
        let mut catalog = SourceCatalog::new();
        catalog.register("directorysource", Box::new(|_cfg| Ok(Arc::new(NullSource) as Arc<dyn Source>)));
        assert!(catalog.create(&sample_config("DirectorySource")).is_ok());
        assert!(catalog.create(&sample_config("DIRECTORYSOURCE")).is_ok());
    }
}
