use serde::{Deserialize, Serialize};

/// A cloud region a failover strategy can route to.
///
/// `system_name` is the human-readable identifier logged on handover (spec
/// §4.3: "log an info including the selected region's canonical name").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDescriptor {
    pub system_name: String,
    pub endpoint: Option<String>,
}

impl RegionDescriptor {
    pub fn new(system_name: impl Into<String>) -> Self {
        Self {
            system_name: system_name.into(),
            endpoint: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

impl std::fmt::Display for RegionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.system_name)
    }
}
