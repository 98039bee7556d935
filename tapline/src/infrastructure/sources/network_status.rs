// /////////////////////////////////////////////////////////////////////////////
// Tapline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! Composes several availability providers by unanimous AND (spec §2/§5).
//! Replaces the teacher's process-wide mutable singleton pattern with an
//! explicit handle constructed once and shared via `Arc` (spec §9).

use std::sync::Arc;

use async_trait::async_trait;

use tapline_domain::entities::Dependency;

pub struct NetworkStatus {
    providers: Vec<Arc<dyn Dependency>>,
}

impl NetworkStatus {
    pub fn new(providers: Vec<Arc<dyn Dependency>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl Dependency for NetworkStatus {
    fn name(&self) -> &str {
        "network-status"
    }

    async fn is_dependency_available(&self) -> Result<bool, String> {
        for provider in &self.providers {
            if !provider.is_dependency_available().await? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
