//! Feature flags backed by static configuration.

use std::collections::HashSet;

use async_trait::async_trait;

use selquest_core::traits::FeatureFlags;

use crate::config::SelquestConfig;

/// Comparison flag with a global switch and a per-child deny list.
#[derive(Debug, Clone, Default)]
pub struct StaticFlags {
    enabled: bool,
    disabled_children: HashSet<String>,
}

impl StaticFlags {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            disabled_children: HashSet::new(),
        }
    }

    pub fn from_config(config: &SelquestConfig) -> Self {
        Self {
            enabled: config.comparison_enabled,
            disabled_children: config.disabled_children(),
        }
    }

    /// Turn the comparison off for one child.
    pub fn disable_for(mut self, child_id: impl Into<String>) -> Self {
        self.disabled_children.insert(child_id.into());
        self
    }
}

#[async_trait]
impl FeatureFlags for StaticFlags {
    async fn comparison_enabled(&self, child_id: &str) -> bool {
        self.enabled && !self.disabled_children.contains(child_id)
    }
}
