//! Projector configuration and its fluent builder.
//!
//! # Example
//!
//! ```rust
//! use chainproject_core::config::ProjectorBuilder;
//!
//! let config = ProjectorBuilder::new()
//!     .chain_id("laozi-mainnet")
//!     .gov(false)
//!     .build_config();
//! assert!(!config.gov);
//! ```

use serde::{Deserialize, Serialize};

/// Configuration for a projector instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorConfig {
    /// Chain the projected ledger belongs to (used in logs).
    pub chain_id: String,
    /// Project governance proposals, deposits and votes.
    pub gov: bool,
    /// Include validator statuses and reporter delegations in bootstrap.
    pub validators: bool,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            chain_id: "bandchain".into(),
            gov: true,
            validators: true,
        }
    }
}

/// Fluent builder for [`ProjectorConfig`].
#[derive(Default)]
pub struct ProjectorBuilder {
    config: ProjectorConfig,
}

impl ProjectorBuilder {
    pub fn new() -> Self {
        Self {
            config: ProjectorConfig::default(),
        }
    }

    pub fn chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.config.chain_id = chain_id.into();
        self
    }

    /// Enable or disable governance projection.
    pub fn gov(mut self, enabled: bool) -> Self {
        self.config.gov = enabled;
        self
    }

    /// Enable or disable validator/reporter bootstrap.
    pub fn validators(mut self, enabled: bool) -> Self {
        self.config.validators = enabled;
        self
    }

    pub fn build_config(self) -> ProjectorConfig {
        self.config
    }

    /// Build a [`Projector`](crate::projector::Projector) with this configuration.
    pub fn build(self) -> crate::projector::Projector {
        crate::projector::Projector::new(self.config)
    }
}
