//! Registry configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What publish does when a subscriber fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log the failure and keep delivering to the remaining subscribers.
    #[default]
    Continue,
    /// Stop at the first failure and return it to the publisher.
    FailFast,
}

/// Registry configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Report publishes that reach no subscriber.
    /// Default: false
    pub must_have_subscribers: bool,

    /// Subscriber failure handling.
    pub failure_policy: FailurePolicy,

    /// Buffer size for channel subscribers created without an explicit size.
    /// Default: 1000
    pub default_channel_buffer: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            must_have_subscribers: false,
            failure_policy: FailurePolicy::Continue,
            default_channel_buffer: 1000,
        }
    }
}

impl RegistryConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
