//! Process-wide registry.
//!
//! [`init`] installs the shared [`TopicRegistry`] once with an explicit
//! configuration. Code that never calls it gets a default-configured
//! registry on first use of [`registry`].

use crate::config::RegistryConfig;
use crate::error::{PubSubError, Result};
use crate::registry::TopicRegistry;
use crate::types::{CallbackResult, Dispatch, Removal, SubscriptionHandle};
use once_cell::sync::OnceCell;
use serde_json::Value;

static REGISTRY: OnceCell<TopicRegistry> = OnceCell::new();

/// Install the global registry. Fails if it already exists.
pub fn init(config: RegistryConfig) -> Result<&'static TopicRegistry> {
    let mut installed = false;
    let registry = REGISTRY.get_or_init(|| {
        installed = true;
        TopicRegistry::with_config(config)
    });
    if installed {
        Ok(registry)
    } else {
        Err(PubSubError::AlreadyInitialized)
    }
}

/// The global registry.
pub fn registry() -> &'static TopicRegistry {
    REGISTRY.get_or_init(TopicRegistry::new)
}

/// Register `callback` on `topic` in the global registry.
pub fn subscribe<F>(topic: &str, callback: F) -> SubscriptionHandle
where
    F: Fn(&Dispatch<'_>, &[Value]) -> CallbackResult + Send + Sync + 'static,
{
    registry().subscribe(topic, callback)
}

/// Publish `args` on `topic` through the global registry.
pub fn publish(topic: &str, args: &[Value]) -> Result<usize> {
    registry().publish(topic, args)
}

/// Remove a registration from the global registry.
pub fn unsubscribe(handle: &SubscriptionHandle, removal: Removal) -> bool {
    registry().unsubscribe(handle, removal)
}
