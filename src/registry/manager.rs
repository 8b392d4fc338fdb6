//! Topic registry: subscribe, publish, unsubscribe.

use crate::config::{FailurePolicy, RegistryConfig};
use crate::error::{PubSubError, Result};
use crate::types::{
    Callback, CallbackResult, Dispatch, NoSubscribersHook, PublishOptions, Removal, Scope,
    SubscriptionHandle, SubscriptionId, Topic, TopicMessage,
};
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::types::ChannelSubscription;

/// Where a subscription's deliveries go.
#[derive(Clone)]
enum Sink {
    Callback(Callback),
    Channel(Sender<TopicMessage>),
}

/// Internal subscription state.
#[derive(Clone)]
struct Entry {
    id: SubscriptionId,
    sink: Sink,
}

/// Outcome of delivering one publish to one subscriber.
enum Delivery {
    Delivered,
    /// The subscriber ran and failed.
    Failed(String),
    /// The subscriber can no longer receive and must be removed.
    Dropped(&'static str),
}

impl Entry {
    fn deliver(&self, dispatch: &Dispatch<'_>, args: &[Value]) -> Delivery {
        match &self.sink {
            Sink::Callback(callback) => {
                match panic::catch_unwind(AssertUnwindSafe(|| callback(dispatch, args))) {
                    Ok(Ok(())) => Delivery::Delivered,
                    Ok(Err(e)) => Delivery::Failed(e.to_string()),
                    Err(payload) => Delivery::Failed(panic_message(payload.as_ref())),
                }
            }
            Sink::Channel(sender) => {
                let msg = TopicMessage {
                    topic: dispatch.topic.to_string(),
                    args: args.to_vec(),
                };
                match sender.try_send(msg) {
                    Ok(()) => Delivery::Delivered,
                    Err(TrySendError::Full(_)) => Delivery::Dropped("buffer overflow"),
                    Err(TrySendError::Disconnected(_)) => Delivery::Dropped("receiver dropped"),
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

/// Maps topics to their ordered subscribers and dispatches publishes.
///
/// All operations are serialized by one lock over the topic map. The lock is
/// not held while subscribers run, so a subscriber may call back into the
/// registry.
pub struct TopicRegistry {
    /// Subscribers by topic, in registration order.
    topics: Mutex<HashMap<Topic, Vec<Entry>>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
    config: RwLock<RegistryConfig>,
    no_subscribers_hook: RwLock<Option<NoSubscribersHook>>,
}

impl TopicRegistry {
    /// Create a registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a registry with a custom configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            config: RwLock::new(config),
            no_subscribers_hook: RwLock::new(None),
        }
    }

    /// Builder-style variant of [`set_no_subscribers_hook`](Self::set_no_subscribers_hook).
    pub fn on_no_subscribers<F>(self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.set_no_subscribers_hook(hook);
        self
    }

    // --- Configuration ---

    /// Current configuration.
    pub fn config(&self) -> RegistryConfig {
        self.config.read().clone()
    }

    /// Replace the configuration. Applies from the next operation.
    pub fn set_config(&self, config: RegistryConfig) {
        *self.config.write() = config;
    }

    /// Turn the registry-wide no-subscribers report on or off.
    pub fn set_must_have_subscribers(&self, enabled: bool) {
        self.config.write().must_have_subscribers = enabled;
    }

    /// Replace the default no-subscribers diagnostic with `hook`.
    pub fn set_no_subscribers_hook<F>(&self, hook: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        *self.no_subscribers_hook.write() = Some(Arc::new(hook));
    }

    /// Go back to logging publishes that reach nobody.
    pub fn clear_no_subscribers_hook(&self) {
        *self.no_subscribers_hook.write() = None;
    }

    // --- Subscribing ---

    /// Register `callback` on `topic`.
    ///
    /// Subscribing the same closure twice creates two registrations, each
    /// invoked once per publish and each removable by its own handle.
    pub fn subscribe<F>(&self, topic: &str, callback: F) -> SubscriptionHandle
    where
        F: Fn(&Dispatch<'_>, &[Value]) -> CallbackResult + Send + Sync + 'static,
    {
        self.insert(topic, Sink::Callback(Arc::new(callback)))
    }

    /// Register a channel subscriber with room for `buffer_size` messages.
    pub fn subscribe_channel(&self, topic: &str, buffer_size: usize) -> ChannelSubscription {
        let (sender, receiver) = bounded(buffer_size.max(1));
        let handle = self.insert(topic, Sink::Channel(sender));
        ChannelSubscription { handle, receiver }
    }

    /// Register a channel subscriber using the configured default buffer size.
    pub fn subscribe_channel_default(&self, topic: &str) -> ChannelSubscription {
        let buffer_size = self.config.read().default_channel_buffer;
        self.subscribe_channel(topic, buffer_size)
    }

    fn insert(&self, topic: &str, sink: Sink) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let topic: Topic = Arc::from(topic);

        self.topics
            .lock()
            .entry(Arc::clone(&topic))
            .or_default()
            .push(Entry { id, sink });

        debug!(topic = &*topic, %id, "subscribed");
        SubscriptionHandle { topic, id }
    }

    // --- Unsubscribing ---

    /// Remove the registration `handle` names.
    ///
    /// With [`Removal::EntireTopic`] the whole topic is deleted, but only if
    /// the handle still matched. Returns whether anything was removed; stale
    /// handles and unknown topics are a no-op.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle, removal: Removal) -> bool {
        let mut topics = self.topics.lock();

        let Some(entries) = topics.get_mut(handle.topic()) else {
            return false;
        };
        let Some(pos) = entries.iter().position(|e| e.id == handle.id) else {
            return false;
        };

        match removal {
            Removal::Single => {
                entries.remove(pos);
                if entries.is_empty() {
                    topics.remove(handle.topic());
                }
                debug!(topic = handle.topic(), id = %handle.id, "unsubscribed");
            }
            Removal::EntireTopic => {
                let dropped = entries.len();
                topics.remove(handle.topic());
                debug!(topic = handle.topic(), id = %handle.id, dropped, "topic removed");
            }
        }
        true
    }

    /// Like [`unsubscribe`](Self::unsubscribe), but a handle that matches
    /// nothing is reported as [`PubSubError::InvalidHandle`].
    pub fn try_unsubscribe(&self, handle: &SubscriptionHandle, removal: Removal) -> Result<()> {
        if self.unsubscribe(handle, removal) {
            Ok(())
        } else {
            Err(PubSubError::InvalidHandle {
                topic: Arc::clone(&handle.topic),
                id: handle.id,
            })
        }
    }

    /// Delete `topic` and every subscriber on it. Returns how many were dropped.
    pub fn remove_topic(&self, topic: &str) -> usize {
        let dropped = self.topics.lock().remove(topic).map_or(0, |e| e.len());
        if dropped > 0 {
            debug!(topic, dropped, "topic removed");
        }
        dropped
    }

    /// Drop every topic.
    pub fn clear(&self) {
        self.topics.lock().clear();
    }

    // --- Publishing ---

    /// Publish `args` on `topic` with no scope.
    ///
    /// Returns the number of subscribers invoked.
    pub fn publish(&self, topic: &str, args: &[Value]) -> Result<usize> {
        self.publish_with(topic, args, &PublishOptions::default())
    }

    /// Publish `args` on `topic`, handing `scope` to every subscriber.
    pub fn publish_scoped(&self, topic: &str, args: &[Value], scope: &Scope) -> Result<usize> {
        self.publish_with(topic, args, &PublishOptions::scoped(scope))
    }

    /// Publish with explicit options.
    ///
    /// Subscribers are invoked in registration order from a snapshot taken
    /// before the first one runs. Under [`FailurePolicy::Continue`] a failing
    /// subscriber is logged and skipped; under [`FailurePolicy::FailFast`] the
    /// first failure ends delivery and is returned.
    pub fn publish_with(
        &self,
        topic: &str,
        args: &[Value],
        options: &PublishOptions<'_>,
    ) -> Result<usize> {
        let snapshot: Vec<Entry> = self.topics.lock().get(topic).cloned().unwrap_or_default();

        let (policy, must_have_subscribers) = {
            let config = self.config.read();
            (
                config.failure_policy,
                config.must_have_subscribers || options.must_have_subscribers,
            )
        };

        let dispatch = Dispatch {
            topic,
            scope: options.scope,
        };

        let mut invoked = 0;
        let mut to_remove = Vec::new();
        let mut failure = None;

        for entry in &snapshot {
            match entry.deliver(&dispatch, args) {
                Delivery::Delivered => invoked += 1,
                Delivery::Failed(reason) => {
                    invoked += 1;
                    warn!(topic, id = %entry.id, %reason, "subscriber failed");
                    if policy == FailurePolicy::FailFast {
                        failure = Some(PubSubError::SubscriberFailure {
                            topic: Arc::from(topic),
                            id: entry.id,
                            reason,
                        });
                        break;
                    }
                }
                Delivery::Dropped(reason) => {
                    warn!(topic, id = %entry.id, reason, "dropping channel subscriber");
                    to_remove.push(entry.id);
                }
            }
        }

        if !to_remove.is_empty() {
            self.remove_entries(topic, &to_remove);
        }

        if let Some(err) = failure {
            return Err(err);
        }

        if invoked == 0 && must_have_subscribers {
            self.report_no_subscribers(topic);
        }

        Ok(invoked)
    }

    fn remove_entries(&self, topic: &str, ids: &[SubscriptionId]) {
        let mut topics = self.topics.lock();
        if let Some(entries) = topics.get_mut(topic) {
            entries.retain(|e| !ids.contains(&e.id));
            if entries.is_empty() {
                topics.remove(topic);
            }
        }
    }

    fn report_no_subscribers(&self, topic: &str) {
        let hook = self.no_subscribers_hook.read().clone();
        match hook {
            Some(hook) => {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| hook(topic))) {
                    let reason = panic_message(payload.as_ref());
                    warn!(topic, %reason, "no-subscribers hook failed");
                }
            }
            None => error!(
                topic,
                "The topic {:?} was published when there were no subscribers to the topic.",
                topic
            ),
        }
    }

    // --- Introspection ---

    /// Number of live subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.lock().get(topic).map_or(0, |e| e.len())
    }

    /// Whether `topic` has any live subscription.
    pub fn has_subscribers(&self, topic: &str) -> bool {
        self.subscriber_count(topic) > 0
    }

    /// Topics with at least one subscriber, sorted.
    pub fn topics(&self) -> Vec<String> {
        let mut names: Vec<String> = self.topics.lock().keys().map(|t| t.to_string()).collect();
        names.sort();
        names
    }

    /// Number of topics with at least one subscriber.
    pub fn topic_count(&self) -> usize {
        self.topics.lock().len()
    }
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new()
    }
}
