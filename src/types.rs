//! Core types for the topic registry.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Name of a channel of related events. Compared by exact string equality.
pub type Topic = Arc<str>;

/// Receiver context handed to subscribers during dispatch.
pub type Scope = dyn Any + Send + Sync;

/// Error type a subscriber callback may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Return type of a subscriber callback.
pub type CallbackResult = std::result::Result<(), BoxError>;

/// A subscriber callback.
pub type Callback = Arc<dyn Fn(&Dispatch<'_>, &[Value]) -> CallbackResult + Send + Sync>;

/// Hook invoked with the topic name when a publish reaches nobody.
pub type NoSubscribersHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Unique identifier for a subscription, issued by the registry.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque token returned by subscribe, used to reverse that registration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    pub(crate) topic: Topic,
    pub(crate) id: SubscriptionId,
}

impl SubscriptionHandle {
    /// Topic the registration was made on.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Registry-issued identity of the registration.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// Context passed to every subscriber invocation.
pub struct Dispatch<'a> {
    /// Topic being published.
    pub topic: &'a str,
    /// Scope supplied by the publisher, if any.
    pub scope: Option<&'a Scope>,
}

impl<'a> Dispatch<'a> {
    /// Downcast the publisher's scope to a concrete receiver type.
    pub fn scope_as<T: Any>(&self) -> Option<&'a T> {
        self.scope.and_then(|s| s.downcast_ref::<T>())
    }
}

impl fmt::Debug for Dispatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("topic", &self.topic)
            .field("scoped", &self.scope.is_some())
            .finish()
    }
}

/// Message delivered to channel subscribers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicMessage {
    pub topic: String,
    pub args: Vec<Value>,
}

/// How much `unsubscribe` removes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Removal {
    /// Only the registration the handle names.
    #[default]
    Single,
    /// The whole topic, if the handle still names a live registration.
    EntireTopic,
}

/// Per-call publish options.
#[derive(Default)]
pub struct PublishOptions<'a> {
    /// Scope handed to subscribers as their receiver context.
    pub scope: Option<&'a Scope>,
    /// Report a publish that reaches nobody, even when the registry's
    /// `must_have_subscribers` is off. Cannot switch the registry setting off.
    pub must_have_subscribers: bool,
}

impl<'a> PublishOptions<'a> {
    /// Options carrying `scope` and nothing else.
    pub fn scoped(scope: &'a Scope) -> Self {
        Self {
            scope: Some(scope),
            must_have_subscribers: false,
        }
    }

    /// Report this publish if it reaches no subscriber.
    pub fn require_subscribers(mut self) -> Self {
        self.must_have_subscribers = true;
        self
    }
}
