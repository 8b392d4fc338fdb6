//! Topic registry for in-process publish/subscribe.
//!
//! Subscribers are registered against string topics and invoked inline,
//! on the publisher's thread, in registration order:
//! - Callback subscribers receive a [`Dispatch`](crate::Dispatch) context and
//!   the published argument list
//! - Channel subscribers receive a [`TopicMessage`](crate::TopicMessage) on a
//!   bounded channel
//!
//! Each publish walks a snapshot of the topic's subscribers, so subscribing or
//! unsubscribing from inside a callback only affects later publishes.
//!
//! # Example
//!
//! ```ignore
//! let registry = TopicRegistry::new();
//!
//! let handle = registry.subscribe("/item/added", |_, args| {
//!     println!("added: {:?}", args);
//!     Ok(())
//! });
//!
//! let count = registry.publish("/item/added", &[json!({"id": 1})])?;
//! assert_eq!(count, 1);
//!
//! registry.unsubscribe(&handle, Removal::Single);
//! ```

mod manager;
mod types;

pub use manager::TopicRegistry;
pub use types::ChannelSubscription;
