//! # Courier
//!
//! An in-process, synchronous publish/subscribe topic registry.
//!
//! ## Core Concepts
//!
//! - **Topics**: Plain string keys, compared exactly
//! - **Subscriptions**: Callbacks or bounded channels registered on a topic,
//!   identified by an opaque handle
//! - **Dispatch**: Publish invokes every current subscriber inline, in
//!   registration order, with an explicit argument list and optional scope
//!
//! ## Example
//!
//! ```ignore
//! use courier::{Removal, TopicRegistry};
//! use serde_json::json;
//!
//! let registry = TopicRegistry::new();
//!
//! let a = registry.subscribe("/item/added", |_, args| {
//!     println!("A got {:?}", args);
//!     Ok(())
//! });
//! registry.subscribe("/item/added", |_, args| {
//!     println!("B got {:?}", args);
//!     Ok(())
//! });
//!
//! assert_eq!(registry.publish("/item/added", &[json!({"id": 1})])?, 2);
//!
//! registry.unsubscribe(&a, Removal::Single);
//! assert_eq!(registry.publish("/item/added", &[json!({"id": 2})])?, 1);
//! ```

pub mod config;
pub mod error;
pub mod global;
pub mod registry;
pub mod types;

// Re-exports
pub use config::{FailurePolicy, RegistryConfig};
pub use error::{PubSubError, Result};
pub use registry::{ChannelSubscription, TopicRegistry};
pub use types::*;
