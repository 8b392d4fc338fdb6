//! Error handling and edge case tests.

use courier::{FailurePolicy, PubSubError, RegistryConfig, Removal, TopicRegistry};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

// --- Handle Errors ---

#[test]
fn test_unsubscribe_twice_is_noop() {
    let registry = TopicRegistry::new();
    let handle = registry.subscribe("/t", |_, _| Ok(()));
    registry.subscribe("/t", |_, _| Ok(()));

    assert!(registry.unsubscribe(&handle, Removal::Single));
    assert!(!registry.unsubscribe(&handle, Removal::Single));
    assert_eq!(registry.subscriber_count("/t"), 1);
}

#[test]
fn test_unsubscribe_after_topic_removed() {
    let registry = TopicRegistry::new();
    let a = registry.subscribe("/t", |_, _| Ok(()));
    let b = registry.subscribe("/t", |_, _| Ok(()));

    assert!(registry.unsubscribe(&a, Removal::EntireTopic));
    assert!(!registry.unsubscribe(&b, Removal::Single));
    assert!(!registry.unsubscribe(&b, Removal::EntireTopic));
}

#[test]
fn test_handle_from_another_registry() {
    let first = TopicRegistry::new();
    let second = TopicRegistry::new();

    let foreign = first.subscribe("/t", |_, _| Ok(()));
    let _local = second.subscribe("/other", |_, _| Ok(()));

    // Same topic name, unknown id: no-op.
    assert!(!second.unsubscribe(&foreign, Removal::EntireTopic));
    assert_eq!(second.topic_count(), 1);
}

#[test]
fn test_try_unsubscribe_reports_stale_handle() {
    let registry = TopicRegistry::new();
    let handle = registry.subscribe("/t", |_, _| Ok(()));

    registry.try_unsubscribe(&handle, Removal::Single).unwrap();

    match registry.try_unsubscribe(&handle, Removal::Single) {
        Err(PubSubError::InvalidHandle { topic, id }) => {
            assert_eq!(&*topic, "/t");
            assert_eq!(id, handle.id());
        }
        other => panic!("Expected InvalidHandle, got {:?}", other),
    }
}

// --- Subscriber Failures ---

#[test]
fn test_continue_policy_swallows_errors() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let registry = TopicRegistry::new();
    let reached = Arc::new(Mutex::new(false));

    registry.subscribe("/t", |_, _| Err("first failed".into()));
    let flag = Arc::clone(&reached);
    registry.subscribe("/t", move |_, _| {
        *flag.lock() = true;
        Ok(())
    });

    assert_eq!(registry.publish("/t", &[]).unwrap(), 2);
    assert!(*reached.lock());
}

#[test]
fn test_fail_fast_reports_panic() {
    let registry = TopicRegistry::with_config(RegistryConfig {
        failure_policy: FailurePolicy::FailFast,
        ..Default::default()
    });
    registry.subscribe("/t", |_, _| panic!("subscriber exploded"));

    let err = registry.publish("/t", &[]).unwrap_err();
    assert!(matches!(err, PubSubError::SubscriberFailure { .. }));
    assert!(err.to_string().contains("subscriber exploded"));

    // The registry stays usable after a failure.
    assert_eq!(registry.subscriber_count("/t"), 1);
}

#[test]
fn test_policy_switch_at_runtime() {
    let registry = TopicRegistry::new();
    registry.subscribe("/t", |_, _| Err("nope".into()));

    assert!(registry.publish("/t", &[]).is_ok());

    registry.set_config(RegistryConfig {
        failure_policy: FailurePolicy::FailFast,
        ..registry.config()
    });
    assert!(registry.publish("/t", &[]).is_err());
}

// --- Config Errors ---

#[test]
fn test_load_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"must_have_subscribers": true, "failure_policy": "fail_fast", "default_channel_buffer": 16}}"#
    )
    .unwrap();

    let config = RegistryConfig::load(file.path()).unwrap();
    assert_eq!(
        config,
        RegistryConfig {
            must_have_subscribers: true,
            failure_policy: FailurePolicy::FailFast,
            default_channel_buffer: 16,
        }
    );
}

#[test]
fn test_load_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = RegistryConfig::load(dir.path().join("absent.json"));
    assert!(matches!(result, Err(PubSubError::Io(_))));
}

#[test]
fn test_unknown_failure_policy() {
    let result = RegistryConfig::from_json(r#"{"failure_policy": "retry"}"#);
    assert!(matches!(result, Err(PubSubError::Config(_))));
}
