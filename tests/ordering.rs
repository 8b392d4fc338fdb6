//! Property tests for dispatch order and unsubscribe bookkeeping.

use courier::{Removal, TopicRegistry};
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;

proptest! {
    #[test]
    fn publish_invokes_each_subscriber_once_in_registration_order(n in 0usize..40) {
        let registry = TopicRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..n {
            let order = Arc::clone(&order);
            registry.subscribe("/t", move |_, _| {
                order.lock().push(i);
                Ok(())
            });
        }

        prop_assert_eq!(registry.publish("/t", &[]).unwrap(), n);
        prop_assert_eq!(order.lock().clone(), (0..n).collect::<Vec<_>>());

        // Repeated publishes keep the same order.
        order.lock().clear();
        registry.publish("/t", &[]).unwrap();
        prop_assert_eq!(order.lock().clone(), (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn unsubscribe_removes_exactly_the_named_registrations(
        removed in proptest::collection::vec(any::<bool>(), 1..30)
    ) {
        let registry = TopicRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..removed.len())
            .map(|i| {
                let order = Arc::clone(&order);
                registry.subscribe("/t", move |_, _| {
                    order.lock().push(i);
                    Ok(())
                })
            })
            .collect();

        for (handle, remove) in handles.iter().zip(&removed) {
            if *remove {
                prop_assert!(registry.unsubscribe(handle, Removal::Single));
            }
        }

        let expected: Vec<usize> = removed
            .iter()
            .enumerate()
            .filter(|(_, r)| !**r)
            .map(|(i, _)| i)
            .collect();

        prop_assert_eq!(registry.publish("/t", &[]).unwrap(), expected.len());
        prop_assert_eq!(order.lock().clone(), expected);
    }
}
