//! # Delivery Scenarios
//!
//! End-to-end behavior of a single bus seen by producers and consumers:
//!
//! 1. **Sync delivery**: a private message reaches its handler unchanged
//! 2. **Veto**: middleware returning `None` stops delivery for that kind only
//! 3. **Async fan-out**: concurrent `publish_async` calls reach every handler

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        bot_connected, counting_subscriber, group_message, group_mute, private_message,
    };
    use cryo_bus::{inspect, middleware, BusConfig, EventBus, EventPublisher, NO_TAGS};
    use cryo_events::{CryoEvent, EventKind};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    // =========================================================================
    // SYNC DELIVERY
    // =========================================================================

    #[test]
    fn test_private_message_reaches_handler() {
        let bus = EventBus::new();
        let received: Arc<Mutex<Vec<CryoEvent>>> = Arc::new(Mutex::new(Vec::new()));
        let r = Arc::clone(&received);
        bus.subscribe(
            EventKind::PrivateMessage,
            move |event| r.lock().push(event.clone()),
            NO_TAGS,
        );

        let delivered = bus.publish(private_message("e1", "hello"));

        assert_eq!(delivered, 1);
        let received = received.lock();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].id(), "e1");
        assert_eq!(received[0].kind(), EventKind::PrivateMessage);
        assert_eq!(
            received[0].message().map(|m| m.content.as_str()),
            Some("hello")
        );
    }

    #[test]
    fn test_every_handler_runs_once_in_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for name in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.subscribe(EventKind::GroupMute, move |_| order.lock().push(name), NO_TAGS);
        }

        assert_eq!(bus.publish(group_mute("m1")), 3);
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_handlers_only_see_their_kind() {
        let bus = EventBus::new();
        let privates = counting_subscriber(&bus, EventKind::PrivateMessage);
        let groups = counting_subscriber(&bus, EventKind::GroupMessage);

        bus.publish(private_message("e1", "a"));
        bus.publish(private_message("e2", "b"));
        bus.publish(group_message("g1", "c"));
        bus.publish(bot_connected());

        assert_eq!(privates.load(Ordering::SeqCst), 2);
        assert_eq!(groups.load(Ordering::SeqCst), 1);
        assert_eq!(bus.events_published(), 4);
    }

    // =========================================================================
    // MIDDLEWARE
    // =========================================================================

    #[test]
    fn test_vetoing_middleware_blocks_group_messages() {
        let bus = EventBus::new();
        let h2 = counting_subscriber(&bus, EventKind::GroupMessage);
        let privates = counting_subscriber(&bus, EventKind::PrivateMessage);
        bus.add_middleware(EventKind::GroupMessage, [middleware(|_| None)]);

        assert_eq!(bus.publish(group_message("g1", "spam")), 0);
        assert_eq!(bus.publish(private_message("e1", "hi")), 1);

        assert_eq!(h2.load(Ordering::SeqCst), 0);
        assert_eq!(privates.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_conditional_veto_applies_per_call() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        bus.subscribe(
            EventKind::GroupMessage,
            move |event| s.lock().push(event.id().to_string()),
            NO_TAGS,
        );
        bus.add_middleware(
            EventKind::GroupMessage,
            [middleware(|event| {
                let spam = event.message().is_some_and(|m| m.content.contains("spam"));
                (!spam).then_some(event)
            })],
        );

        bus.publish(group_message("g1", "spam spam"));
        bus.publish(group_message("g2", "hello"));

        assert_eq!(*seen.lock(), vec!["g2".to_string()]);
    }

    #[test]
    fn test_middleware_chain_runs_in_order_before_handlers() {
        let bus = EventBus::new();
        let trail = Arc::new(Mutex::new(Vec::new()));

        let t = Arc::clone(&trail);
        let first = inspect(move |_| t.lock().push("m1"));
        let t = Arc::clone(&trail);
        let second = middleware(move |mut event: CryoEvent| {
            t.lock().push("m2");
            event.base_mut().summary = "filtered".to_string();
            Some(event)
        });
        bus.add_middleware(EventKind::PrivateMessage, [first, second]);

        let t = Arc::clone(&trail);
        bus.subscribe(
            EventKind::PrivateMessage,
            move |event| {
                assert_eq!(event.summary(), "filtered");
                t.lock().push("handler");
            },
            NO_TAGS,
        );

        bus.publish(private_message("e1", "hi"));
        assert_eq!(*trail.lock(), vec!["m1", "m2", "handler"]);
    }

    #[test]
    fn test_global_middleware_covers_known_kinds_only() {
        let bus = EventBus::new();
        let _privates = counting_subscriber(&bus, EventKind::PrivateMessage);
        bus.add_global_middleware([middleware(|_| None)]);
        // First subscribed after the global registration.
        let groups = counting_subscriber(&bus, EventKind::GroupMessage);

        assert_eq!(bus.publish(private_message("e1", "hi")), 0);
        assert_eq!(bus.publish(group_message("g1", "hi")), 1);
        assert_eq!(groups.load(Ordering::SeqCst), 1);
    }

    // =========================================================================
    // ASYNC FAN-OUT
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_publish_async_reaches_every_handler() {
        let bus = Arc::new(EventBus::new());
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let c = Arc::clone(&counter);
            bus.subscribe(
                EventKind::PrivateMessage,
                move |_| {
                    c.fetch_add(1, Ordering::SeqCst);
                },
                NO_TAGS,
            );
        }

        let publishers: Vec<_> = (0..100)
            .map(|n| {
                let bus = Arc::clone(&bus);
                tokio::spawn(async move {
                    bus.publish_async(private_message(&format!("e{n}"), "hi"))
                        .await
                })
            })
            .collect();

        let mut scheduled = 0;
        for publisher in publishers {
            scheduled += publisher.await.expect("join").expect("publish");
        }
        assert_eq!(scheduled, 300);

        timeout(Duration::from_secs(10), bus.wait_idle())
            .await
            .expect("timeout waiting for handlers");
        assert_eq!(counter.load(Ordering::SeqCst), 300);
    }

    #[tokio::test]
    async fn test_publisher_trait_object_delivers_both_modes() {
        let bus = Arc::new(EventBus::with_config(BusConfig::for_testing()).unwrap());
        let connects = counting_subscriber(&bus, EventKind::BotConnected);
        let producer: Arc<dyn EventPublisher> = bus.clone();

        assert_eq!(producer.publish(bot_connected()), 1);
        assert_eq!(producer.publish_async(bot_connected()).await.unwrap(), 1);

        timeout(Duration::from_secs(5), bus.wait_idle())
            .await
            .expect("timeout");
        assert_eq!(connects.load(Ordering::SeqCst), 2);
    }
}
