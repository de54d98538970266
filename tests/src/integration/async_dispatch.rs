//! # Async Dispatch
//!
//! Worker pool behavior as seen through `EventBus::publish_async`:
//! fault isolation, overflow policies, orderly shutdown, and use of one bus
//! across successive runtimes.

#[cfg(test)]
mod tests {
    use crate::fixtures::{counting_subscriber, group_message, private_message};
    use cryo_bus::{BusConfig, BusError, EventBus, OverflowPolicy, NO_TAGS};
    use cryo_events::EventKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::time::Duration;
    use tokio::runtime::{Builder, Runtime};
    use tokio::time::timeout;

    fn bus_with(workers: usize, capacity: usize, policy: OverflowPolicy) -> EventBus {
        EventBus::with_config(BusConfig {
            worker_count: workers,
            queue_capacity: capacity,
            overflow_policy: policy,
            ..BusConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_panicking_handler_does_not_affect_siblings() {
        cryo_telemetry::init_for_tests();
        let bus = EventBus::with_config(BusConfig::for_testing()).unwrap();
        let before = counting_subscriber(&bus, EventKind::GroupMessage);
        bus.subscribe(
            EventKind::GroupMessage,
            |_| panic!("handler fault"),
            NO_TAGS,
        );
        let after = counting_subscriber(&bus, EventKind::GroupMessage);

        assert_eq!(bus.publish_async(group_message("g1", "hi")).await.unwrap(), 3);
        assert_eq!(bus.publish_async(group_message("g2", "hi")).await.unwrap(), 3);
        timeout(Duration::from_secs(5), bus.wait_idle())
            .await
            .expect("timeout");

        assert_eq!(before.load(Ordering::SeqCst), 2);
        assert_eq!(after.load(Ordering::SeqCst), 2);
        assert_eq!(bus.pending_jobs(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_drop_policy_discards_when_queue_full() {
        let bus = bus_with(1, 1, OverflowPolicy::Drop);
        let gate = Arc::new(Barrier::new(2));
        let handled = Arc::new(AtomicUsize::new(0));

        let g = Arc::clone(&gate);
        let h = Arc::clone(&handled);
        bus.subscribe(
            EventKind::PrivateMessage,
            move |event| {
                if event.id() == "block" {
                    g.wait();
                }
                h.fetch_add(1, Ordering::SeqCst);
            },
            NO_TAGS,
        );

        assert_eq!(bus.publish_async(private_message("block", "")).await.unwrap(), 1);
        // Let the only worker pick up the blocking job.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut accepted = 0;
        for n in 0..5 {
            accepted += bus
                .publish_async(private_message(&format!("x{n}"), ""))
                .await
                .unwrap();
        }
        assert_eq!(accepted, 1);
        assert_eq!(bus.dropped_jobs(), 4);

        gate.wait();
        timeout(Duration::from_secs(5), bus.wait_idle())
            .await
            .expect("timeout");
        assert_eq!(handled.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_spawn_policy_delivers_everything() {
        let bus = bus_with(1, 1, OverflowPolicy::Spawn);
        let handled = counting_subscriber(&bus, EventKind::GroupMessage);

        for n in 0..20 {
            assert_eq!(
                bus.publish_async(group_message(&format!("g{n}"), "")).await.unwrap(),
                1
            );
        }
        timeout(Duration::from_secs(5), bus.wait_idle())
            .await
            .expect("timeout");

        assert_eq!(handled.load(Ordering::SeqCst), 20);
        assert_eq!(bus.dropped_jobs(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_drains_accepted_jobs() {
        let bus = bus_with(2, 64, OverflowPolicy::Block);
        let handled = counting_subscriber(&bus, EventKind::GroupMessage);

        for n in 0..10 {
            bus.publish_async(group_message(&format!("g{n}"), "")).await.unwrap();
        }
        timeout(Duration::from_secs(5), bus.shutdown())
            .await
            .expect("timeout");

        assert_eq!(handled.load(Ordering::SeqCst), 10);
        assert!(bus.is_closed());
        assert_eq!(
            bus.publish_async(group_message("late", "")).await,
            Err(BusError::Closed)
        );
        // Synchronous delivery is unaffected.
        assert_eq!(bus.publish(group_message("sync", "")), 1);
    }

    #[tokio::test]
    async fn test_async_publish_without_subscribers_schedules_nothing() {
        let bus = EventBus::new();
        assert_eq!(bus.publish_async(group_message("g1", "")).await.unwrap(), 0);
        assert_eq!(bus.pending_jobs(), 0);
        assert_eq!(bus.events_published(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_during_publish_keeps_accepted_jobs() {
        let bus = Arc::new(bus_with(1, 1, OverflowPolicy::Block));
        let gate = Arc::new(Barrier::new(2));

        let g = Arc::clone(&gate);
        bus.subscribe(
            EventKind::GroupMessage,
            move |_| {
                g.wait();
            },
            NO_TAGS,
        );
        let handled: Vec<_> = (0..3)
            .map(|_| counting_subscriber(&bus, EventKind::PrivateMessage))
            .collect();

        // Occupy the only worker.
        bus.publish_async(group_message("block", "")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // First job fills the queue, the second waits for space.
        let publisher = {
            let bus = Arc::clone(&bus);
            tokio::spawn(async move { bus.publish_async(private_message("e1", "")).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let stopper = {
            let bus = Arc::clone(&bus);
            tokio::spawn(async move { bus.shutdown().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(bus.is_closed());

        gate.wait();
        assert_eq!(
            timeout(Duration::from_secs(5), publisher).await.expect("timeout").unwrap(),
            Err(BusError::Closed)
        );
        timeout(Duration::from_secs(5), stopper)
            .await
            .expect("timeout")
            .unwrap();

        let total: usize = handled.iter().map(|h| h.load(Ordering::SeqCst)).sum();
        assert_eq!(total, 2);
    }

    fn runtime() -> Runtime {
        Builder::new_current_thread().enable_all().build().unwrap()
    }

    #[test]
    fn test_bus_outlives_runtime() {
        let bus = EventBus::with_config(BusConfig::for_testing()).unwrap();
        let handled = counting_subscriber(&bus, EventKind::GroupMessage);

        let first = runtime();
        first.block_on(async {
            assert_eq!(bus.publish_async(group_message("g1", "")).await, Ok(1));
            bus.wait_idle().await;
        });
        drop(first);

        let second = runtime();
        second.block_on(async {
            assert_eq!(bus.publish_async(group_message("g2", "")).await, Ok(1));
            timeout(Duration::from_secs(5), bus.wait_idle())
                .await
                .expect("timeout");
        });

        assert_eq!(handled.load(Ordering::SeqCst), 2);
        assert!(!bus.is_closed());
    }
}
