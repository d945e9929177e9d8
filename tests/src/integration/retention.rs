//! # Retention Collector
//!
//! The collector keeps exactly `sequence - min_cursor` messages and never
//! trims below a live subscriber.

#[cfg(test)]
mod tests {
    use super::super::{manual_retention_bus, payload};
    use sps_bus::{BusConfig, Databus, MessageBus};
    use std::time::Duration;

    #[tokio::test]
    async fn test_retention_keeps_lagging_window() {
        let bus = manual_retention_bus();
        bus.subscribe("t", "slow").await;
        bus.subscribe("t", "fast").await;

        for i in 1..=3 {
            bus.publish("t", payload("m", i)).await;
        }
        bus.poll("t", "slow").await.unwrap();
        for i in 4..=7 {
            bus.publish("t", payload("m", i)).await;
        }
        bus.poll("t", "fast").await.unwrap();
        for i in 8..=10 {
            bus.publish("t", payload("m", i)).await;
        }

        // cursors 3 and 7 at sequence 10
        assert_eq!(bus.cleanup("t").await, 3);
        let stats = bus.stats("t").await.unwrap();
        assert_eq!(stats.sequence, 10);
        assert_eq!(stats.retained, 7);

        let expected: Vec<_> = (4..=10).map(|i| payload("m", i)).collect();
        assert_eq!(bus.poll("t", "slow").await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_retention_without_subscribers_empties_log() {
        let bus = manual_retention_bus();
        for i in 0..50 {
            bus.publish("t", payload("m", i)).await;
        }

        assert_eq!(bus.cleanup("t").await, 50);
        let stats = bus.stats("t").await.unwrap();
        assert_eq!(stats.retained, 0);
        assert_eq!(stats.sequence, 50);
    }

    #[tokio::test]
    async fn test_unsubscribe_releases_retention() {
        let bus = manual_retention_bus();
        bus.subscribe("t", "stuck").await;
        for i in 0..10 {
            bus.publish("t", payload("m", i)).await;
        }

        assert_eq!(bus.cleanup("t").await, 0);
        bus.unsubscribe("t", "stuck").await;
        assert_eq!(bus.cleanup("t").await, 10);
    }

    #[tokio::test]
    async fn test_cleanup_between_polls_loses_nothing() {
        let bus = manual_retention_bus();
        bus.subscribe("t", "a").await;
        bus.subscribe("t", "b").await;

        let mut got_a = Vec::new();
        let mut got_b = Vec::new();
        for i in 0..200 {
            bus.publish("t", payload("m", i)).await;
            if i % 3 == 0 {
                got_a.extend(bus.poll("t", "a").await.unwrap());
            }
            if i % 7 == 0 {
                got_b.extend(bus.poll("t", "b").await.unwrap());
            }
            if i % 5 == 0 {
                bus.cleanup("t").await;
            }
        }
        got_a.extend(bus.poll("t", "a").await.unwrap());
        got_b.extend(bus.poll("t", "b").await.unwrap());

        let expected: Vec<_> = (0..200).map(|i| payload("m", i)).collect();
        assert_eq!(got_a, expected);
        assert_eq!(got_b, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_retention() {
        let bus = Databus::with_config(BusConfig {
            queue_capacity: 32,
            retention_interval: Duration::from_secs(60),
        })
        .unwrap();
        bus.subscribe("t", "s").await;
        for i in 0..20 {
            bus.publish("t", payload("m", i)).await;
        }
        assert_eq!(bus.poll("t", "s").await.unwrap().len(), 20);
        assert_eq!(bus.stats("t").await.unwrap().retained, 20);

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(bus.stats("t").await.unwrap().retained, 0);
    }
}
