//! # Concurrent Access
//!
//! Many callers hitting one topic, and many topics created at once.

#[cfg(test)]
mod tests {
    use super::super::{manual_retention_bus, payload};
    use futures::future::join_all;
    use sps_bus::{BusConfig, Databus, MessageBus};
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    const PUBLISHERS: usize = 12;
    const PER_PUBLISHER: usize = 100;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_publishers_single_subscriber() {
        let bus = Arc::new(
            Databus::with_config(BusConfig {
                queue_capacity: 100,
                retention_interval: Duration::from_millis(5),
            })
            .unwrap(),
        );
        bus.subscribe("top1", "sub1").await;

        let publishers = (0..PUBLISHERS).map(|p| {
            let bus = Arc::clone(&bus);
            tokio::spawn(async move {
                for i in 0..PER_PUBLISHER {
                    bus.publish("top1", payload(&format!("pub{p}"), i)).await;
                }
            })
        });
        let publishers = tokio::spawn(join_all(publishers));

        let total = PUBLISHERS * PER_PUBLISHER;
        let received = timeout(Duration::from_secs(10), async {
            let mut received = Vec::with_capacity(total);
            while received.len() < total {
                received.extend(bus.poll("top1", "sub1").await.unwrap());
                tokio::task::yield_now().await;
            }
            received
        })
        .await
        .expect("subscriber never caught up");

        for result in publishers.await.unwrap() {
            result.unwrap();
        }
        assert_eq!(received.len(), total);

        let unique: HashSet<_> = received.iter().collect();
        assert_eq!(unique.len(), total, "duplicate delivery");

        // Each publisher's own messages keep program order.
        let mut next: HashMap<String, usize> = HashMap::new();
        for msg in &received {
            let text = String::from_utf8(msg.to_vec()).unwrap();
            let (publisher, index) = text.rsplit_once('-').unwrap();
            let index: usize = index.parse().unwrap();
            let expected = next.entry(publisher.to_string()).or_insert(0);
            assert_eq!(index, *expected, "{publisher} out of order");
            *expected += 1;
        }
        assert!(bus.poll("top1", "sub1").await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_topics_created_concurrently() {
        let bus = Arc::new(manual_retention_bus());

        let tasks = (0..64).map(|t| {
            let bus = Arc::clone(&bus);
            tokio::spawn(async move {
                let topic = format!("topic-{}", t % 16);
                bus.subscribe(&topic, &format!("sub-{t}")).await;
                bus.publish(&topic, payload("m", t)).await;
            })
        });
        for result in join_all(tasks).await {
            result.unwrap();
        }

        assert_eq!(bus.len(), 16);
        let mut total = 0;
        for name in bus.topic_names() {
            total += bus.stats(&name).await.unwrap().sequence;
        }
        assert_eq!(total, 64);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_subscribers_each_see_everything() {
        let bus = Arc::new(manual_retention_bus());
        for s in 0..4 {
            bus.subscribe("t", &format!("s{s}")).await;
        }

        let pollers = (0..4).map(|s| {
            let bus = Arc::clone(&bus);
            tokio::spawn(async move {
                let name = format!("s{s}");
                let mut got = Vec::new();
                while got.len() < 300 {
                    got.extend(bus.poll("t", &name).await.unwrap());
                    bus.cleanup("t").await;
                    tokio::task::yield_now().await;
                }
                got
            })
        });
        let pollers = tokio::spawn(join_all(pollers));

        for i in 0..300 {
            bus.publish("t", payload("m", i)).await;
        }

        let expected: Vec<_> = (0..300).map(|i| payload("m", i)).collect();
        let results = timeout(Duration::from_secs(10), pollers)
            .await
            .expect("pollers never caught up")
            .unwrap();
        for got in results {
            assert_eq!(got.unwrap(), expected);
        }
    }
}
