use sampleflow::queue::IngestQueue;
use std::sync::Arc;
use std::thread;

#[test]
fn saturation_keeps_the_most_recent_items() {
    let k = 10;
    let q = IngestQueue::new(k);
    for i in 0..(k + 5) {
        q.offer(i);
    }
    let drained = q.drain_all();
    assert_eq!(drained.len(), k);
    // The 5 oldest are gone; the rest survive in insertion order.
    assert_eq!(drained, (5..15).collect::<Vec<_>>());
    assert_eq!(q.dropped(), 5);
}

#[test]
fn drain_is_ordered_and_exhaustive() {
    let q = IngestQueue::new(8);
    for i in 0..5 {
        q.offer(i);
    }
    assert_eq!(q.drain_all(), vec![0, 1, 2, 3, 4]);
    assert!(q.drain_all().is_empty());
    assert!(q.is_empty());
}

#[test]
fn capacity_is_hot_swappable() {
    let q = IngestQueue::new(4);
    for i in 0..4 {
        q.offer(i);
    }
    q.set_capacity(8);
    q.offer(4);
    assert_eq!(q.len(), 5);
    assert_eq!(q.dropped(), 0);

    q.set_capacity(2);
    assert_eq!(q.drain_all(), vec![3, 4]);
    assert_eq!(q.dropped(), 3);
}

#[test]
fn every_offered_item_is_drained_or_counted_dropped() {
    let q = Arc::new(IngestQueue::new(64));
    let total = 10_000u64;

    let producer = {
        let q = q.clone();
        thread::spawn(move || {
            for i in 0..total {
                q.offer(i);
            }
        })
    };

    let mut received = 0u64;
    while !producer.is_finished() {
        received += q.drain_all().len() as u64;
    }
    producer.join().unwrap();
    received += q.drain_all().len() as u64;

    assert_eq!(received + q.dropped(), total);
}
