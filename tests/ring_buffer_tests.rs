use sampleflow::buffers::RingBuffer;

#[test]
fn overwrite_evicts_exactly_the_oldest() {
    let capacity = 5;
    let mut rb = RingBuffer::new(capacity);
    for i in 0..=capacity {
        rb.append(i as f64, i as f64 * 100.0);
    }
    assert_eq!(rb.len(), capacity);

    let entries = rb.window(f64::NEG_INFINITY, f64::INFINITY);
    let ts: Vec<f64> = entries.iter().map(|e| e.0).collect();
    assert_eq!(ts, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    for (t, v) in entries {
        assert_eq!(v, t * 100.0);
    }
}

#[test]
fn window_is_inclusive_and_ordered() {
    let mut rb = RingBuffer::new(16);
    for i in 0..10 {
        rb.append(i as f64, i as f64);
    }
    let ts: Vec<f64> = rb.window(3.0, 6.0).iter().map(|e| e.0).collect();
    assert_eq!(ts, vec![3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn window_on_empty_or_disjoint_range() {
    let mut rb = RingBuffer::new(8);
    assert!(rb.window(0.0, 100.0).is_empty());

    rb.append(1.0, 1.0);
    assert!(rb.window(2.0, 3.0).is_empty());
    assert!(rb.window(5.0, 2.0).is_empty());
}

#[test]
fn latest_timestamp_tracks_appends() {
    let mut rb = RingBuffer::new(2);
    assert_eq!(rb.latest_timestamp(), None);
    rb.append(1.0, 0.0);
    rb.append(2.0, 0.0);
    rb.append(3.0, 0.0);
    assert_eq!(rb.latest_timestamp(), Some(3.0));
}

#[test]
fn window_spans_the_wrap_point() {
    let mut rb = RingBuffer::new(10);
    for i in 0..25 {
        rb.append(i as f64, 0.0);
    }
    // Entries 15..25 remain; ask for a window crossing the physical wrap.
    let ts: Vec<f64> = rb.window(17.0, 21.0).iter().map(|e| e.0).collect();
    assert_eq!(ts, vec![17.0, 18.0, 19.0, 20.0, 21.0]);
}
