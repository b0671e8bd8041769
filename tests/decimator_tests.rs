use sampleflow::core::DecimationConfig;
use sampleflow::pipeline::Decimator;

fn times(n: usize, rate: f64) -> Vec<f64> {
    (0..n).map(|i| i as f64 / rate).collect()
}

#[test]
fn factor_from_rates() {
    assert_eq!(DecimationConfig::mean_only(500.0, 25.0).factor(), 20);
    assert_eq!(DecimationConfig::mean_only(500.0, 500.0).factor(), 1);
    // A target above the source rate means "emit unchanged".
    assert_eq!(DecimationConfig::mean_only(100.0, 400.0).factor(), 1);
}

#[test]
fn exact_group_count_across_many_calls() {
    let mut dec = Decimator::new(DecimationConfig::mean_only(500.0, 25.0)); // N = 20
    let ts = times(2000, 500.0);
    let vs = vec![1.0; 2000];

    let mut total = 0;
    for chunk in ts.chunks(137).zip(vs.chunks(137)) {
        total += dec.process_block(chunk.0, chunk.1).len();
    }
    assert_eq!(total, 100);
    assert_eq!(dec.pending(), 0);
}

#[test]
fn group_split_across_calls_emits_once() {
    let n = 20;
    let mut dec = Decimator::new(DecimationConfig::mean_only(500.0, 25.0));
    let ts = times(n, 500.0);
    let vs: Vec<f64> = (0..n).map(|i| i as f64).collect();

    let first = dec.process_block(&ts[..n - 1], &vs[..n - 1]);
    assert!(first.is_empty());

    let second = dec.process_block(&ts[n - 1..], &vs[n - 1..]);
    assert_eq!(second.len(), 1);
    // Mean of 0..19 and the group's first raw timestamp.
    assert_eq!(second.means[0], 9.5);
    assert_eq!(second.timestamps[0], 0.0);
}

#[test]
fn envelope_over_group() {
    let config = DecimationConfig {
        source_rate_hz: 300.0,
        target_rate_hz: 100.0, // N = 3
        use_envelope: true,
        smoothing_alpha: None,
        spike_threshold: None,
    };
    let mut dec = Decimator::new(config);
    let block = dec.process_block(&[0.0, 0.01, 0.02], &[1.0, 5.0, 3.0]);
    assert_eq!(block.len(), 1);
    assert_eq!(block.means[0], 3.0);
    assert_eq!(block.mins.as_ref().unwrap()[0], 1.0);
    assert_eq!(block.maxs.as_ref().unwrap()[0], 5.0);
}

#[test]
fn smoothing_converges_monotonically() {
    let config = DecimationConfig {
        source_rate_hz: 100.0,
        target_rate_hz: 100.0, // N = 1, each sample is a group
        use_envelope: false,
        smoothing_alpha: Some(0.2),
        spike_threshold: None,
    };
    let mut dec = Decimator::new(config);

    // Seeded with the first mean.
    let seed = dec.process_block(&[0.0], &[0.0]);
    assert_eq!(seed.means[0], 0.0);

    let target = 10.0;
    let mut previous = 0.0;
    for i in 1..40 {
        let block = dec.process_block(&[i as f64 * 0.01], &[target]);
        let smoothed = block.means[0];
        assert!(smoothed > previous, "smoothed output must rise toward {target}");
        assert!(smoothed < target);
        previous = smoothed;
    }
    assert!((target - previous) < 0.1);
}

#[test]
fn spike_flag_from_envelope_range() {
    let config = DecimationConfig {
        source_rate_hz: 300.0,
        target_rate_hz: 100.0,
        use_envelope: true,
        smoothing_alpha: None,
        spike_threshold: Some(5.0),
    };
    let mut dec = Decimator::new(config);
    let block = dec.process_block(
        &[0.0, 0.01, 0.02, 0.03, 0.04, 0.05],
        &[0.0, 10.0, 0.0, 1.0, 1.0, 1.0],
    );
    assert_eq!(block.spikes.as_ref().unwrap(), &vec![true, false]);
}

#[test]
fn spike_flag_without_envelope_uses_previous_baseline() {
    let config = DecimationConfig {
        source_rate_hz: 100.0,
        target_rate_hz: 100.0,
        use_envelope: false,
        smoothing_alpha: None,
        spike_threshold: Some(2.0),
    };
    let mut dec = Decimator::new(config);
    // First group has no baseline and is never a spike.
    let first = dec.process_block(&[0.0], &[0.0]);
    assert_eq!(first.spikes.as_ref().unwrap(), &vec![false]);
    let second = dec.process_block(&[0.01], &[5.0]);
    assert_eq!(second.spikes.as_ref().unwrap(), &vec![true]);
}

#[test]
fn malformed_samples_are_skipped_individually() {
    let mut dec = Decimator::new(DecimationConfig::mean_only(100.0, 50.0)); // N = 2
    let block = dec.process_block(&[0.0, 0.01, 0.02], &[1.0, f64::NAN, 3.0]);
    assert_eq!(block.len(), 1);
    assert_eq!(block.means[0], 2.0);
}

#[test]
fn instances_are_independent() {
    let input_t = times(40, 100.0);
    let input_v: Vec<f64> = (0..40).map(|i| (i % 7) as f64).collect();

    let mut a = Decimator::new(DecimationConfig::mean_only(100.0, 25.0));
    let mut b = Decimator::new(DecimationConfig::mean_only(100.0, 10.0));
    let mut b_alone = Decimator::new(DecimationConfig::mean_only(100.0, 10.0));

    let _ = a.process_block(&input_t, &input_v);
    // Reconfiguring one decimator must never affect another's output.
    a.set_config(DecimationConfig::mean_only(100.0, 50.0));

    let from_b = b.process_block(&input_t, &input_v);
    let reference = b_alone.process_block(&input_t, &input_v);
    assert_eq!(from_b, reference);
}

#[test]
fn underflow_yields_empty_block() {
    let mut dec = Decimator::new(DecimationConfig::mean_only(500.0, 25.0));
    assert!(dec.process_block(&[], &[]).is_empty());
    assert!(dec.process_block(&[0.0], &[1.0]).is_empty());
    assert_eq!(dec.pending(), 1);
}
