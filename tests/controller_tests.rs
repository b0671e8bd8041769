use std::sync::Arc;

use sampleflow::core::DecimationConfig;
use sampleflow::engine::{AdaptiveController, ControlBias, ControllerBounds, TuningHandle};
use sampleflow::queue::IngestQueue;

fn tuning(refresh_ms: u64, bounds: ControllerBounds) -> TuningHandle {
    TuningHandle::new(
        DecimationConfig::mean_only(500.0, 25.0),
        DecimationConfig::mean_only(500.0, 500.0), // plotter factor starts at 1
        Arc::new(IngestQueue::new(16)),
        bounds,
        refresh_ms,
    )
}

fn bounds() -> ControllerBounds {
    ControllerBounds {
        min_refresh_ms: 50,
        max_refresh_ms: 400,
        min_decimation_factor: 1,
        max_decimation_factor: 16,
        safety_margin: 0.9,
        headroom_periods: 3,
    }
}

#[test]
fn sustained_overload_converges_to_the_bound_and_holds() {
    let tuning = tuning(100, bounds());
    let mut controller = AdaptiveController::new(tuning.clone());

    let mut last_factor = tuning.plotter_factor();
    let mut last_refresh = tuning.refresh_interval_ms();
    for _ in 0..40 {
        controller.step(Some(10_000.0));
        let factor = tuning.plotter_factor();
        let refresh = tuning.refresh_interval_ms();
        // Fidelity only ever worsens under overload, within bounds.
        assert!(factor >= last_factor);
        assert!(refresh >= last_refresh);
        assert!(factor <= 16);
        assert!(refresh <= 400);
        last_factor = factor;
        last_refresh = refresh;
    }
    assert_eq!(tuning.plotter_factor(), 16);
    assert_eq!(tuning.refresh_interval_ms(), 400);
    assert_eq!(controller.bias(), ControlBias::Degrading);

    // Parked at lowest fidelity: further overload changes nothing.
    controller.step(Some(10_000.0));
    assert_eq!(tuning.plotter_factor(), 16);
    assert_eq!(tuning.refresh_interval_ms(), 400);
}

#[test]
fn one_adjustment_per_control_period() {
    let tuning = tuning(100, bounds());
    let mut controller = AdaptiveController::new(tuning.clone());

    controller.step(Some(10_000.0));
    // Only the decimation factor moved; the refresh interval waits its turn.
    assert_eq!(tuning.plotter_factor(), 2);
    assert_eq!(tuning.refresh_interval_ms(), 100);
}

#[test]
fn recovery_requires_sustained_headroom() {
    let tuning = tuning(100, bounds());
    let mut controller = AdaptiveController::new(tuning.clone());

    // Degrade once so there is something to recover.
    controller.step(Some(10_000.0));
    assert_eq!(tuning.plotter_factor(), 2);

    controller.step(Some(1.0));
    controller.step(Some(1.0));
    assert_eq!(tuning.refresh_interval_ms(), 100);
    assert_eq!(controller.bias(), ControlBias::Steady);

    // Third comfortable period in a row raises fidelity one step.
    controller.step(Some(1.0));
    assert_eq!(controller.bias(), ControlBias::Recovering);
    assert_eq!(tuning.refresh_interval_ms(), 75);
    assert_eq!(tuning.plotter_factor(), 2);
}

#[test]
fn never_undoes_its_own_last_action() {
    let mut b = bounds();
    b.max_decimation_factor = 1; // factor pinned, refresh is the only knob
    let tuning = tuning(100, b);
    let mut controller = AdaptiveController::new(tuning.clone());

    // Sustained headroom recovers the refresh interval toward its minimum.
    controller.step(Some(1.0));
    controller.step(Some(1.0));
    controller.step(Some(1.0));
    assert_eq!(tuning.refresh_interval_ms(), 75);

    // Overload in the very next period may not flip the same parameter back.
    controller.step(Some(10_000.0));
    assert_eq!(tuning.refresh_interval_ms(), 75);

    // A period later the degrade is allowed.
    controller.step(Some(10_000.0));
    assert!(tuning.refresh_interval_ms() > 75);
}

#[test]
fn no_measurements_means_no_change() {
    let tuning = tuning(100, bounds());
    let mut controller = AdaptiveController::new(tuning.clone());
    controller.step(None);
    assert_eq!(tuning.plotter_factor(), 1);
    assert_eq!(tuning.refresh_interval_ms(), 100);
    assert_eq!(controller.bias(), ControlBias::Steady);
}
