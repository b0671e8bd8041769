use serde::{Deserialize, Serialize};

use crate::engine::TuningHandle;

/// Clamps and pacing for the adaptive controller. Hot-swappable through the
/// tuning handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerBounds {
    pub min_refresh_ms: u64,
    pub max_refresh_ms: u64,
    pub min_decimation_factor: usize,
    pub max_decimation_factor: usize,
    /// Fraction of the refresh interval the consumer may spend processing.
    pub safety_margin: f64,
    /// Consecutive comfortable control periods required before raising
    /// fidelity again.
    pub headroom_periods: u32,
}

impl Default for ControllerBounds {
    fn default() -> Self {
        Self {
            min_refresh_ms: 33,
            max_refresh_ms: 1000,
            min_decimation_factor: 1,
            max_decimation_factor: 64,
            safety_margin: 0.9,
            headroom_periods: 3,
        }
    }
}

/// Direction the controller is currently leaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlBias {
    Steady,
    Degrading,
    Recovering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastAction {
    None,
    DegradedFactor,
    DegradedRefresh,
    RecoveredFactor,
    RecoveredRefresh,
}

/// Feedback loop that keeps consumer-side processing inside its time budget.
///
/// Runs on a coarse period, decoupled from sample and render cadence. When
/// the smoothed processing cost exceeds `refresh_interval * safety_margin`
/// it lowers fidelity one step (decimation factor first, refresh interval
/// second); after sustained headroom it cautiously raises fidelity one step
/// in the reverse order. At most one adjustment per period, never undoing the
/// previous period's action on the same parameter, and everything clamps to
/// the configured bounds. It cannot fail; at worst it parks at the lowest
/// fidelity.
pub struct AdaptiveController {
    tuning: TuningHandle,
    headroom_streak: u32,
    last_action: LastAction,
    bias: ControlBias,
}

impl AdaptiveController {
    pub fn new(tuning: TuningHandle) -> Self {
        Self {
            tuning,
            headroom_streak: 0,
            last_action: LastAction::None,
            bias: ControlBias::Steady,
        }
    }

    pub fn bias(&self) -> ControlBias {
        self.bias
    }

    /// One control step. `smoothed_cost_ms` is the EMA'd consumer frame cost;
    /// `None` (no frames yet) leaves everything alone.
    pub fn step(&mut self, smoothed_cost_ms: Option<f64>) {
        let Some(cost) = smoothed_cost_ms else {
            self.bias = ControlBias::Steady;
            self.last_action = LastAction::None;
            return;
        };
        let bounds = self.tuning.controller_bounds();
        let refresh = self.tuning.refresh_interval_ms();
        let budget = refresh as f64 * bounds.safety_margin;

        if cost > budget {
            self.headroom_streak = 0;
            self.bias = ControlBias::Degrading;
            self.degrade(&bounds, refresh);
        } else if cost < budget * 0.5 {
            self.headroom_streak += 1;
            if self.headroom_streak >= bounds.headroom_periods {
                self.headroom_streak = 0;
                self.bias = ControlBias::Recovering;
                self.recover(&bounds, refresh);
            } else {
                self.bias = ControlBias::Steady;
                self.last_action = LastAction::None;
            }
        } else {
            self.headroom_streak = 0;
            self.bias = ControlBias::Steady;
            self.last_action = LastAction::None;
        }
    }

    fn degrade(&mut self, bounds: &ControllerBounds, refresh: u64) {
        let factor = self.tuning.plotter_factor();
        if factor < bounds.max_decimation_factor && self.last_action != LastAction::RecoveredFactor
        {
            let next = (factor * 2).min(bounds.max_decimation_factor);
            self.tuning.set_plotter_factor(next);
            self.last_action = LastAction::DegradedFactor;
            log::debug!("controller: decimation factor {factor} -> {next}");
        } else if refresh < bounds.max_refresh_ms
            && self.last_action != LastAction::RecoveredRefresh
        {
            let next = (refresh + (refresh / 4).max(1)).min(bounds.max_refresh_ms);
            self.tuning.set_refresh_interval_ms(next);
            self.last_action = LastAction::DegradedRefresh;
            log::debug!("controller: refresh interval {refresh}ms -> {next}ms");
        } else {
            // Either parked at lowest fidelity or held back by the no-undo
            // rule; clearing the action frees next period.
            self.last_action = LastAction::None;
        }
    }

    fn recover(&mut self, bounds: &ControllerBounds, refresh: u64) {
        let factor = self.tuning.plotter_factor();
        if refresh > bounds.min_refresh_ms && self.last_action != LastAction::DegradedRefresh {
            let next = refresh
                .saturating_sub((refresh / 4).max(1))
                .max(bounds.min_refresh_ms);
            self.tuning.set_refresh_interval_ms(next);
            self.last_action = LastAction::RecoveredRefresh;
            log::debug!("controller: refresh interval {refresh}ms -> {next}ms");
        } else if factor > bounds.min_decimation_factor
            && self.last_action != LastAction::DegradedFactor
        {
            let next = (factor / 2).max(bounds.min_decimation_factor);
            self.tuning.set_plotter_factor(next);
            self.last_action = LastAction::RecoveredFactor;
            log::debug!("controller: decimation factor {factor} -> {next}");
        } else {
            self.last_action = LastAction::None;
        }
    }
}
