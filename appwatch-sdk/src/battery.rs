//! Battery drain/charge rate estimation.
//!
//! Battery level arrives as a noisy, infrequently-changing signal in
//! discrete steps. The estimator debounces sub-second updates and folds
//! accepted samples into an exponential moving average, producing a stable
//! "%/hour" figure plus a human status string.

use std::sync::Arc;

use appwatch_types::{ChargeState, Uptime};

use crate::host::Host;

/// Weight given to the newest accepted sample. Fixed, not adaptive.
const SMOOTHING_ALPHA: f64 = 0.3;

/// Samples closer together than this are level-update noise and never
/// contribute a rate.
const DEBOUNCE_SECS: f64 = 1.0;

type StatusCallback = Box<dyn FnMut(&str)>;

/// Smooths discrete battery-level samples into a drain/charge rate.
///
/// Drive [`sample`](Self::sample) from the host's level-change notification
/// and/or a coarse timer (the reference cadence is every five seconds);
/// the estimator pulls level, charge state, and uptime from the host on
/// each call. Single-threaded by construction: call everything from the
/// primary thread.
pub struct BatteryRateEstimator {
    host: Arc<dyn Host>,
    running: bool,
    last_level: Option<f64>,
    last_uptime: Option<Uptime>,
    smoothed_rate: Option<f64>,
    on_status: Option<StatusCallback>,
}

impl BatteryRateEstimator {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            host,
            running: false,
            last_level: None,
            last_uptime: None,
            smoothed_rate: None,
            on_status: None,
        }
    }

    /// Register the status-text observer. At most one listener; a second
    /// call replaces the first.
    pub fn on_status(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_status = Some(Box::new(callback));
    }

    /// The smoothed rate in percent per hour, positive while draining.
    /// Absent until two accepted samples exist.
    pub fn smoothed_rate(&self) -> Option<f64> {
        self.smoothed_rate
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin estimating: seeds the baseline from the current level and
    /// emits an initial status. Starting while running is a no-op.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        let level = self.host.battery_level();
        self.last_level = (level >= 0.0).then_some(level);
        self.last_uptime = Some(self.host.uptime());
        self.smoothed_rate = None;
        self.sample();
    }

    /// Stop and clear all estimation state. Idempotent.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.last_level = None;
        self.last_uptime = None;
        self.smoothed_rate = None;
    }

    /// Take one sample from the host and deliver the derived status text.
    /// Ignored while stopped.
    pub fn sample(&mut self) {
        if !self.running {
            return;
        }
        self.update_rate();
        let text = self.status_text();
        if let Some(callback) = self.on_status.as_mut() {
            callback(&text);
        }
    }

    /// Derive the display string from the current sensor state.
    ///
    /// The sign of the smoothed rate overrides an "unplugged" label: a level
    /// rising while the host still reports unplugged (sensor lag right after
    /// plugging in) reads as "Charge", not a negative drain.
    pub fn status_text(&self) -> String {
        let level = self.host.battery_level();
        if level < 0.0 {
            return "Unavailable".to_string();
        }
        let Some(smoothed) = self.smoothed_rate else {
            return "Calculating...".to_string();
        };
        let rate_text = format!("{:.2}%/h", smoothed.abs());
        match self.host.charge_state() {
            ChargeState::Charging | ChargeState::Full => format!("Charge {rate_text}"),
            ChargeState::Unplugged if smoothed >= 0.0 => format!("Drain {rate_text}"),
            ChargeState::Unplugged => format!("Charge {rate_text}"),
            ChargeState::Unknown => format!("Drain {rate_text}"),
        }
    }

    fn update_rate(&mut self) {
        let level = self.host.battery_level();
        if level < 0.0 {
            // Sensor gone: forget everything and recover on the next
            // successful sample.
            self.smoothed_rate = None;
            self.last_level = None;
            self.last_uptime = None;
            return;
        }

        let now = self.host.uptime();
        if let (Some(last_level), Some(last_uptime)) = (self.last_level, self.last_uptime) {
            let delta_secs = now.seconds_since(last_uptime);
            if delta_secs > DEBOUNCE_SECS {
                let delta_percent = (last_level - level) * 100.0;
                let hours = delta_secs / 3600.0;
                let rate = delta_percent / hours;
                self.smoothed_rate = Some(match self.smoothed_rate {
                    Some(prior) => prior * (1.0 - SMOOTHING_ALPHA) + rate * SMOOTHING_ALPHA,
                    None => rate,
                });
            }
        }

        // The baseline always moves, even when the debounce gate rejected
        // the rate computation.
        self.last_level = Some(level);
        self.last_uptime = Some(now);
    }
}
