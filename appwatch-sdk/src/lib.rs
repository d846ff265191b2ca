//! # appwatch-sdk
//!
//! Runtime instrumentation for detecting responsiveness failures and
//! reporting live resource health in a running application.
//!
//! Three components share one shape: a periodic tick drives measurement,
//! state is carried between ticks, and a debounced or smoothed signal is
//! exposed to callers.
//!
//! - [`Watchdog`] probes the primary (UI) thread from a background thread
//!   and reports completed stall episodes with captured stacks.
//! - [`ResourceSampler`] folds a high-frequency render callback into
//!   once-per-second fps/cpu/memory readings with severity classification.
//! - [`BatteryRateEstimator`] smooths noisy discrete battery levels into a
//!   stable %/hour drain or charge rate.
//!
//! All OS-specific measurement goes through the injected [`Host`] capability;
//! this crate designs none of it. The instrumentation is deliberately
//! crash-proof: no component has a fallible public API, and sensor failures
//! surface as explicit unavailable states rather than errors.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use appwatch_sdk::{Host, Watchdog};
//!
//! fn install(host: Arc<dyn Host>) {
//!     let watchdog = Watchdog::new(host);
//!     watchdog.on_stall(|event| {
//!         eprintln!("stalled for {:.0} ms", event.duration_secs * 1000.0);
//!     });
//!     watchdog.start();
//! }
//! ```

mod battery;
mod host;
mod sampler;
mod watchdog;

#[cfg(test)]
mod sim;

pub use battery::BatteryRateEstimator;
pub use host::{Host, ThreadCpuSample};
pub use sampler::ResourceSampler;
pub use watchdog::{Watchdog, WatchdogConfig};

// Re-export types for convenience
pub use appwatch_types::{ChargeState, Reading, Severity, StallEvent, Uptime};
