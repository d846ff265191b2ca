//! Primary-thread responsiveness watchdog.
//!
//! A dedicated prober thread wakes every `ping_interval` and does two things:
//! it posts a fire-and-forget "touch" onto the primary thread that records
//! the current uptime into a shared atomic, and it measures how stale that
//! atomic has become (`lag`). A touch delayed past `threshold_secs` means the
//! primary thread is blocked or overloaded; when the delayed touch finally
//! lands, the completed episode is reported with the primary thread's stack.
//!
//! Only the closing transition reports: an application that stays stalled
//! forever never produces an event. This is an accepted property of the
//! probe, not a bug.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use appwatch_types::{StallEvent, Uptime};
use parking_lot::{Condvar, Mutex};
use tracing::{error, warn};

use crate::host::Host;

/// Tuning knobs for the watchdog, fixed at construction.
///
/// The prober's wakeups are subject to normal OS scheduling slack (on the
/// order of 20 ms); both defaults leave ample margin for that.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchdogConfig {
    /// Lag at or above this is a stall. Default 400 ms.
    pub threshold_secs: f64,
    /// How often the prober wakes to touch and measure. Default 100 ms.
    pub ping_interval: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            threshold_secs: 0.4,
            ping_interval: Duration::from_millis(100),
        }
    }
}

type StallCallback = Arc<dyn Fn(StallEvent) + Send + Sync>;

/// Probe state, owned exclusively by the prober thread's stack.
///
/// No other thread ever reads or writes this, so it needs no synchronization.
enum ProbeState {
    Healthy,
    Stalled { start: Uptime },
}

struct Inner {
    host: Arc<dyn Host>,
    config: WatchdogConfig,
    /// Uptime of the last touch that landed on the primary thread, as f64
    /// bits. Written by the primary thread, read by the prober; a single
    /// atomic scalar is the whole cross-thread surface.
    last_touch: AtomicU64,
    latest: Mutex<Option<StallEvent>>,
    on_stall: Mutex<Option<StallCallback>>,
}

impl Inner {
    fn seed_touch(&self) {
        let now = self.host.uptime();
        self.last_touch
            .store(now.seconds().to_bits(), Ordering::Relaxed);
    }

    fn tick(this: &Arc<Self>, state: &mut ProbeState) {
        // Fire-and-forget touch. If the primary thread is busy the write is
        // simply delayed; that delay is exactly the signal being measured.
        let touch = Arc::downgrade(this);
        this.host.post_to_primary(Box::new(move || {
            if let Some(inner) = touch.upgrade() {
                let now = inner.host.uptime();
                inner
                    .last_touch
                    .store(now.seconds().to_bits(), Ordering::Relaxed);
            }
        }));

        let now = this.host.uptime();
        let last_touch = Uptime::from_secs(f64::from_bits(this.last_touch.load(Ordering::Relaxed)));
        let lag = now.seconds_since(last_touch);

        match *state {
            ProbeState::Healthy => {
                if lag >= this.config.threshold_secs {
                    // Back-date the stall to the last confirmed responsive
                    // moment, not to the tick that noticed it.
                    *state = ProbeState::Stalled {
                        start: Uptime::from_secs(now.seconds() - lag),
                    };
                }
            }
            ProbeState::Stalled { start } => {
                if lag < this.config.threshold_secs {
                    *state = ProbeState::Healthy;
                    this.resolve_stall(now.seconds_since(start));
                }
            }
        }
    }

    fn resolve_stall(&self, duration_secs: f64) {
        let stack = self.host.primary_stack_symbols();
        let event = StallEvent::new(duration_secs, stack);
        *self.latest.lock() = Some(event.clone());

        warn!(
            duration_ms = (event.duration_secs * 1000.0).round() as u64,
            stack = %event.stack_symbols.join("\n"),
            "primary thread stall resolved"
        );

        let callback = self.on_stall.lock().clone();
        if let Some(callback) = callback {
            // Observers only ever hear about stalls on the primary thread.
            self.host.post_to_primary(Box::new(move || callback(event)));
        }
    }
}

#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    cv: Condvar,
}

struct Prober {
    signal: Arc<StopSignal>,
    thread: thread::JoinHandle<()>,
}

/// Detects episodes where the primary thread stops processing work within a
/// bounded time, and captures diagnostic context as each episode ends.
///
/// One logical watchdog per process: construct it once at startup and hand
/// it to whatever owns the instrumentation lifecycle.
///
/// # Example
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use appwatch_sdk::{Host, Watchdog};
/// # fn demo(host: Arc<dyn Host>) {
/// let watchdog = Watchdog::new(host);
/// watchdog.on_stall(|event| {
///     eprintln!("stall: {:.0} ms", event.duration_secs * 1000.0);
/// });
/// watchdog.start();
/// # }
/// ```
pub struct Watchdog {
    inner: Arc<Inner>,
    prober: Mutex<Option<Prober>>,
}

impl Watchdog {
    /// Create a watchdog with the default threshold and ping interval.
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self::with_config(host, WatchdogConfig::default())
    }

    /// Create a watchdog with explicit tuning. The configuration cannot be
    /// changed after construction; build a new watchdog to retune.
    pub fn with_config(host: Arc<dyn Host>, config: WatchdogConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                host,
                config,
                last_touch: AtomicU64::new(0f64.to_bits()),
                latest: Mutex::new(None),
                on_stall: Mutex::new(None),
            }),
            prober: Mutex::new(None),
        }
    }

    /// Register the stall observer. At most one listener; a second call
    /// replaces the first. The callback runs on the primary thread.
    pub fn on_stall(&self, callback: impl Fn(StallEvent) + Send + Sync + 'static) {
        *self.inner.on_stall.lock() = Some(Arc::new(callback));
    }

    /// The most recently resolved stall, if any since `start()`.
    pub fn latest_event(&self) -> Option<StallEvent> {
        self.inner.latest.lock().clone()
    }

    /// Whether the prober is currently running.
    pub fn is_running(&self) -> bool {
        self.prober.lock().is_some()
    }

    /// Start the background prober. A second start while running is a no-op.
    pub fn start(&self) {
        let mut prober = self.prober.lock();
        if prober.is_some() {
            return;
        }

        // Seed the touch so the first tick never sees a bogus huge lag.
        self.inner.seed_touch();
        *self.inner.latest.lock() = None;

        let signal = Arc::new(StopSignal::default());
        let inner = Arc::clone(&self.inner);
        let interval = self.inner.config.ping_interval;

        let thread = thread::Builder::new().name("appwatch-watchdog".into()).spawn({
            let signal = Arc::clone(&signal);
            move || {
                let mut state = ProbeState::Healthy;
                let mut stopped = signal.stopped.lock();
                while !*stopped {
                    let _ = signal.cv.wait_for(&mut stopped, interval);
                    if *stopped {
                        break;
                    }
                    Inner::tick(&inner, &mut state);
                }
            }
        });

        match thread {
            Ok(thread) => *prober = Some(Prober { signal, thread }),
            // Instrumentation must never take the host app down with it.
            Err(err) => error!("failed to spawn watchdog prober: {err}"),
        }
    }

    /// Stop the prober and clear all stall state.
    ///
    /// Blocks until the prober thread has exited, so no tick runs after this
    /// returns. Stopping when already stopped is a no-op.
    pub fn stop(&self) {
        let mut prober = self.prober.lock();
        if let Some(Prober { signal, thread }) = prober.take() {
            *signal.stopped.lock() = true;
            signal.cv.notify_one();
            let _ = thread.join();
        }
        *self.inner.latest.lock() = None;
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimHost;
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::AtomicUsize;

    const EPS: f64 = 1e-9;

    /// Drive the probe state machine by hand with a manual clock.
    fn tick(watchdog: &Watchdog, state: &mut ProbeState) {
        Inner::tick(&watchdog.inner, state);
    }

    #[test]
    fn healthy_stream_never_emits() {
        let host = SimHost::manual();
        let watchdog = Watchdog::new(host.clone() as Arc<dyn Host>);
        watchdog.inner.seed_touch();

        let mut state = ProbeState::Healthy;
        for _ in 0..50 {
            host.advance(0.1);
            tick(&watchdog, &mut state);
            // Responsive primary: every touch lands immediately.
            host.run_primary();
        }

        assert!(matches!(state, ProbeState::Healthy));
        assert!(watchdog.latest_event().is_none());
    }

    #[test]
    fn blocked_interval_emits_exactly_one_event() {
        let host = SimHost::manual();
        let watchdog = Watchdog::new(host.clone() as Arc<dyn Host>);
        watchdog.inner.seed_touch();

        let delivered = Arc::new(AtomicUsize::new(0));
        watchdog.on_stall({
            let delivered = delivered.clone();
            move |event| {
                assert!((event.duration_secs - 0.6).abs() < EPS);
                delivered.fetch_add(1, Ordering::Relaxed);
            }
        });

        let mut state = ProbeState::Healthy;

        // Last touch confirmed at t=0; primary blocked from here on.
        for _ in 0..5 {
            host.advance(0.1);
            tick(&watchdog, &mut state);
        }
        assert!(matches!(state, ProbeState::Stalled { .. }));
        assert!(
            watchdog.latest_event().is_none(),
            "no event until the stall resolves"
        );

        // Primary unblocks: queued touches land, latest carries uptime 0.5.
        host.run_primary();
        host.advance(0.1);
        tick(&watchdog, &mut state);

        assert!(matches!(state, ProbeState::Healthy));
        let event = watchdog.latest_event().expect("stall event");
        assert!((event.duration_secs - 0.6).abs() < EPS);
        assert!(!event.stack_symbols.is_empty());

        // Delivery is re-posted onto the primary thread.
        assert_eq!(delivered.load(Ordering::Relaxed), 0);
        host.run_primary();
        assert_eq!(delivered.load(Ordering::Relaxed), 1);

        // Staying healthy afterwards does not re-emit.
        for _ in 0..10 {
            host.advance(0.1);
            tick(&watchdog, &mut state);
            host.run_primary();
        }
        assert_eq!(delivered.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn stall_start_is_backdated_to_last_touch() {
        let host = SimHost::manual();
        let watchdog = Watchdog::new(host.clone() as Arc<dyn Host>);
        watchdog.inner.seed_touch();

        let mut state = ProbeState::Healthy;

        // Blocked for a full second before the prober even crosses the
        // threshold; the episode must still be measured from t=0.
        host.advance(1.0);
        tick(&watchdog, &mut state);
        match state {
            ProbeState::Stalled { start } => assert!((start.seconds() - 0.0).abs() < EPS),
            ProbeState::Healthy => panic!("expected stall"),
        }

        host.run_primary();
        host.advance(0.1);
        tick(&watchdog, &mut state);

        let event = watchdog.latest_event().expect("stall event");
        assert!((event.duration_secs - 1.1).abs() < EPS);
    }

    #[test]
    fn unresolved_stall_never_reports() {
        let host = SimHost::manual();
        let watchdog = Watchdog::new(host.clone() as Arc<dyn Host>);
        watchdog.inner.seed_touch();

        let mut state = ProbeState::Healthy;
        for _ in 0..100 {
            host.advance(0.1);
            tick(&watchdog, &mut state);
        }

        assert!(matches!(state, ProbeState::Stalled { .. }));
        assert!(watchdog.latest_event().is_none());
    }

    #[test]
    fn start_twice_is_noop_and_stop_clears_state() {
        let host = SimHost::manual();
        let watchdog = Watchdog::new(host.clone() as Arc<dyn Host>);

        watchdog.start();
        watchdog.start();
        assert!(watchdog.is_running());

        watchdog.stop();
        assert!(!watchdog.is_running());
        assert!(watchdog.latest_event().is_none());

        // Stop when stopped is a no-op.
        watchdog.stop();
        assert!(!watchdog.is_running());
    }

    #[test]
    fn no_tick_runs_after_stop_returns() {
        let host = SimHost::manual();
        let watchdog = Watchdog::with_config(
            host.clone() as Arc<dyn Host>,
            WatchdogConfig {
                threshold_secs: 0.4,
                ping_interval: Duration::from_millis(5),
            },
        );

        watchdog.start();
        thread::sleep(Duration::from_millis(50));
        watchdog.stop();

        // Whatever the prober queued before stop is drained here; after
        // that, nothing may ever be posted again.
        host.run_primary();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(host.pending_primary(), 0);
    }

    #[test]
    fn realtime_end_to_end_detects_one_stall() {
        let host = SimHost::realtime();
        let watchdog = Watchdog::with_config(
            host.clone() as Arc<dyn Host>,
            WatchdogConfig {
                threshold_secs: 0.1,
                ping_interval: Duration::from_millis(20),
            },
        );

        let events = Arc::new(Mutex::new(Vec::new()));
        watchdog.on_stall({
            let events = events.clone();
            move |event| events.lock().push(event)
        });

        // A pump thread standing in for the primary run loop.
        let blocked = Arc::new(AtomicBool::new(false));
        let done = Arc::new(AtomicBool::new(false));
        let pump = thread::spawn({
            let host = host.clone();
            let blocked = blocked.clone();
            let done = done.clone();
            move || {
                while !done.load(Ordering::Relaxed) {
                    if !blocked.load(Ordering::Relaxed) {
                        host.run_primary();
                    }
                    thread::sleep(Duration::from_millis(1));
                }
            }
        });

        watchdog.start();
        thread::sleep(Duration::from_millis(100));

        blocked.store(true, Ordering::Relaxed);
        thread::sleep(Duration::from_millis(300));
        blocked.store(false, Ordering::Relaxed);

        thread::sleep(Duration::from_millis(200));
        watchdog.stop();
        done.store(true, Ordering::Relaxed);
        pump.join().unwrap();

        let events = events.lock();
        assert_eq!(events.len(), 1, "exactly one stall episode");
        let duration = events[0].duration_secs;
        assert!(
            (0.1..2.0).contains(&duration),
            "duration {duration} out of range"
        );
    }
}
