//! Frame-driven resource sampler.
//!
//! The sampler is driven by the primary thread's own render callback: every
//! frame calls [`ResourceSampler::on_frame`] with the frame's uptime. That
//! keeps the per-tick work on the thread being rendered (cheap counting, not
//! the thing being measured for staleness) and makes the whole component
//! single-threaded by construction.

use std::sync::Arc;

use appwatch_types::{Reading, Severity, Uptime};
use tracing::warn;

use crate::host::Host;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Windows shorter than this never close; one reading per closed window.
const WINDOW_SECS: f64 = 1.0;

/// Minimum spacing between low-fps diagnostic captures.
const LOW_FPS_LOG_INTERVAL_SECS: f64 = 5.0;

/// Default fps below which a diagnostic capture is taken.
const DEFAULT_LOW_FPS_THRESHOLD: f64 = 70.0;

type ReadingCallback = Box<dyn FnMut(Reading, Severity)>;

/// Converts a high-frequency frame signal into once-per-second fps, CPU, and
/// memory readings with a severity classification.
///
/// Drive it from the render callback:
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use appwatch_sdk::{Host, ResourceSampler};
/// # fn demo(host: Arc<dyn Host>) {
/// let mut sampler = ResourceSampler::new(host.clone());
/// sampler.on_reading(|reading, severity| {
///     println!("{:.1} fps ({severity:?})", reading.fps);
/// });
/// sampler.start();
/// // ...per frame, on the primary thread:
/// sampler.on_frame(host.uptime());
/// # }
/// ```
pub struct ResourceSampler {
    host: Arc<dyn Host>,
    running: bool,
    frame_count: u32,
    window_start: Option<Uptime>,
    latest: Option<Reading>,
    on_reading: Option<ReadingCallback>,
    low_fps_threshold: f64,
    last_low_fps_log: Option<Uptime>,
}

impl ResourceSampler {
    /// Create a sampler with the default low-fps diagnostic threshold.
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            host,
            running: false,
            frame_count: 0,
            window_start: None,
            latest: None,
            on_reading: None,
            low_fps_threshold: DEFAULT_LOW_FPS_THRESHOLD,
            last_low_fps_log: None,
        }
    }

    /// Override the fps below which a diagnostic capture is taken.
    /// Takes effect from the next closed window.
    pub fn set_low_fps_threshold(&mut self, fps: f64) {
        self.low_fps_threshold = fps;
    }

    /// Register the reading observer. At most one listener; a second call
    /// replaces the first.
    pub fn on_reading(&mut self, callback: impl FnMut(Reading, Severity) + 'static) {
        self.on_reading = Some(Box::new(callback));
    }

    /// The most recently closed window's reading, if any since `start()`.
    pub fn latest(&self) -> Option<Reading> {
        self.latest
    }

    /// Whether the sampler is accepting frames.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Begin sampling. The first frame after start only primes the window;
    /// starting while running is a no-op.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.frame_count = 0;
        self.window_start = None;
        self.latest = None;
        self.last_low_fps_log = None;
    }

    /// Stop sampling and clear all window state. Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
        self.frame_count = 0;
        self.window_start = None;
        self.latest = None;
        self.last_low_fps_log = None;
    }

    /// Feed one frame callback. Call from the primary thread with the
    /// frame's monotonic timestamp.
    pub fn on_frame(&mut self, timestamp: Uptime) {
        if !self.running {
            return;
        }

        let Some(start) = self.window_start else {
            // Prime only: a reading here would be "1 frame / near-zero time".
            self.window_start = Some(timestamp);
            return;
        };

        self.frame_count += 1;
        let delta = timestamp.seconds_since(start);
        if delta < WINDOW_SECS {
            return;
        }

        let reading = self.close_window(delta);
        self.frame_count = 0;
        self.window_start = Some(timestamp);

        if reading.fps < self.low_fps_threshold {
            self.log_low_fps(reading.fps);
        }

        let severity = reading.severity();
        if let Some(callback) = self.on_reading.as_mut() {
            callback(reading, severity);
        }
    }

    fn close_window(&mut self, delta: f64) -> Reading {
        let fps = f64::from(self.frame_count) / delta;

        // A failed counter query yields zero for that metric only; the
        // window still closes.
        let cpu_percent = self
            .host
            .thread_cpu_samples()
            .iter()
            .filter(|sample| !sample.is_idle)
            .map(|sample| sample.busy_ratio * 100.0)
            .sum();

        let memory_mb = self.host.process_memory_bytes() as f64 / BYTES_PER_MB;
        let device_mb = self.host.device_memory_bytes() as f64 / BYTES_PER_MB;
        let memory_percent = if device_mb > 0.0 {
            memory_mb / device_mb * 100.0
        } else {
            0.0
        };

        let reading = Reading {
            fps,
            cpu_percent,
            memory_mb,
            memory_percent,
        };
        self.latest = Some(reading);
        reading
    }

    /// Capture diagnostic context for a slow window, at most once per
    /// [`LOW_FPS_LOG_INTERVAL_SECS`] so a sustained slow period cannot
    /// flood the log.
    fn log_low_fps(&mut self, fps: f64) {
        let now = self.host.uptime();
        if let Some(last) = self.last_low_fps_log {
            if now.seconds_since(last) < LOW_FPS_LOG_INTERVAL_SECS {
                return;
            }
        }
        self.last_low_fps_log = Some(now);

        let view = self.host.frontmost_view_description();
        let stack = self.host.primary_stack_symbols().join("\n");
        warn!(fps, view = %view, stack = %stack, "low fps");
    }
}
