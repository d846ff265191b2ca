//! The host capability boundary.
//!
//! Everything OS-specific (thread CPU accounting, memory footprints, stack
//! capture, battery sensors, the monotonic clock, and primary-thread
//! dispatch) is supplied by the embedding application through this trait.
//! Cross-platform abstraction of these counters is explicitly out of scope;
//! the SDK only defines the shape it consumes.

use appwatch_types::{ChargeState, Uptime};

/// CPU usage of a single thread, as reported by the OS scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThreadCpuSample {
    /// Whether the scheduler flags the thread as idle; idle threads are
    /// excluded from the process busy total.
    pub is_idle: bool,
    /// Busy fraction in 0..1 for the sampling period.
    pub busy_ratio: f64,
}

/// Capabilities the embedding application must provide.
///
/// The SDK calls these from both the primary thread and its own background
/// prober thread, so implementations must be `Send + Sync`.
pub trait Host: Send + Sync {
    /// Monotonic seconds since process start. Strictly increasing, immune
    /// to wall-clock adjustments.
    fn uptime(&self) -> Uptime;

    /// Schedule a task asynchronously on the primary (UI) thread.
    ///
    /// Fire-and-forget: if the primary thread is busy the task is simply
    /// delayed, which is exactly what the watchdog measures. Tasks must run
    /// in submission order.
    fn post_to_primary(&self, task: Box<dyn FnOnce() + Send>);

    /// Capture the primary thread's current stack symbols.
    ///
    /// When called from another thread this hops to the primary thread
    /// synchronously, blocking the caller until the capture is available.
    fn primary_stack_symbols(&self) -> Vec<String>;

    /// Per-thread CPU busy ratios for the process. Empty on query failure.
    fn thread_cpu_samples(&self) -> Vec<ThreadCpuSample>;

    /// Physical memory footprint of the process in bytes. Zero on failure.
    fn process_memory_bytes(&self) -> u64;

    /// Total physical memory of the device in bytes. Zero when unknown.
    fn device_memory_bytes(&self) -> u64;

    /// Identity of the frontmost view/screen, for low-fps diagnostics.
    fn frontmost_view_description(&self) -> String;

    /// Battery level as a fraction in 0..1. Negative when the sensor is
    /// unavailable.
    fn battery_level(&self) -> f64;

    /// Current charging state.
    fn charge_state(&self) -> ChargeState;
}
