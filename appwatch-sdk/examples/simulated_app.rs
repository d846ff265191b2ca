//! Example: Instrumenting a simulated application
//!
//! This example builds a toy host (a channel standing in for the primary
//! run loop, a synthetic clock and counters) and runs all three monitors
//! against it: the watchdog catches a deliberate 600 ms stall, the sampler
//! reports once-per-second readings, and the battery estimator smooths a
//! scripted drain.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example simulated_app
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use appwatch_sdk::{
    BatteryRateEstimator, ChargeState, Host, ResourceSampler, ThreadCpuSample, Uptime, Watchdog,
};

/// Minimal host: real monotonic clock, an mpsc channel as the primary-thread
/// queue, and scripted counters.
struct DemoHost {
    epoch: Instant,
    primary_tx: Mutex<mpsc::Sender<Box<dyn FnOnce() + Send>>>,
    battery_millis: AtomicU64, // scripted level, thousandths
}

impl DemoHost {
    fn new(primary_tx: mpsc::Sender<Box<dyn FnOnce() + Send>>) -> Self {
        Self {
            epoch: Instant::now(),
            primary_tx: Mutex::new(primary_tx),
            battery_millis: AtomicU64::new(800),
        }
    }
}

impl Host for DemoHost {
    fn uptime(&self) -> Uptime {
        Uptime::from_secs(self.epoch.elapsed().as_secs_f64())
    }

    fn post_to_primary(&self, task: Box<dyn FnOnce() + Send>) {
        let _ = self.primary_tx.lock().unwrap().send(task);
    }

    fn primary_stack_symbols(&self) -> Vec<String> {
        vec![
            "0   demo  0x0001 busy_work".to_string(),
            "1   demo  0x0002 primary_loop".to_string(),
            "2   demo  0x0003 main".to_string(),
        ]
    }

    fn thread_cpu_samples(&self) -> Vec<ThreadCpuSample> {
        vec![
            ThreadCpuSample { is_idle: false, busy_ratio: 0.12 },
            ThreadCpuSample { is_idle: false, busy_ratio: 0.03 },
            ThreadCpuSample { is_idle: true, busy_ratio: 0.5 },
        ]
    }

    fn process_memory_bytes(&self) -> u64 {
        180 * 1024 * 1024
    }

    fn device_memory_bytes(&self) -> u64 {
        4 * 1024 * 1024 * 1024
    }

    fn frontmost_view_description(&self) -> String {
        "DemoRootScreen".to_string()
    }

    fn battery_level(&self) -> f64 {
        self.battery_millis.load(Ordering::Relaxed) as f64 / 1000.0
    }

    fn charge_state(&self) -> ChargeState {
        ChargeState::Unplugged
    }
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let (primary_tx, primary_rx) = mpsc::channel::<Box<dyn FnOnce() + Send>>();
    let host = Arc::new(DemoHost::new(primary_tx));

    let watchdog = Watchdog::new(host.clone() as Arc<dyn Host>);
    watchdog.on_stall(|event| {
        println!(
            "observer saw stall: {:.0} ms, {} stack frames",
            event.duration_secs * 1000.0,
            event.stack_symbols.len()
        );
    });
    watchdog.start();

    let mut sampler = ResourceSampler::new(host.clone() as Arc<dyn Host>);
    sampler.on_reading(|reading, severity| {
        println!(
            "{:5.1} fps | cpu {:5.1}% | mem {:6.1} MB ({:4.1}%) -> {severity:?}",
            reading.fps, reading.cpu_percent, reading.memory_mb, reading.memory_percent
        );
    });
    sampler.start();

    let mut battery = BatteryRateEstimator::new(host.clone() as Arc<dyn Host>);
    battery.on_status(|text| println!("battery: {text}"));
    battery.start();

    // Primary "run loop": render at ~60 fps for four seconds, stalling
    // deliberately halfway through, draining posted tasks between frames.
    let frame = Duration::from_millis(16);
    let started = Instant::now();
    let mut stalled = false;
    let mut last_battery_sample = Instant::now();

    while started.elapsed() < Duration::from_secs(4) {
        while let Ok(task) = primary_rx.try_recv() {
            task();
        }

        sampler.on_frame(host.uptime());

        if !stalled && started.elapsed() > Duration::from_secs(2) {
            stalled = true;
            println!("-- primary thread blocking for 600 ms --");
            thread::sleep(Duration::from_millis(600));
        }

        if last_battery_sample.elapsed() > Duration::from_secs(1) {
            last_battery_sample = Instant::now();
            // Script a slow drain so the estimator has something to chew on.
            host.battery_millis.fetch_sub(2, Ordering::Relaxed);
            battery.sample();
        }

        thread::sleep(frame);
    }

    if let Some(event) = watchdog.latest_event() {
        println!(
            "latest recorded stall: {:.0} ms at {:?}",
            event.duration_secs * 1000.0,
            event.timestamp
        );
    }

    // Stop tears all monitor state down; latest_event is gone after this.
    battery.stop();
    sampler.stop();
    watchdog.stop();
}
