//! Scripted host implementation for tests.
//!
//! The simulated primary thread is a queue the test drains by hand: leaving
//! touches queued is how a test blocks the "primary thread", and draining
//! them is how it unblocks it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use appwatch_types::{ChargeState, Uptime};
use parking_lot::Mutex;

use crate::host::{Host, ThreadCpuSample};

enum Clock {
    /// Advanced explicitly by the test.
    Manual(Mutex<f64>),
    /// Follows real elapsed time, for threaded end-to-end tests.
    Real(Instant),
}

pub(crate) struct SimHost {
    clock: Clock,
    primary: Mutex<VecDeque<Box<dyn FnOnce() + Send>>>,
    cpu: Mutex<Vec<ThreadCpuSample>>,
    process_memory: Mutex<u64>,
    device_memory: Mutex<u64>,
    battery: Mutex<f64>,
    charge: Mutex<ChargeState>,
    pub view_queries: AtomicUsize,
}

impl SimHost {
    pub fn manual() -> Arc<Self> {
        Arc::new(Self::with_clock(Clock::Manual(Mutex::new(0.0))))
    }

    pub fn realtime() -> Arc<Self> {
        Arc::new(Self::with_clock(Clock::Real(Instant::now())))
    }

    fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            primary: Mutex::new(VecDeque::new()),
            cpu: Mutex::new(Vec::new()),
            process_memory: Mutex::new(0),
            device_memory: Mutex::new(0),
            battery: Mutex::new(-1.0),
            charge: Mutex::new(ChargeState::Unknown),
            view_queries: AtomicUsize::new(0),
        }
    }

    pub fn advance(&self, secs: f64) {
        match &self.clock {
            Clock::Manual(now) => *now.lock() += secs,
            Clock::Real(_) => panic!("cannot advance a realtime clock"),
        }
    }

    /// Run every queued primary-thread task, in order. Returns how many ran.
    pub fn run_primary(&self) -> usize {
        let mut ran = 0;
        loop {
            // Pop outside the lock so tasks can post follow-up tasks.
            let task = self.primary.lock().pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    pub fn pending_primary(&self) -> usize {
        self.primary.lock().len()
    }

    pub fn set_cpu(&self, samples: Vec<ThreadCpuSample>) {
        *self.cpu.lock() = samples;
    }

    pub fn set_memory(&self, process_bytes: u64, device_bytes: u64) {
        *self.process_memory.lock() = process_bytes;
        *self.device_memory.lock() = device_bytes;
    }

    pub fn set_battery(&self, level: f64) {
        *self.battery.lock() = level;
    }

    pub fn set_charge(&self, state: ChargeState) {
        *self.charge.lock() = state;
    }
}

impl Host for SimHost {
    fn uptime(&self) -> Uptime {
        match &self.clock {
            Clock::Manual(now) => Uptime::from_secs(*now.lock()),
            Clock::Real(epoch) => Uptime::from_secs(epoch.elapsed().as_secs_f64()),
        }
    }

    fn post_to_primary(&self, task: Box<dyn FnOnce() + Send>) {
        self.primary.lock().push_back(task);
    }

    fn primary_stack_symbols(&self) -> Vec<String> {
        vec![
            "0   sim  0x0001 -[Primary runLoop]".to_string(),
            "1   sim  0x0002 main".to_string(),
        ]
    }

    fn thread_cpu_samples(&self) -> Vec<ThreadCpuSample> {
        self.cpu.lock().clone()
    }

    fn process_memory_bytes(&self) -> u64 {
        *self.process_memory.lock()
    }

    fn device_memory_bytes(&self) -> u64 {
        *self.device_memory.lock()
    }

    fn frontmost_view_description(&self) -> String {
        self.view_queries.fetch_add(1, Ordering::Relaxed);
        "SimRootView".to_string()
    }

    fn battery_level(&self) -> f64 {
        *self.battery.lock()
    }

    fn charge_state(&self) -> ChargeState {
        *self.charge.lock()
    }
}
