//! Per-window resource readings.

use crate::Severity;

/// One closed sampling window's worth of resource metrics.
///
/// A reading is derived fresh every time the sampler closes a >= 1 second
/// frame window; nothing is accumulated across windows. All fields are
/// finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Frames rendered per second over the window.
    pub fps: f64,

    /// Sum of per-thread CPU busy percentages (can exceed 100 on multicore).
    pub cpu_percent: f64,

    /// Physical memory footprint of the process in megabytes.
    pub memory_mb: f64,

    /// Memory footprint as a percentage of total device memory.
    /// Zero when the device total is unknown.
    pub memory_percent: f64,
}

impl Reading {
    /// Overall severity: the worst of the fps, cpu, and memory classifications.
    pub fn severity(&self) -> Severity {
        Severity::for_fps(self.fps)
            .max(Severity::for_cpu_percent(self.cpu_percent))
            .max(Severity::for_memory_percent(self.memory_percent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_good_is_good() {
        let r = Reading {
            fps: 60.0,
            cpu_percent: 10.0,
            memory_mb: 100.0,
            memory_percent: 10.0,
        };
        assert_eq!(r.severity(), Severity::Good);
    }

    #[test]
    fn single_warn_metric_dominates_good_ones() {
        let r = Reading {
            fps: 50.0,
            cpu_percent: 50.0,
            memory_mb: 200.0,
            memory_percent: 40.0,
        };
        assert_eq!(r.severity(), Severity::Warn);
    }

    #[test]
    fn worst_of_three_wins() {
        let r = Reading {
            fps: 58.0,
            cpu_percent: 70.0,
            memory_mb: 900.0,
            memory_percent: 80.0,
        };
        assert_eq!(r.severity(), Severity::Bad);
    }

    #[test]
    fn default_reading_is_bad_fps() {
        // Zero fps classifies as Bad; an all-zero reading is not "healthy".
        assert_eq!(Reading::default().severity(), Severity::Bad);
    }
}
