//! Severity classification for resource readings.

/// Ordinal health classification of a metric, higher is worse.
///
/// The ordering is load-bearing: the displayed severity of a full
/// [`Reading`](crate::Reading) is the maximum across its sub-metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Metric is within its comfortable range.
    #[default]
    Good = 0,
    /// Metric is degraded but not yet user-hostile.
    Warn = 1,
    /// Metric is in the visibly-janky range.
    Bad = 2,
}

impl Severity {
    /// Classify a frames-per-second reading. Good at >= 55, Warn at >= 45.
    pub fn for_fps(fps: f64) -> Self {
        Self::classify(fps >= 55.0, fps >= 45.0)
    }

    /// Classify a whole-process CPU busy percentage. Good below 60, Warn below 85.
    pub fn for_cpu_percent(cpu: f64) -> Self {
        Self::classify(cpu < 60.0, cpu < 85.0)
    }

    /// Classify memory footprint as a percentage of device memory.
    /// Good below 50, Warn below 75.
    pub fn for_memory_percent(memory: f64) -> Self {
        Self::classify(memory < 50.0, memory < 75.0)
    }

    fn classify(good: bool, warn: bool) -> Self {
        if good {
            Severity::Good
        } else if warn {
            Severity::Warn
        } else {
            Severity::Bad
        }
    }
}
