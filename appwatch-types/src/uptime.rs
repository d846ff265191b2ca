//! Monotonic time representation.
//!
//! All instrumentation in appwatch measures elapsed time against a monotonic
//! uptime reference rather than the wall clock, so NTP adjustments and manual
//! clock changes never show up as phantom stalls or negative sample intervals.

/// Monotonic seconds since an arbitrary process-local origin.
///
/// Values are strictly increasing within one process run and are never
/// persisted; a fresh origin is established at process start. Comparing
/// uptimes from different processes (or runs) is meaningless.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Uptime(f64);

impl Uptime {
    /// Create from a seconds value.
    pub const fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// The raw seconds value.
    pub const fn seconds(&self) -> f64 {
        self.0
    }

    /// Elapsed seconds since an earlier uptime, clamped to zero.
    ///
    /// The clamp only matters for callers mixing uptimes from different
    /// sources; a single monotonic source never goes backwards.
    pub fn seconds_since(&self, earlier: Uptime) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

impl From<f64> for Uptime {
    fn from(secs: f64) -> Self {
        Self(secs)
    }
}
