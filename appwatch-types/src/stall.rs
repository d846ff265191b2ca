//! Primary-thread stall events.

use std::time::SystemTime;

/// A completed stall episode of the primary thread.
///
/// Produced exactly once per detected episode, at the moment the delayed
/// touch finally lands (never when the stall begins). Immutable once built.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StallEvent {
    /// How long the primary thread failed to process its touch, in seconds.
    pub duration_secs: f64,

    /// Wall-clock time at which the stall was resolved. For display and
    /// log correlation only; measurement uses monotonic uptime throughout.
    pub timestamp: SystemTime,

    /// Stack symbols of the primary thread, captured as the stall resolved.
    pub stack_symbols: Vec<String>,
}

impl StallEvent {
    /// Build an event resolved now.
    pub fn new(duration_secs: f64, stack_symbols: Vec<String>) -> Self {
        Self {
            duration_secs,
            timestamp: SystemTime::now(),
            stack_symbols,
        }
    }
}
