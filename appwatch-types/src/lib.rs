//! # appwatch-types
//!
//! Core types for application responsiveness and resource instrumentation.
//! This crate defines the plain data vocabulary shared between the appwatch
//! SDK and whatever renders its output (a HUD, a debug panel, a log sink).
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: all types work without any serialization framework
//! - **Optional serialization**: enable the `serde` feature when snapshots need to leave the process
//! - **Renderer agnostic**: readings and events carry numbers and text, never presentation
//!
//! ## Example
//!
//! ```rust
//! use appwatch_types::{Reading, Severity};
//!
//! let reading = Reading {
//!     fps: 50.0,
//!     cpu_percent: 50.0,
//!     memory_mb: 180.0,
//!     memory_percent: 40.0,
//! };
//!
//! // Worst-of-three policy: 50 fps is a warning even though cpu and memory are fine.
//! assert_eq!(reading.severity(), Severity::Warn);
//! ```

mod battery;
mod reading;
mod severity;
mod stall;
mod uptime;

pub use battery::*;
pub use reading::*;
pub use severity::*;
pub use stall::*;
pub use uptime::*;
