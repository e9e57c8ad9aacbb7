//! Utility functions and helpers for the monitoring proxy.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and secret scrubbing for log lines.

pub mod logging;
