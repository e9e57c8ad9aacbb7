//! Observability side of the proxy: log records and their delivery.
//!
//! # Components
//!
//! - `record`: The `LogRecord` built for each monitored call.
//! - `extract`: Prompt, system message and completion extraction per endpoint.
//! - `stream`: Folding streamed NDJSON/SSE responses into one value.
//! - `tokens`: 4-characters-per-token usage estimates.
//! - `sink`: Fire-and-forget delivery to the monitoring sink.

pub mod extract;
pub mod record;
pub mod sink;
pub mod stream;
pub mod tokens;

pub use record::{LogRecord, RequestTrace, ResponseTrace};
pub use sink::MonitorSink;
pub use stream::StreamFormat;
pub use tokens::TokenUsage;
