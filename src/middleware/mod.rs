//! Middleware layer.
//!
//! Cross-cutting concerns that wrap dispatch without touching handlers.
//!
//! - [`trace`]: per-request span with method, path, status and latency.

pub(crate) mod trace;
