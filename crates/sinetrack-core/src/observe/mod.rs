//! # Observability
//!
//! Structured logging for sinetrack via `tracing`. Library code only emits
//! events; applications decide where they go with [`init_logging`].
//!
//! | Level   | Emitted by                                            |
//! |---------|-------------------------------------------------------|
//! | `warn`  | Frames rejected by validation                         |
//! | `debug` | Analyzer construction, per-frame peak/track summaries |
//! | `trace` | Per-frame tracking step counts                        |
//!
//! ```rust,ignore
//! use sinetrack_core::observe::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development());
//! ```

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
