// src/error.rs
//
// Failures that cross component boundaries. Detection misses and probe
// overruns never show up here; they are folded into Option values,
// counters and booleans.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    /// The capture target is missing. Fatal at startup.
    #[error("window '{0}' not found")]
    NotFound(String),

    /// Bad enum text, bad ratio, malformed buffer. Never coerced.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
