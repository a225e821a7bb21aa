//! Error types for the framebuffer layer
//!
//! Completeness problems are not errors: they are reported through
//! `Framebuffer::check_status`. Operations on an incomplete framebuffer
//! fail with `InvalidOperation`.

use std::fmt;

/// Result type for framebuffer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Framebuffer layer errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Request is not valid for the current framebuffer state
    /// (clear value variant, filter/format combination, missing aspect, ...)
    InvalidOperation(String),

    /// Parameter out of range (draw buffer index, sample index, pack state)
    InvalidValue(String),

    /// Native handle or staging allocation failed
    OutOfMemory,

    /// The device API failed at build, record or submission time
    BackendError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            Error::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
            Error::OutOfMemory => write!(f, "Out of memory"),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
