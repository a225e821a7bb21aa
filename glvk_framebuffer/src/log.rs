//! Logging facade for the framebuffer layer
//!
//! - Pluggable logger via the `Logger` trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - File and line information for ERROR entries

use colored::*;
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// # Example
///
/// ```no_run
/// use glvk_framebuffer::glvk::log::{Logger, LogEntry};
///
/// struct CaptureLogger;
///
/// impl Logger for CaptureLogger {
///     fn log(&self, entry: &LogEntry) {
///         eprintln!("{}", entry.message);
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// A single log record
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Time the entry was created
    pub timestamp: SystemTime,

    /// Source module (e.g. "glvk::Framebuffer", "glvk::vulkan")
    pub source: String,

    /// Message text
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-command detail (path decisions, barriers)
    Trace,

    /// Development information
    Debug,

    /// Important events
    Info,

    /// Rejected requests and potential issues
    Warn,

    /// Device failures (with file:line details)
    Error,
}

/// Console logger with colored output
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)` on stderr
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity_str = match entry.severity {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            eprintln!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity_str, source, entry.message, file, line
            );
        } else {
            println!("[{}] [{}] [{}] {}", timestamp, severity_str, source, entry.message);
        }
    }
}

// ===== GLOBAL LOGGER =====

static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

fn logger_slot() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

/// Install a custom logger, replacing the current one
pub fn set_logger<L: Logger + 'static>(logger: L) {
    if let Ok(mut slot) = logger_slot().write() {
        *slot = Box::new(logger);
    }
}

/// Restore the default console logger
pub fn reset_logger() {
    if let Ok(mut slot) = logger_slot().write() {
        *slot = Box::new(DefaultLogger);
    }
}

/// Log a message through the installed logger
pub fn log(severity: LogSeverity, source: &str, message: String) {
    dispatch(LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: source.to_string(),
        message,
        file: None,
        line: None,
    });
}

/// Log a message with file:line information
pub fn log_detailed(
    severity: LogSeverity,
    source: &str,
    message: String,
    file: &'static str,
    line: u32,
) {
    dispatch(LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: source.to_string(),
        message,
        file: Some(file),
        line: Some(line),
    });
}

fn dispatch(entry: LogEntry) {
    if let Ok(logger) = logger_slot().read() {
        logger.log(&entry);
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
///
/// ```no_run
/// glvk_framebuffer::fb_trace!("glvk::Framebuffer", "recorded {} nodes", 3);
/// ```
#[macro_export]
macro_rules! fb_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogSeverity::Trace, $source, format!($($arg)*))
    };
}

/// Log a DEBUG message
#[macro_export]
macro_rules! fb_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogSeverity::Debug, $source, format!($($arg)*))
    };
}

/// Log an INFO message
#[macro_export]
macro_rules! fb_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogSeverity::Info, $source, format!($($arg)*))
    };
}

/// Log a WARN message
#[macro_export]
macro_rules! fb_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log($crate::log::LogSeverity::Warn, $source, format!($($arg)*))
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! fb_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

// ===== ERROR MACROS =====

/// Log an ERROR and produce `Error::BackendError` with the same message
///
/// ```no_run
/// # use glvk_framebuffer::glvk::Result;
/// fn build() -> Result<()> {
///     Err(glvk_framebuffer::fb_err!("glvk::vulkan", "vkCreateFramebuffer failed: {}", -1))
/// }
/// ```
#[macro_export]
macro_rules! fb_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::error::Error::BackendError(message)
    }};
}

/// Log an ERROR and return `Err(Error::BackendError)`
#[macro_export]
macro_rules! fb_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::fb_err!($source, $($arg)*))
    };
}

/// Log a WARN and produce the named `Error` variant
///
/// ```no_run
/// let err = glvk_framebuffer::fb_warn_err!(InvalidOperation, "glvk::Framebuffer", "no read buffer");
/// ```
#[macro_export]
macro_rules! fb_warn_err {
    ($kind:ident, $source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::log::log($crate::log::LogSeverity::Warn, $source, message.clone());
        $crate::error::Error::$kind(message)
    }};
}

/// Log a WARN and return `Err` with the named `Error` variant
#[macro_export]
macro_rules! fb_bail_warn {
    ($kind:ident, $source:expr, $($arg:tt)*) => {
        return Err($crate::fb_warn_err!($kind, $source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
