//! Validation layer messenger
//!
//! Compiled only with the `vulkan-validation` feature. Layer messages are
//! forwarded to the crate logger and counted per severity.

use ash::vk;
use glvk_framebuffer::log::{log, LogSeverity};
use colored::*;
use std::collections::HashMap;
use std::ffi::CStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Global debug configuration (shared across callbacks)
static DEBUG_CONFIG: Mutex<Option<Config>> = Mutex::new(None);

/// Global validation statistics (thread-safe atomic counters)
static VALIDATION_STATS: ValidationStatsTracker = ValidationStatsTracker::new();

/// Occurrences per message ID
static MESSAGE_TRACKER: Mutex<Option<HashMap<String, u32>>> = Mutex::new(None);

/// Lowest severity reported by the validation layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    ErrorsOnly,
    ErrorsAndWarnings,
    All,
}

impl DebugSeverity {
    pub(crate) fn to_vk(self) -> vk::DebugUtilsMessageSeverityFlagsEXT {
        match self {
            DebugSeverity::ErrorsOnly => vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            DebugSeverity::ErrorsAndWarnings => {
                vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
            }
            DebugSeverity::All => {
                vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                    | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
            }
        }
    }
}

/// Debug configuration for the callback
#[derive(Debug, Clone)]
pub struct Config {
    pub severity: DebugSeverity,
    pub panic_on_error: bool,
    pub enable_stats: bool,
}

/// Counts of validation messages received since device creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

struct ValidationStatsTracker {
    errors: AtomicU32,
    warnings: AtomicU32,
    info: AtomicU32,
    verbose: AtomicU32,
}

impl ValidationStatsTracker {
    const fn new() -> Self {
        Self {
            errors: AtomicU32::new(0),
            warnings: AtomicU32::new(0),
            info: AtomicU32::new(0),
            verbose: AtomicU32::new(0),
        }
    }

    fn get_stats(&self) -> ValidationStats {
        ValidationStats {
            errors: self.errors.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            info: self.info.load(Ordering::Relaxed),
            verbose: self.verbose.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.errors.store(0, Ordering::Relaxed);
        self.warnings.store(0, Ordering::Relaxed);
        self.info.store(0, Ordering::Relaxed);
        self.verbose.store(0, Ordering::Relaxed);
    }
}

/// Initialize debug configuration
pub fn init_debug_config(config: Config) {
    VALIDATION_STATS.reset();
    if let Ok(mut tracker) = MESSAGE_TRACKER.lock() {
        *tracker = Some(HashMap::new());
    }
    if let Ok(mut slot) = DEBUG_CONFIG.lock() {
        *slot = Some(config);
    }
}

/// Stop reporting; called before the messenger is destroyed
pub fn cleanup_debug_config() {
    if let Ok(mut slot) = DEBUG_CONFIG.lock() {
        *slot = None;
    }
}

/// Get current validation statistics
pub fn get_validation_stats() -> ValidationStats {
    VALIDATION_STATS.get_stats()
}

/// Print validation statistics report
pub fn print_validation_stats_report() {
    let stats = get_validation_stats();

    if stats.total() == 0 {
        println!("\n{}", "✓ No validation messages".green().bold());
        return;
    }

    println!("\n{}", "=== Validation Statistics Report ===".bright_blue().bold());
    if stats.errors > 0 {
        println!("  {} {}", "Errors:".red().bold(), stats.errors);
    }
    if stats.warnings > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), stats.warnings);
    }
    if stats.info > 0 {
        println!("  {} {}", "Info:".cyan(), stats.info);
    }
    if stats.verbose > 0 {
        println!("  {} {}", "Verbose:".bright_black(), stats.verbose);
    }
    println!("  {} {}", "Total:".white().bold(), stats.total());
    println!("{}\n", "====================================".bright_blue().bold());
}

/// Severity bucket of a validation message, with its statistics counter
fn classify(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> (LogSeverity, &'static AtomicU32) {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        (LogSeverity::Error, &VALIDATION_STATS.errors)
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        (LogSeverity::Warn, &VALIDATION_STATS.warnings)
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        (LogSeverity::Info, &VALIDATION_STATS.info)
    } else {
        (LogSeverity::Trace, &VALIDATION_STATS.verbose)
    }
}

fn message_category(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION) {
        "validation"
    } else if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) {
        "performance"
    } else {
        "general"
    }
}

/// Count one more occurrence of `message_id`, returning the running total
fn record_occurrence(message_id: &str) -> u32 {
    MESSAGE_TRACKER
        .lock()
        .ok()
        .map(|mut tracker| {
            let count = tracker
                .get_or_insert_with(HashMap::new)
                .entry(message_id.to_string())
                .or_insert(0);
            *count += 1;
            *count
        })
        .unwrap_or(1)
}

/// Borrow a C string owned by the validation layer, with a fallback for null
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string alive for `'a`.
unsafe fn layer_str<'a>(ptr: *const std::os::raw::c_char, fallback: &'a str) -> &'a str {
    if ptr.is_null() {
        fallback
    } else {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or("<invalid utf-8>")
    }
}

/// Vulkan debug messenger callback
///
/// Routes layer messages into the crate logger under the `glvk::vulkan::validation`
/// source. Repeats of a message ID are logged once with their running count.
pub unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    let Some(config) = DEBUG_CONFIG.lock().ok().and_then(|guard| guard.clone()) else {
        return vk::FALSE;
    };
    if p_callback_data.is_null() || !config.severity.to_vk().intersects(message_severity) {
        return vk::FALSE;
    }

    let callback_data = unsafe { *p_callback_data };
    let message_id = unsafe { layer_str(callback_data.p_message_id_name, "unnamed") };
    let message = unsafe { layer_str(callback_data.p_message, "") };

    let (severity, counter) = classify(message_severity);
    let occurrences = if config.enable_stats {
        counter.fetch_add(1, Ordering::Relaxed);
        record_occurrence(message_id)
    } else {
        1
    };

    // Power-of-two repeats only, so a message fired every frame stays readable
    if occurrences.is_power_of_two() {
        let repeat = if occurrences > 1 { format!(" (x{})", occurrences) } else { String::new() };
        log(
            severity,
            "glvk::vulkan::validation",
            format!("[{}] {}{}: {}", message_category(message_type), message_id, repeat, message),
        );
    }

    if config.panic_on_error && severity == LogSeverity::Error {
        panic!("Vulkan validation error {}: {}", message_id, message);
    }

    vk::FALSE
}
