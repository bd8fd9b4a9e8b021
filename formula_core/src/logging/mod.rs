//! Global logging module
//!
//! Provides a process-wide structured logger and a macro interface. Nothing
//! is emitted until a host calls [`init_global_logging`] (or installs its own
//! service), so embedding the library without logging costs one atomic load
//! per log site.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::sync::{Arc, OnceLock};

// Re-export main types
pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, Logger, LoggingService, MemoryLogger, NullLogger, StructuredLogger,
};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging system from the configured preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    for code in ["ERR001", "E020", "E040", "E110", "E180", "E200"] {
        if codes::get_description(code) == "Unknown error" {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Install a caller-built service, e.g. a `MemoryLogger` sink in an
/// embedding host or test
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

/// Check if global logging is initialized
pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// MACRO SUPPORT
// ============================================================================

/// Build and dispatch an event. `build` only runs when a global logger is
/// installed, so context values are never formatted for a silent host.
pub fn emit<F>(build: F)
where
    F: FnOnce() -> LogEvent,
{
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(build());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Span;

    #[test]
    fn test_macros_are_noops_without_logger() {
        // Must not panic whether or not another test installed a logger
        crate::log_error!(codes::types::TYPE_MISMATCH, "type mismatch", "offset" => 3);
        crate::log_error!(codes::syntax::UNEXPECTED_END, "ended", span = Span::point(2));
        crate::log_success!(codes::success::PARSE_COMPLETE, "parsed");
        crate::log_info!("info", "formula" => "1 + 2");
        crate::log_warning!("warning");
        crate::log_debug!("debug", "depth" => 4);
    }
}
