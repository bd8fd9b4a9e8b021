//! Log events produced by the pipeline stages

use super::codes::{self, Code};
use crate::utils::Span;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

pub use crate::config::runtime::LogLevel;

const UNCODED_WARNING: Code = Code::new("W000");
const UNCODED_INFO: Code = Code::new("I000");
const UNCODED_DEBUG: Code = Code::new("D000");

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    /// Character range in the formula the event refers to
    pub span: Option<Span>,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level,
            code,
            message: truncate_message(message),
            span: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, code, message)
    }

    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, UNCODED_WARNING, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, UNCODED_INFO, message)
    }

    /// Info-level event carrying a stage completion code
    pub fn success(code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, UNCODED_DEBUG, message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    /// Single-line rendering used by the console logger
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// One JSON object per event, used by the structured logger
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let code = self.code.as_str();
        let metadata = self.is_error().then(|| ErrorDetails {
            recoverable: codes::is_recoverable(code),
            requires_halt: codes::requires_halt(code),
            description: codes::get_description(code),
            recommended_action: codes::get_action(code),
        });

        serde_json::to_string(&JsonEvent {
            timestamp: self
                .timestamp
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            level: self.level.as_str(),
            code,
            message: &self.message,
            category: self.category(),
            severity: codes::get_severity(code).as_str(),
            error_metadata: metadata,
            span: self.span,
            context: &self.context,
        })
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - {}", self.level.as_str(), self.code, self.message)?;
        if let Some(span) = &self.span {
            write!(f, " at offset {}", span)?;
        }
        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            write!(f, " ({})", pairs.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ErrorDetails {
    recoverable: bool,
    requires_halt: bool,
    description: &'static str,
    recommended_action: &'static str,
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    timestamp: u64,
    level: &'static str,
    code: &'a str,
    message: &'a str,
    category: &'static str,
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_metadata: Option<ErrorDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<Span>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    context: &'a BTreeMap<String, String>,
}

fn truncate_message(message: &str) -> String {
    let limit = super::config::get_max_log_message_length();
    match message.char_indices().nth(limit) {
        None => message.to_string(),
        Some((cut, _)) => format!("{}...", &message[..cut]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::lexical::INVALID_CHARACTER, "Invalid character $");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E020");
        assert_eq!(event.category(), "Lexical");
    }

    #[test]
    fn test_success_event_is_info() {
        let event = LogEvent::success(codes::success::PARSE_COMPLETE, "Parsed");

        assert!(event.is_info());
        assert_eq!(event.code.as_str(), "I040");
    }

    #[test]
    fn test_format_includes_span_and_context() {
        let event = LogEvent::error(codes::syntax::UNEXPECTED_END, "Formula ended unexpectedly")
            .with_span(Span::point(3))
            .with_context("formula", "1 +")
            .with_context("depth", "1");

        assert_eq!(
            event.format(),
            "[ERROR] E041 - Formula ended unexpectedly at offset 3 (depth=1, formula=1 +)"
        );
    }

    #[test]
    fn test_format_json() {
        let event = LogEvent::error(codes::types::TYPE_MISMATCH, "type mismatch")
            .with_span(Span::at(2, 1));

        let json = event.format_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["code"], "E180");
        assert_eq!(parsed["span"]["start"], 2);
        assert_eq!(parsed["error_metadata"]["recoverable"], false);
        assert!(parsed.get("context").is_none());
    }

    #[test]
    fn test_info_json_has_no_error_metadata() {
        let json = LogEvent::info("ready").format_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["level"], "INFO");
        assert!(parsed.get("error_metadata").is_none());
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let limit = crate::logging::config::get_max_log_message_length();
        let event = LogEvent::info(&"x".repeat(limit + 10));
        assert_eq!(event.message.chars().count(), limit + 3);
        assert!(event.message.ends_with("..."));
    }
}
