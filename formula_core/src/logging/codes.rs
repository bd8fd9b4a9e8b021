//! Consolidated error codes and classification system
//!
//! Single source of truth for all diagnostic codes, their metadata, and
//! classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const INVALID_EXPONENT: Code = Code::new("E023");
    pub const INVALID_CHARACTER_LITERAL: Code = Code::new("E024");
    pub const FORMULA_TOO_LONG: Code = Code::new("E025");
}

/// Syntax error codes
pub mod syntax {
    use super::Code;

    pub const TRAILING_INPUT: Code = Code::new("E040");
    pub const UNEXPECTED_END: Code = Code::new("E041");
    pub const UNMATCHED_PARENTHESIS: Code = Code::new("E042");
    pub const MALFORMED_ARGUMENT_LIST: Code = Code::new("E043");
    pub const EXPECTING_IDENTIFIER: Code = Code::new("E044");
    pub const UNEXPECTED_TOKEN: Code = Code::new("E050");
    pub const MAX_RECURSION_DEPTH: Code = Code::new("E087");
}

/// Symbol binding error codes
pub mod binding {
    use super::Code;

    pub const UNKNOWN_IDENTIFIER: Code = Code::new("E110");
    pub const UNKNOWN_FUNCTION: Code = Code::new("E111");
    pub const SIGNATURE_MISMATCH: Code = Code::new("E112");
    pub const MEMBER_ACCESS_DENIED: Code = Code::new("E113");
    pub const UNKNOWN_MEMBER: Code = Code::new("E114");
}

/// Static type error codes
pub mod types {
    use super::Code;

    pub const TYPE_MISMATCH: Code = Code::new("E180");
}

/// Evaluation-time error codes
pub mod runtime {
    use super::Code;

    pub const NULL_MEMBER_ACCESS: Code = Code::new("E200");
    pub const CONVERSION_FAILURE: Code = Code::new("E201");
    pub const ARITHMETIC_FAILURE: Code = Code::new("E202");
    pub const FUNCTION_FAILURE: Code = Code::new("E203");
}

/// Success and progress codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const CONFIGURATION_LOADED: Code = Code::new("I005");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const PARSE_COMPLETE: Code = Code::new("I040");
    pub const VALIDATION_COMPLETE: Code = Code::new("I070");
    pub const EXECUTION_COMPLETE: Code = Code::new("I071");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

/// code, category, severity, recoverable, requires halt, description, action
type MetadataRow = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

#[rustfmt::skip]
const METADATA_TABLE: &[MetadataRow] = {
    use Severity::*;
    &[
        // System
        ("ERR001", "System", Critical, false, true,
            "Critical internal error",
            "File a bug report with the formula that triggered it"),
        ("ERR002", "System", Critical, false, true,
            "Initialization failure",
            "Check logging and configuration setup"),
        ("ERR003", "System", High, false, true,
            "Configuration could not be loaded",
            "Check the configuration file path and TOML syntax"),
        // Lexical
        ("E020", "Lexical", High, false, false,
            "Character is not valid in a formula",
            "Remove or quote the offending character"),
        ("E021", "Lexical", High, false, false,
            "String literal is not terminated",
            "Close the string with a double quote"),
        ("E022", "Lexical", High, false, false,
            "Integer literal is out of range",
            "Use a smaller value or a floating-point literal"),
        ("E023", "Lexical", High, false, false,
            "Exponent has no digits",
            "Add digits after the exponent marker"),
        ("E024", "Lexical", High, false, false,
            "Character literal must hold exactly one character",
            "Use a string literal or a single character before the c suffix"),
        ("E025", "Lexical", Critical, false, true,
            "Formula exceeds the maximum accepted length",
            "Split the formula or shorten it"),
        // Syntax
        ("E040", "Syntax", High, false, false,
            "Input continues after a complete expression",
            "Insert an operator or remove trailing input"),
        ("E041", "Syntax", High, false, false,
            "Formula ended before the expression was complete",
            "Complete the expression"),
        ("E042", "Syntax", High, false, false,
            "Parenthesis is not closed",
            "Add the matching closing parenthesis"),
        ("E043", "Syntax", High, false, false,
            "Argument list is malformed",
            "Separate arguments with commas and close with a parenthesis"),
        ("E044", "Syntax", High, false, false,
            "Identifier expected after member access",
            "Follow the dot with a member name"),
        ("E050", "Syntax", High, false, false,
            "Unexpected token",
            "Check the formula syntax near the reported offset"),
        ("E087", "Syntax", Critical, false, true,
            "Formula nesting exceeds the parser depth limit",
            "Simplify the formula or raise the configured depth limit"),
        // Binding
        ("E110", "Binding", High, false, false,
            "Identifier is not known to the resolver",
            "Check the spelling or define the identifier in the host"),
        ("E111", "Binding", High, false, false,
            "Function is not part of the function library",
            "Check the function name"),
        ("E112", "Binding", High, false, false,
            "No overload accepts the given arguments",
            "Check the argument count and types"),
        ("E113", "Binding", Critical, false, false,
            "Member access on a type outside the allow-list",
            "Only members of allow-listed types can be used"),
        ("E114", "Binding", High, false, false,
            "Member does not exist on the type",
            "Check the member name"),
        // Type
        ("E180", "Type", High, false, false,
            "Operand types are not valid for the operator",
            "Convert operands explicitly"),
        // Runtime
        ("E200", "Runtime", Medium, true, false,
            "Member accessed on a null value",
            "Guard the access with IsNothing or Iif"),
        ("E201", "Runtime", Medium, true, false,
            "Value conversion failed",
            "Check the input value format"),
        ("E202", "Runtime", Medium, true, false,
            "Arithmetic failure",
            "Check for division by zero or overflow"),
        ("E203", "Runtime", Medium, true, false,
            "Library function rejected its arguments",
            "Check the function's argument ranges"),
    ]
};

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        METADATA_TABLE
            .iter()
            .map(
                |&(code, category, severity, recoverable, requires_halt, description, action)| {
                    let metadata = ErrorMetadata {
                        code,
                        category,
                        severity,
                        recoverable,
                        requires_halt,
                        description,
                        recommended_action: action,
                    };
                    (code, metadata)
                },
            )
            .collect()
    })
}

fn lookup<T>(code: &str, default: T, field: impl FnOnce(&'static ErrorMetadata) -> T) -> T {
    registry().get(code).map_or(default, field)
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    registry().get(code)
}

/// Unregistered codes are treated as medium severity
pub fn get_severity(code: &str) -> Severity {
    lookup(code, Severity::Medium, |m| m.severity)
}

pub fn is_recoverable(code: &str) -> bool {
    lookup(code, true, |m| m.recoverable)
}

/// Whether the failure should stop a host from retrying the same formula
pub fn requires_halt(code: &str) -> bool {
    lookup(code, false, |m| m.requires_halt)
}

pub fn get_description(code: &str) -> &'static str {
    lookup(code, "Unknown error", |m| m.description)
}

pub fn get_action(code: &str) -> &'static str {
    lookup(code, "No specific action available", |m| m.recommended_action)
}

pub fn get_category(code: &str) -> &'static str {
    lookup(code, "Unknown", |m| m.category)
}
