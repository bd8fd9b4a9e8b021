//! Shared source-location helpers used by every pipeline stage.

pub mod span;

pub use span::{caret_line, Span, Spanned};
