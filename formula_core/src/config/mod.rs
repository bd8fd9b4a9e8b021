//! Configuration: fixed compile-time limits and runtime user preferences.

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::{LoggingPreferences, ParserPreferences, RuntimeConfig};
