//! Compiled formula facade
//!
//! [`Formula`] owns a parsed tree and drives it through validation and
//! execution against a resolver. This is the only layer that logs; nodes
//! and the resolver stay silent.

mod error;
pub mod output;

pub use error::{ErrorKind, FormulaError};
pub use output::FormulaOutput;

use std::fmt;

use crate::config::ParserPreferences;
use crate::evaluation::Node;
use crate::logging::codes;
use crate::resolution::Resolver;
use crate::types::{FormulaType, Value};
use crate::{log_debug, log_error, log_success};

/// A formula parsed once and evaluated any number of times
///
/// Bindings are cached inside the tree on first use, so a formula should
/// always be paired with the same resolver.
#[derive(Debug)]
pub struct Formula {
    source: String,
    root: Node,
}

impl Formula {
    pub fn compile(text: &str) -> Result<Self, FormulaError> {
        Self::compile_with(text, &ParserPreferences::default())
    }

    pub fn compile_with(text: &str, preferences: &ParserPreferences) -> Result<Self, FormulaError> {
        let root = crate::syntax::parse_with(text, preferences)?;
        Ok(Self {
            source: text.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Type-check the whole tree and bind every name
    pub fn validate(&self, resolver: &dyn Resolver) -> Result<(), FormulaError> {
        match self.root.validate(resolver) {
            Ok(()) => {
                log_success!(
                    codes::success::VALIDATION_COMPLETE,
                    "Formula validated",
                    "formula" => &self.source
                );
                Ok(())
            }
            Err(error) => {
                log_error!(error.error_code(), "Formula validation failed",
                    "formula" => &self.source,
                    "error" => &error,
                    "offset" => error.offset().map_or(-1, |offset| offset as i64)
                );
                Err(error.into())
            }
        }
    }

    pub fn result_type(&self, resolver: &dyn Resolver) -> Result<FormulaType, FormulaError> {
        Ok(self.root.result_type(resolver)?)
    }

    /// Run the tree; names not yet bound are resolved on the way
    pub fn execute(&self, resolver: &dyn Resolver) -> Result<Value, FormulaError> {
        match self.root.execute(resolver) {
            Ok(value) => {
                log_success!(
                    codes::success::EXECUTION_COMPLETE,
                    "Formula executed",
                    "formula" => &self.source,
                    "type" => value.formula_type()
                );
                Ok(value)
            }
            Err(error) => {
                log_error!(error.error_code(), "Formula execution failed",
                    "formula" => &self.source,
                    "error" => &error,
                    "offset" => error.offset().map_or(-1, |offset| offset as i64)
                );
                Err(error.into())
            }
        }
    }

    /// Validate, then execute
    pub fn evaluate(&self, resolver: &dyn Resolver) -> Result<Value, FormulaError> {
        self.validate(resolver)?;
        self.execute(resolver)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

/// Compile and evaluate in one step
pub fn evaluate(text: &str, resolver: &dyn Resolver) -> Result<Value, FormulaError> {
    log_debug!("Evaluating formula", "formula" => text);
    Formula::compile(text)?.evaluate(resolver)
}
