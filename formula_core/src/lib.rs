// Internal modules
pub mod config;
pub mod evaluation;
pub mod functions;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod resolution;
pub mod syntax;
pub mod tokens;
pub mod types;
pub mod utils;

// Re-export key types for library consumers
pub use config::{ParserPreferences, RuntimeConfig};
pub use evaluation::{EvalError, EvalResult, Node};
pub use lexical::{tokenize, LexerError};
pub use pipeline::{evaluate, ErrorKind, Formula, FormulaError};
pub use resolution::{FunctionRegistry, MemberTable, ReferenceResolver, Resolver};
pub use syntax::{parse, parse_with, SyntaxError};
pub use types::{FormulaType, Value};

// Re-export pipeline output for JSON consumers
pub use pipeline::output::FormulaOutput;
