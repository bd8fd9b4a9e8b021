//! Tree evaluation: typing, binding and execution
//!
//! Trees are built by [`crate::syntax`] and driven by the pipeline facade.
//! Nodes never log; failures propagate as [`EvalError`].

pub mod binding;
pub mod error;
pub mod node;
pub mod operators;

pub use binding::{FunctionCall, Identifier, Member};
pub use error::{EvalError, EvalResult};
pub use node::{Node, NodeKind, Operands};
