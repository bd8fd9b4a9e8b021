//! The resolver contract and the bindings it hands back to the tree
//!
//! A resolver is the only thing the evaluator knows about the host. Every
//! lookup is case-insensitive. Bindings are cached by the node that asked
//! for them, so a resolver must answer the same way for the lifetime of a
//! tree.

use std::fmt;
use std::sync::Arc;

use crate::evaluation::{EvalError, EvalResult};
use crate::types::{FormulaType, Value};

/// Callable behind a function binding: `(instance, arguments)`
pub type NativeFunction = Arc<dyn Fn(Option<&Value>, &[Value]) -> EvalResult<Value> + Send + Sync>;

/// Reader behind a static property
pub type PropertyGetter = Arc<dyn Fn() -> EvalResult<Value> + Send + Sync>;

/// Reader behind an instance or enum member
pub type MemberGetter = Arc<dyn Fn(&Value) -> EvalResult<Value> + Send + Sync>;

/// A resolved function overload
#[derive(Clone)]
pub struct FunctionBinding {
    pub name: String,
    pub parameter_types: Vec<FormulaType>,
    pub return_type: FormulaType,
    function: NativeFunction,
}

impl FunctionBinding {
    pub fn new(
        name: impl Into<String>,
        parameter_types: Vec<FormulaType>,
        return_type: FormulaType,
        function: NativeFunction,
    ) -> Self {
        Self {
            name: name.into(),
            parameter_types,
            return_type,
            function,
        }
    }

    pub fn invoke(&self, instance: Option<&Value>, arguments: &[Value]) -> EvalResult<Value> {
        (self.function)(instance, arguments)
    }

    /// Signature in the form `Name(Int32, String) As Double`
    pub fn signature(&self) -> String {
        let parameters: Vec<&str> = self.parameter_types.iter().map(FormulaType::name).collect();
        format!(
            "{}({}) As {}",
            self.name,
            parameters.join(", "),
            self.return_type
        )
    }
}

impl fmt::Debug for FunctionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionBinding")
            .field("name", &self.name)
            .field("parameter_types", &self.parameter_types)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

/// A static, read-only property such as `Now`
#[derive(Clone)]
pub struct PropertyBinding {
    pub name: String,
    pub value_type: FormulaType,
    getter: PropertyGetter,
}

impl PropertyBinding {
    pub fn new(name: impl Into<String>, value_type: FormulaType, getter: PropertyGetter) -> Self {
        Self {
            name: name.into(),
            value_type,
            getter,
        }
    }

    pub fn read(&self) -> EvalResult<Value> {
        (self.getter)()
    }
}

impl fmt::Debug for PropertyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBinding")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}

/// What a bare identifier resolved to
#[derive(Debug, Clone)]
pub enum IdentifierBinding {
    Property(PropertyBinding),
    /// A registered type or enumeration, usable as a dot-access target
    Type(FormulaType),
}

pub trait Resolver {
    /// Resolve a free function by name and argument types
    fn resolve_function(
        &self,
        name: &str,
        argument_types: &[FormulaType],
    ) -> EvalResult<FunctionBinding>;

    /// Resolve an instance method of `declaring_type`
    fn resolve_member_function(
        &self,
        declaring_type: &FormulaType,
        name: &str,
        argument_types: &[FormulaType],
    ) -> EvalResult<FunctionBinding>;

    /// Resolve a bare identifier to a property or type; `None` defers to
    /// the host identifier queries
    fn resolve_identifier(&self, name: &str) -> EvalResult<Option<IdentifierBinding>>;

    /// Read a member off a runtime value or type reference
    fn get_member_value(&self, target: &Value, name: &str) -> EvalResult<Value>;

    /// Declared type of a member of `declaring_type`
    fn get_member_type(&self, declaring_type: &FormulaType, name: &str) -> EvalResult<FormulaType>;

    fn get_identifier_type(&self, name: &str) -> EvalResult<FormulaType> {
        Err(EvalError::unknown_identifier(name))
    }

    fn get_identifier_value(&self, name: &str) -> EvalResult<Value> {
        Err(EvalError::unknown_identifier(name))
    }

    /// Original spelling of a host identifier, for diagnostics
    fn get_case_sensitive_name(&self, name: &str) -> EvalResult<String> {
        Err(EvalError::unknown_identifier(name))
    }
}
