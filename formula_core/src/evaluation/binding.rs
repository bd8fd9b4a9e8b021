//! Nodes that bind to the resolver
//!
//! Each keeps a write-once slot for its binding. Slots are `OnceCell`s, so a
//! tree is confined to one thread; share formulas across threads by
//! compiling one tree per thread.

use std::cell::OnceCell;
use std::fmt;

use crate::evaluation::{EvalResult, Node};
use crate::resolution::{FunctionBinding, IdentifierBinding, Resolver};
use crate::types::{FormulaType, Value};

/// Fill `cell` with the result of `init` unless it already holds a value
fn cached<T>(cell: &OnceCell<T>, init: impl FnOnce() -> EvalResult<T>) -> EvalResult<&T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = init()?;
    Ok(cell.get_or_init(|| value))
}

/// A variable, static property, or registered type name
#[derive(Debug)]
pub struct Identifier {
    name: String,
    // `None` once resolved means the host owns the name
    binding: OnceCell<Option<IdentifierBinding>>,
    host_type: OnceCell<FormulaType>,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: OnceCell::new(),
            host_type: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_resolved(&self) -> bool {
        self.binding.get().is_some()
    }

    fn binding(&self, resolver: &dyn Resolver) -> EvalResult<Option<&IdentifierBinding>> {
        let binding = cached(&self.binding, || resolver.resolve_identifier(&self.name))?;
        Ok(binding.as_ref())
    }

    pub fn result_type(&self, resolver: &dyn Resolver) -> EvalResult<FormulaType> {
        match self.binding(resolver)? {
            Some(IdentifierBinding::Property(property)) => Ok(property.value_type.clone()),
            Some(IdentifierBinding::Type(ty)) => Ok(ty.clone()),
            None => cached(&self.host_type, || resolver.get_identifier_type(&self.name)).cloned(),
        }
    }

    pub fn execute(&self, resolver: &dyn Resolver) -> EvalResult<Value> {
        match self.binding(resolver)? {
            Some(IdentifierBinding::Property(property)) => property.read(),
            Some(IdentifierBinding::Type(ty)) => Ok(Value::Type(ty.clone())),
            None => resolver.get_identifier_value(&self.name),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A free function call, or a method call when reached through a dot
#[derive(Debug)]
pub struct FunctionCall {
    name: String,
    arguments: Vec<Node>,
    binding: OnceCell<FunctionBinding>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            arguments,
            binding: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[Node] {
        &self.arguments
    }

    pub fn is_resolved(&self) -> bool {
        self.binding.get().is_some()
    }

    /// Resolve against the free-function surface, or against
    /// `declaring_type`'s methods when one is given
    fn binding(
        &self,
        resolver: &dyn Resolver,
        declaring_type: Option<&FormulaType>,
    ) -> EvalResult<&FunctionBinding> {
        cached(&self.binding, || {
            let argument_types = self
                .arguments
                .iter()
                .map(|argument| argument.result_type(resolver))
                .collect::<EvalResult<Vec<_>>>()?;
            match declaring_type {
                Some(ty) => resolver.resolve_member_function(ty, &self.name, &argument_types),
                None => resolver.resolve_function(&self.name, &argument_types),
            }
        })
    }

    pub fn validate(
        &self,
        resolver: &dyn Resolver,
        declaring_type: Option<&FormulaType>,
    ) -> EvalResult<()> {
        for argument in &self.arguments {
            argument.validate(resolver)?;
        }
        self.binding(resolver, declaring_type)?;
        Ok(())
    }

    pub fn result_type(
        &self,
        resolver: &dyn Resolver,
        declaring_type: Option<&FormulaType>,
    ) -> EvalResult<FormulaType> {
        Ok(self.binding(resolver, declaring_type)?.return_type.clone())
    }

    /// Evaluate arguments left to right and invoke; `instance` is the
    /// target of a method call
    pub fn execute(&self, resolver: &dyn Resolver, instance: Option<&Value>) -> EvalResult<Value> {
        let declaring_type = instance.map(Value::formula_type);
        let binding = self.binding(resolver, declaring_type.as_ref())?;
        let values = self
            .arguments
            .iter()
            .map(|argument| argument.execute(resolver))
            .collect::<EvalResult<Vec<_>>>()?;
        binding.invoke(instance, &values)
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", argument)?;
        }
        write!(f, ")")
    }
}

/// Right-hand side of a dot
#[derive(Debug)]
pub enum Member {
    Property {
        name: String,
        value_type: OnceCell<FormulaType>,
    },
    Method(FunctionCall),
}

impl Member {
    pub fn property(name: impl Into<String>) -> Self {
        Member::Property {
            name: name.into(),
            value_type: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Member::Property { name, .. } => name,
            Member::Method(call) => call.name(),
        }
    }

    pub fn validate(&self, resolver: &dyn Resolver, declaring_type: &FormulaType) -> EvalResult<()> {
        match self {
            Member::Property { .. } => self.result_type(resolver, declaring_type).map(|_| ()),
            Member::Method(call) => call.validate(resolver, Some(declaring_type)),
        }
    }

    pub fn result_type(
        &self,
        resolver: &dyn Resolver,
        declaring_type: &FormulaType,
    ) -> EvalResult<FormulaType> {
        match self {
            Member::Property { name, value_type } => {
                cached(value_type, || resolver.get_member_type(declaring_type, name)).cloned()
            }
            Member::Method(call) => call.result_type(resolver, Some(declaring_type)),
        }
    }

    pub fn execute(&self, resolver: &dyn Resolver, target: &Value) -> EvalResult<Value> {
        match self {
            Member::Property { name, .. } => resolver.get_member_value(target, name),
            Member::Method(call) => call.execute(resolver, Some(target)),
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Property { name, .. } => write!(f, "{}", name),
            Member::Method(call) => write!(f, "{}", call),
        }
    }
}
