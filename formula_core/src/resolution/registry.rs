//! Explicit function and member tables
//!
//! Built once when a resolver is constructed. Lookups are keyed by
//! lower-cased name, and the spelling used at registration is kept for
//! diagnostics.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::evaluation::{EvalError, EvalResult};
use crate::resolution::resolver::{FunctionBinding, MemberGetter, PropertyBinding};
use crate::types::{FormulaType, Value};

/// Cost of passing an argument of type `from` to a parameter of type `to`
///
/// `None` means the argument is not accepted.
pub fn conversion_cost(from: &FormulaType, to: &FormulaType) -> Option<u32> {
    if from == to {
        return Some(0);
    }
    match (from, to) {
        (FormulaType::Integer, FormulaType::Double) => Some(1),
        (FormulaType::Char, FormulaType::Integer) => Some(1),
        (FormulaType::Char, FormulaType::Double) => Some(2),
        (_, FormulaType::Object) => Some(2),
        _ => None,
    }
}

/// Pick the cheapest applicable overload; ties go to the one registered first
pub fn select_overload<'a>(
    overloads: &'a [FunctionBinding],
    argument_types: &[FormulaType],
) -> Option<&'a FunctionBinding> {
    let mut best: Option<(u32, &FunctionBinding)> = None;
    for overload in overloads {
        if overload.parameter_types.len() != argument_types.len() {
            continue;
        }
        let cost = argument_types
            .iter()
            .zip(&overload.parameter_types)
            .map(|(argument, parameter)| conversion_cost(argument, parameter))
            .sum::<Option<u32>>();
        if let Some(cost) = cost {
            if best.map_or(true, |(best_cost, _)| cost < best_cost) {
                best = Some((cost, overload));
            }
        }
    }
    best.map(|(_, overload)| overload)
}

/// Free functions, static properties and registered types
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Vec<FunctionBinding>>,
    properties: HashMap<String, PropertyBinding>,
    types: HashMap<String, FormulaType>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one overload of a free function
    pub fn register<F>(
        &mut self,
        name: &str,
        parameter_types: Vec<FormulaType>,
        return_type: FormulaType,
        function: F,
    ) -> &mut Self
    where
        F: Fn(&[Value]) -> EvalResult<Value> + Send + Sync + 'static,
    {
        let binding = FunctionBinding::new(
            name,
            parameter_types,
            return_type,
            Arc::new(move |_, arguments| function(arguments)),
        );
        self.functions
            .entry(name.to_lowercase())
            .or_default()
            .push(binding);
        self
    }

    pub fn register_property<F>(&mut self, name: &str, value_type: FormulaType, getter: F) -> &mut Self
    where
        F: Fn() -> EvalResult<Value> + Send + Sync + 'static,
    {
        self.properties.insert(
            name.to_lowercase(),
            PropertyBinding::new(name, value_type, Arc::new(getter)),
        );
        self
    }

    /// Make a type reachable by name, e.g. `DateInterval.Month`
    pub fn register_type(&mut self, ty: FormulaType) -> &mut Self {
        self.types.insert(ty.name().to_lowercase(), ty);
        self
    }

    pub fn overloads(&self, name: &str) -> Option<&[FunctionBinding]> {
        self.functions
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
    }

    /// Whether any overload exists under `name`, ignoring signatures
    pub fn contains_function(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_lowercase())
    }

    pub fn resolve(&self, name: &str, argument_types: &[FormulaType]) -> Option<&FunctionBinding> {
        self.overloads(name)
            .and_then(|overloads| select_overload(overloads, argument_types))
    }

    pub fn property(&self, name: &str) -> Option<&PropertyBinding> {
        self.properties.get(&name.to_lowercase())
    }

    pub fn registered_type(&self, name: &str) -> Option<&FormulaType> {
        self.types.get(&name.to_lowercase())
    }

    /// Registered function names in their declared spelling, sorted
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .functions
            .values()
            .filter_map(|overloads| overloads.first())
            .map(|binding| binding.name.as_str())
            .collect();
        names.sort_unstable_by_key(|name| name.to_lowercase());
        names
    }

    pub fn function_count(&self) -> usize {
        self.functions.values().map(Vec::len).sum()
    }
}

/// A readable member of an allow-listed type
#[derive(Clone)]
pub struct MemberProperty {
    pub name: String,
    pub value_type: FormulaType,
    getter: MemberGetter,
}

impl MemberProperty {
    pub fn read(&self, target: &Value) -> EvalResult<Value> {
        (self.getter)(target)
    }
}

impl std::fmt::Debug for MemberProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberProperty")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct TypeMembers {
    properties: HashMap<String, MemberProperty>,
    methods: HashMap<String, Vec<FunctionBinding>>,
}

/// Per-type members, and the allow-list gating dot access
#[derive(Debug, Default)]
pub struct MemberTable {
    members: HashMap<FormulaType, TypeMembers>,
    readable: HashSet<FormulaType>,
    callable: HashSet<FormulaType>,
}

impl MemberTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Permit member reads on `ty`
    pub fn allow_reads(&mut self, ty: FormulaType) -> &mut Self {
        self.readable.insert(ty);
        self
    }

    /// Permit method calls on `ty`
    pub fn allow_calls(&mut self, ty: FormulaType) -> &mut Self {
        self.callable.insert(ty);
        self
    }

    pub fn can_read(&self, ty: &FormulaType) -> bool {
        self.readable.contains(ty)
    }

    pub fn can_call(&self, ty: &FormulaType) -> bool {
        self.callable.contains(ty)
    }

    pub fn add_property<F>(
        &mut self,
        ty: FormulaType,
        name: &str,
        value_type: FormulaType,
        getter: F,
    ) -> &mut Self
    where
        F: Fn(&Value) -> EvalResult<Value> + Send + Sync + 'static,
    {
        let property = MemberProperty {
            name: name.to_string(),
            value_type,
            getter: Arc::new(getter),
        };
        self.members
            .entry(ty)
            .or_default()
            .properties
            .insert(name.to_lowercase(), property);
        self
    }

    /// Register an instance method; the callable receives the target value
    pub fn add_method<F>(
        &mut self,
        ty: FormulaType,
        name: &str,
        parameter_types: Vec<FormulaType>,
        return_type: FormulaType,
        method: F,
    ) -> &mut Self
    where
        F: Fn(&Value, &[Value]) -> EvalResult<Value> + Send + Sync + 'static,
    {
        let binding = FunctionBinding::new(
            name,
            parameter_types,
            return_type,
            Arc::new(move |instance, arguments| match instance {
                Some(target) => method(target, arguments),
                None => Err(EvalError::type_mismatch()),
            }),
        );
        self.members
            .entry(ty)
            .or_default()
            .methods
            .entry(name.to_lowercase())
            .or_default()
            .push(binding);
        self
    }

    pub fn property(&self, ty: &FormulaType, name: &str) -> Option<&MemberProperty> {
        self.members
            .get(ty)
            .and_then(|members| members.properties.get(&name.to_lowercase()))
    }

    pub fn methods(&self, ty: &FormulaType, name: &str) -> Option<&[FunctionBinding]> {
        self.members
            .get(ty)
            .and_then(|members| members.methods.get(&name.to_lowercase()))
            .map(Vec::as_slice)
    }
}
