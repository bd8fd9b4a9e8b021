//! Reference resolver over the built-in library
//!
//! Answers every query from tables built once at construction, plus a set
//! of host variables supplied by the caller.

use std::collections::HashMap;

use crate::evaluation::{EvalError, EvalResult};
use crate::functions;
use crate::resolution::registry::{select_overload, FunctionRegistry, MemberTable};
use crate::resolution::resolver::{FunctionBinding, IdentifierBinding, Resolver};
use crate::types::{FormulaType, Value};

#[derive(Debug)]
struct Variable {
    name: String,
    value: Value,
}

/// Resolver over a [`FunctionRegistry`], a [`MemberTable`] and host variables
#[derive(Debug)]
pub struct ReferenceResolver {
    registry: FunctionRegistry,
    members: MemberTable,
    variables: HashMap<String, Variable>,
}

impl ReferenceResolver {
    /// Resolver with the full built-in library and no host variables
    pub fn new() -> Self {
        let mut registry = FunctionRegistry::new();
        functions::register_all(&mut registry);
        let mut members = MemberTable::new();
        functions::register_members(&mut members);
        Self::with_tables(registry, members)
    }

    pub fn with_tables(registry: FunctionRegistry, members: MemberTable) -> Self {
        Self {
            registry,
            members,
            variables: HashMap::new(),
        }
    }

    pub fn with_variable(mut self, name: &str, value: Value) -> Self {
        self.set_variable(name, value);
        self
    }

    /// Bind or rebind a host variable
    ///
    /// Trees that already cached a binding keep their cached type; values are
    /// read fresh on every execution.
    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.variables.insert(
            name.to_lowercase(),
            Variable {
                name: name.to_string(),
                value,
            },
        );
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Value> {
        self.variables
            .remove(&name.to_lowercase())
            .map(|variable| variable.value)
    }

    /// Variable names in their original spelling, sorted
    pub fn variable_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.variables.values().map(|v| v.name.as_str()).collect();
        names.sort_unstable_by_key(|name| name.to_lowercase());
        names
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn members(&self) -> &MemberTable {
        &self.members
    }

    fn variable(&self, name: &str) -> EvalResult<&Variable> {
        self.variables
            .get(&name.to_lowercase())
            .ok_or_else(|| EvalError::unknown_identifier(name))
    }

    fn check_readable(&self, ty: &FormulaType) -> EvalResult<()> {
        if self.members.can_read(ty) {
            Ok(())
        } else {
            Err(EvalError::member_access_denied(ty))
        }
    }
}

impl Default for ReferenceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver for ReferenceResolver {
    fn resolve_function(
        &self,
        name: &str,
        argument_types: &[FormulaType],
    ) -> EvalResult<FunctionBinding> {
        match self.registry.overloads(name) {
            Some(overloads) => select_overload(overloads, argument_types)
                .cloned()
                .ok_or_else(|| EvalError::signature_mismatch(name)),
            None => Err(EvalError::unknown_function(name)),
        }
    }

    fn resolve_member_function(
        &self,
        declaring_type: &FormulaType,
        name: &str,
        argument_types: &[FormulaType],
    ) -> EvalResult<FunctionBinding> {
        if !self.members.can_call(declaring_type) {
            return Err(EvalError::member_access_denied(declaring_type));
        }
        match self.members.methods(declaring_type, name) {
            Some(overloads) => select_overload(overloads, argument_types)
                .cloned()
                .ok_or_else(|| {
                    EvalError::signature_mismatch(format!("{}.{}", declaring_type, name))
                }),
            None => Err(EvalError::unknown_member_function(name, declaring_type)),
        }
    }

    fn resolve_identifier(&self, name: &str) -> EvalResult<Option<IdentifierBinding>> {
        if let Some(property) = self.registry.property(name) {
            return Ok(Some(IdentifierBinding::Property(property.clone())));
        }
        if let Some(ty) = self.registry.registered_type(name) {
            return Ok(Some(IdentifierBinding::Type(ty.clone())));
        }
        Ok(None)
    }

    fn get_member_value(&self, target: &Value, name: &str) -> EvalResult<Value> {
        let ty = target.formula_type();
        self.check_readable(&ty)?;
        match self.members.property(&ty, name) {
            Some(property) => property.read(target),
            None => Err(EvalError::unknown_member(name, &ty)),
        }
    }

    fn get_member_type(&self, declaring_type: &FormulaType, name: &str) -> EvalResult<FormulaType> {
        self.check_readable(declaring_type)?;
        self.members
            .property(declaring_type, name)
            .map(|property| property.value_type.clone())
            .ok_or_else(|| EvalError::unknown_member(name, declaring_type))
    }

    fn get_identifier_type(&self, name: &str) -> EvalResult<FormulaType> {
        self.variable(name).map(|variable| variable.value.formula_type())
    }

    fn get_identifier_value(&self, name: &str) -> EvalResult<Value> {
        self.variable(name).map(|variable| variable.value.clone())
    }

    fn get_case_sensitive_name(&self, name: &str) -> EvalResult<String> {
        self.variable(name).map(|variable| variable.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use crate::types::{DateInterval, FirstDayOfWeek};

    #[test]
    fn test_free_function_resolution() {
        let resolver = ReferenceResolver::new();
        let binding = resolver
            .resolve_function("len", &[FormulaType::Text])
            .unwrap();
        assert_eq!(binding.return_type, FormulaType::Integer);

        assert_matches!(
            resolver.resolve_function("Len", &[FormulaType::Integer, FormulaType::Integer]),
            Err(EvalError::SignatureMismatch { ref name, .. }) if name == "Len"
        );
        assert_matches!(
            resolver.resolve_function("Nope", &[]),
            Err(EvalError::UnknownFunction { ref name, .. }) if name == "Nope"
        );
    }

    #[test]
    fn test_overload_by_argument_type() {
        let resolver = ReferenceResolver::new();
        let int = resolver
            .resolve_function("Abs", &[FormulaType::Integer])
            .unwrap();
        assert_eq!(int.return_type, FormulaType::Integer);
        let double = resolver
            .resolve_function("Abs", &[FormulaType::Double])
            .unwrap();
        assert_eq!(double.return_type, FormulaType::Double);
        let mixed = resolver
            .resolve_function("Max", &[FormulaType::Integer, FormulaType::Double])
            .unwrap();
        assert_eq!(mixed.return_type, FormulaType::Double);
    }

    #[test]
    fn test_identifier_order() {
        let resolver = ReferenceResolver::new().with_variable("now", Value::Integer(1));
        assert_matches!(
            resolver.resolve_identifier("NOW"),
            Ok(Some(IdentifierBinding::Property(ref p))) if p.value_type == FormulaType::DateTime
        );
        assert_matches!(
            resolver.resolve_identifier("dateinterval"),
            Ok(Some(IdentifierBinding::Type(FormulaType::DateInterval)))
        );
        assert_matches!(resolver.resolve_identifier("x"), Ok(None));
    }

    #[test]
    fn test_host_variables() {
        let mut resolver = ReferenceResolver::new()
            .with_variable("Price", Value::Double(9.5))
            .with_variable("Missing", Value::Nothing);

        assert_eq!(resolver.get_identifier_type("price").unwrap(), FormulaType::Double);
        assert_eq!(resolver.get_identifier_value("PRICE").unwrap(), Value::Double(9.5));
        assert_eq!(resolver.get_case_sensitive_name("price").unwrap(), "Price");
        assert_eq!(resolver.get_identifier_type("missing").unwrap(), FormulaType::Object);
        assert_eq!(resolver.variable_names(), vec!["Missing", "Price"]);

        resolver.set_variable("PRICE", Value::Integer(3));
        assert_eq!(resolver.get_identifier_value("price").unwrap(), Value::Integer(3));
        assert_eq!(resolver.remove_variable("price"), Some(Value::Integer(3)));
        assert_matches!(
            resolver.get_identifier_value("price"),
            Err(EvalError::UnknownIdentifier { ref name, .. }) if name == "price"
        );
    }

    #[test]
    fn test_member_allow_list() {
        let resolver = ReferenceResolver::new();
        assert_matches!(
            resolver.get_member_type(&FormulaType::Text, "Length"),
            Err(EvalError::MemberAccessDenied { ref type_name, .. }) if type_name == "String"
        );
        assert_matches!(
            resolver.resolve_member_function(&FormulaType::DateInterval, "ToString", &[]),
            Err(EvalError::MemberAccessDenied { .. })
        );
        assert_matches!(
            resolver.get_member_value(&Value::Integer(1), "Foo"),
            Err(EvalError::MemberAccessDenied { ref type_name, .. }) if type_name == "Int32"
        );
    }

    #[test]
    fn test_date_members() {
        let resolver = ReferenceResolver::new();
        assert_eq!(
            resolver.get_member_type(&FormulaType::DateTime, "year").unwrap(),
            FormulaType::Integer
        );
        assert_matches!(
            resolver.get_member_type(&FormulaType::DateTime, "Fortnight"),
            Err(EvalError::UnknownMember { ref member, .. }) if member == "Fortnight"
        );
        assert_matches!(
            resolver.resolve_member_function(&FormulaType::DateTime, "AddDays", &[]),
            Err(EvalError::SignatureMismatch { ref name, .. }) if name == "DateTime.AddDays"
        );
        assert_matches!(
            resolver.resolve_member_function(&FormulaType::DateTime, "Explode", &[]),
            Err(EvalError::UnknownMemberFunction { ref member, .. }) if member == "Explode"
        );
        let add_days = resolver
            .resolve_member_function(&FormulaType::DateTime, "adddays", &[FormulaType::Integer])
            .unwrap();
        assert_eq!(add_days.return_type, FormulaType::DateTime);
    }

    #[test]
    fn test_enum_members() {
        let resolver = ReferenceResolver::new();
        let month = resolver
            .get_member_value(&Value::Type(FormulaType::DateInterval), "month")
            .unwrap();
        assert_eq!(month, Value::date_interval(DateInterval::Month));

        let from_value = resolver
            .get_member_value(&Value::first_day_of_week(FirstDayOfWeek::Monday), "Friday")
            .unwrap();
        assert_eq!(from_value, Value::first_day_of_week(FirstDayOfWeek::Friday));
    }
}
