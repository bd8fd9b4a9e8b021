//! Built-in function library
//!
//! Every function is registered explicitly into a [`FunctionRegistry`];
//! formulas can reach nothing else. Names are case-insensitive and
//! semantics follow the Visual Basic runtime functions of the same name.

pub mod control;
pub mod conversion;
pub mod dates;
pub mod format;
pub mod math;
pub mod text;

use chrono::NaiveDateTime;

use crate::evaluation::{EvalError, EvalResult};
use crate::resolution::{FunctionRegistry, MemberTable};
use crate::types::{DateInterval, FirstDayOfWeek, Value};

/// Register the whole library, its static properties and its enum types
pub fn register_all(registry: &mut FunctionRegistry) {
    control::register(registry);
    text::register(registry);
    dates::register(registry);
    conversion::register(registry);
    math::register(registry);
}

/// Register `DateTime` members and enum members, with their allow-list
pub fn register_members(members: &mut MemberTable) {
    dates::register_members(members);
}

// === ARGUMENT ACCESS ===
//
// Overload selection has already checked argument types against the
// declared parameters, so these only widen (Integer and Char to Double,
// Char to Integer) and reject anything else as a type mismatch.

pub(crate) fn argument(args: &[Value], index: usize) -> EvalResult<&Value> {
    args.get(index).ok_or_else(EvalError::type_mismatch)
}

pub(crate) fn text_arg(args: &[Value], index: usize) -> EvalResult<&str> {
    match argument(args, index)? {
        Value::Text(text) => Ok(text),
        Value::Nothing => Ok(""),
        _ => Err(EvalError::type_mismatch()),
    }
}

pub(crate) fn double_arg(args: &[Value], index: usize) -> EvalResult<f64> {
    match argument(args, index)? {
        Value::Double(d) => Ok(*d),
        Value::Integer(i) => Ok(f64::from(*i)),
        Value::Char(c) => Ok(f64::from(u32::from(*c))),
        _ => Err(EvalError::type_mismatch()),
    }
}

pub(crate) fn int_arg(args: &[Value], index: usize) -> EvalResult<i32> {
    match argument(args, index)? {
        Value::Integer(i) => Ok(*i),
        Value::Char(c) => Ok(u32::from(*c) as i32),
        _ => Err(EvalError::type_mismatch()),
    }
}

pub(crate) fn bool_arg(args: &[Value], index: usize) -> EvalResult<bool> {
    match argument(args, index)? {
        Value::Boolean(b) => Ok(*b),
        _ => Err(EvalError::type_mismatch()),
    }
}

pub(crate) fn date_arg(args: &[Value], index: usize) -> EvalResult<NaiveDateTime> {
    argument(args, index)?
        .as_date_time()
        .ok_or_else(EvalError::type_mismatch)
}

pub(crate) fn interval_arg(args: &[Value], index: usize) -> EvalResult<DateInterval> {
    argument(args, index)?
        .as_date_interval()
        .ok_or_else(EvalError::type_mismatch)
}

pub(crate) fn first_day_arg(args: &[Value], index: usize) -> EvalResult<FirstDayOfWeek> {
    argument(args, index)?
        .as_first_day_of_week()
        .ok_or_else(EvalError::type_mismatch)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::resolution::{ReferenceResolver, Resolver};
    use crate::types::{FormulaType, Value};

    /// Invoke a library function the way a formula would
    pub fn call(name: &str, args: &[Value]) -> crate::evaluation::EvalResult<Value> {
        let resolver = ReferenceResolver::new();
        let types: Vec<FormulaType> = args.iter().map(Value::formula_type).collect();
        resolver.resolve_function(name, &types)?.invoke(None, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_widening() {
        let args = [Value::Integer(3), Value::Char('A'), Value::text("x")];
        assert_eq!(double_arg(&args, 0).unwrap(), 3.0);
        assert_eq!(int_arg(&args, 1).unwrap(), 65);
        assert_eq!(double_arg(&args, 1).unwrap(), 65.0);
        assert_eq!(text_arg(&args, 2).unwrap(), "x");
        assert!(text_arg(&args, 0).is_err());
        assert!(int_arg(&args, 3).is_err());
    }

    #[test]
    fn test_registration_is_complete() {
        let mut registry = FunctionRegistry::new();
        register_all(&mut registry);
        for name in ["Iif", "Format", "DateAdd", "CInt", "Atan2", "TitleCase", "WeekdayName"] {
            assert!(registry.contains_function(name), "{} missing", name);
        }
        assert!(registry.property("Today").is_some());
        assert!(registry.registered_type("FirstDayOfWeek").is_some());
    }
}
