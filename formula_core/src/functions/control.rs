//! Conditional selection and null tests

use crate::functions::{argument, bool_arg};
use crate::resolution::FunctionRegistry;
use crate::types::{FormulaType, Value};

pub fn register(registry: &mut FunctionRegistry) {
    use FormulaType::{Boolean, Object};

    // Both branches are evaluated before the call, like any other argument
    registry.register("Iif", vec![Boolean, Object, Object], Object, |args| {
        let chosen = if bool_arg(args, 0)? { 1 } else { 2 };
        Ok(argument(args, chosen)?.clone())
    });

    registry.register("IsNothing", vec![Object], Boolean, |args| {
        Ok(Value::Boolean(argument(args, 0)?.is_nothing()))
    });
}

#[cfg(test)]
mod tests {
    use crate::functions::test_support::call;
    use crate::types::Value;

    #[test]
    fn test_iif() {
        let picked = call("Iif", &[Value::Boolean(true), Value::Integer(1), Value::text("b")]);
        assert_eq!(picked.unwrap(), Value::Integer(1));
        let picked = call("IIF", &[Value::Boolean(false), Value::Integer(1), Value::text("b")]);
        assert_eq!(picked.unwrap(), Value::text("b"));
    }

    #[test]
    fn test_is_nothing() {
        assert_eq!(call("IsNothing", &[Value::Nothing]).unwrap(), Value::Boolean(true));
        assert_eq!(call("isnothing", &[Value::text("")]).unwrap(), Value::Boolean(false));
    }
}
