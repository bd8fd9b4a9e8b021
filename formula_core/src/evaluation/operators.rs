//! Operator typing rules and value semantics
//!
//! The `check_*` functions are the validate-time rules; the value functions
//! mirror them at execution time and coerce through [`convert`] so a tree
//! executed without validation still behaves sensibly.

use std::cmp::Ordering;

use crate::evaluation::{EvalError, EvalResult};
use crate::tokens::RelationalOperator;
use crate::types::convert::{self, compare_text};
use crate::types::{FormulaType, Value};

// === TYPE RULES ===

pub fn check_boolean(ty: &FormulaType) -> EvalResult<()> {
    match ty {
        FormulaType::Boolean => Ok(()),
        _ => Err(EvalError::type_mismatch()),
    }
}

pub fn check_numeric(ty: &FormulaType) -> EvalResult<()> {
    if ty.is_numeric() {
        Ok(())
    } else {
        Err(EvalError::type_mismatch())
    }
}

/// Addition also accepts text, which turns it into concatenation
pub fn check_addend(ty: &FormulaType) -> EvalResult<()> {
    match ty {
        FormulaType::Integer | FormulaType::Double | FormulaType::Text => Ok(()),
        _ => Err(EvalError::type_mismatch()),
    }
}

pub fn check_integer(ty: &FormulaType) -> EvalResult<()> {
    match ty {
        FormulaType::Integer => Ok(()),
        _ => Err(EvalError::type_mismatch()),
    }
}

pub fn check_comparable(operator: RelationalOperator, ty: &FormulaType) -> EvalResult<()> {
    if operator == RelationalOperator::Is || ty.is_primitive() {
        Ok(())
    } else {
        Err(EvalError::type_mismatch())
    }
}

pub fn addition_type(left: &FormulaType, right: &FormulaType) -> FormulaType {
    if *left == FormulaType::Text || *right == FormulaType::Text {
        FormulaType::Text
    } else {
        numeric_type(left, right)
    }
}

/// Double if either side is a double, otherwise integer
pub fn numeric_type(left: &FormulaType, right: &FormulaType) -> FormulaType {
    if *left == FormulaType::Double || *right == FormulaType::Double {
        FormulaType::Double
    } else {
        FormulaType::Integer
    }
}

// === VALUE SEMANTICS ===

pub fn as_boolean(value: &Value) -> EvalResult<bool> {
    match value {
        Value::Boolean(b) => Ok(*b),
        _ => Err(EvalError::type_mismatch()),
    }
}

fn as_integer(value: &Value) -> EvalResult<i32> {
    match value {
        Value::Integer(i) => Ok(*i),
        _ => Err(EvalError::type_mismatch()),
    }
}

fn either_text(left: &Value, right: &Value) -> bool {
    matches!(left, Value::Text(_)) || matches!(right, Value::Text(_))
}

fn either_double(left: &Value, right: &Value) -> bool {
    matches!(left, Value::Double(_)) || matches!(right, Value::Double(_))
}

fn either_integer(left: &Value, right: &Value) -> bool {
    matches!(left, Value::Integer(_)) || matches!(right, Value::Integer(_))
}

pub fn concatenate(left: &Value, right: &Value) -> Value {
    let mut text = left.to_text();
    text.push_str(&right.to_text());
    Value::Text(text)
}

pub fn add(left: &Value, right: &Value) -> EvalResult<Value> {
    if either_text(left, right) {
        Ok(concatenate(left, right))
    } else if either_double(left, right) {
        Ok(Value::Double(convert::to_double(left)? + convert::to_double(right)?))
    } else {
        Ok(Value::Integer(
            convert::to_int32(left)?.wrapping_add(convert::to_int32(right)?),
        ))
    }
}

pub fn subtract(left: &Value, right: &Value) -> EvalResult<Value> {
    if either_double(left, right) {
        Ok(Value::Double(convert::to_double(left)? - convert::to_double(right)?))
    } else {
        Ok(Value::Integer(
            convert::to_int32(left)?.wrapping_sub(convert::to_int32(right)?),
        ))
    }
}

pub fn multiply(left: &Value, right: &Value) -> EvalResult<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a.wrapping_mul(*b))),
        _ => Ok(Value::Double(convert::to_double(left)? * convert::to_double(right)?)),
    }
}

/// `/` always produces a double
pub fn divide(left: &Value, right: &Value) -> EvalResult<Value> {
    Ok(Value::Double(convert::to_double(left)? / convert::to_double(right)?))
}

/// `\` truncates toward zero
pub fn integer_divide(left: &Value, right: &Value) -> EvalResult<Value> {
    let (dividend, divisor) = (as_integer(left)?, as_integer(right)?);
    if divisor == 0 {
        return Err(EvalError::divide_by_zero());
    }
    dividend
        .checked_div(divisor)
        .map(Value::Integer)
        .ok_or_else(EvalError::overflow)
}

/// Remainder of truncating division; takes the sign of the dividend
pub fn modulo(left: &Value, right: &Value) -> EvalResult<Value> {
    let (dividend, divisor) = (as_integer(left)?, as_integer(right)?);
    if divisor == 0 {
        return Err(EvalError::divide_by_zero());
    }
    dividend
        .checked_rem(divisor)
        .map(Value::Integer)
        .ok_or_else(EvalError::overflow)
}

pub fn negate(value: &Value) -> EvalResult<Value> {
    match value {
        Value::Integer(i) => Ok(Value::Integer(i.wrapping_neg())),
        Value::Double(d) => Ok(Value::Double(-d)),
        _ => Err(EvalError::type_mismatch()),
    }
}

/// Doubles order with NaN below every number and equal to itself
fn compare_doubles(left: f64, right: f64) -> Ordering {
    left.partial_cmp(&right)
        .unwrap_or_else(|| left.is_nan().cmp(&right.is_nan()).reverse())
}

/// Three-way comparison with text, then double, then integer promotion
pub fn compare(left: &Value, right: &Value) -> EvalResult<Ordering> {
    if either_text(left, right) {
        Ok(compare_text(&left.to_text(), &right.to_text()))
    } else if either_double(left, right) {
        Ok(compare_doubles(
            convert::to_double(left)?,
            convert::to_double(right)?,
        ))
    } else if either_integer(left, right) {
        Ok(convert::to_int32(left)?.cmp(&convert::to_int32(right)?))
    } else {
        match (left, right) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            (Value::Char(a), Value::Char(b)) => Ok(a.cmp(b)),
            _ => Err(EvalError::type_mismatch()),
        }
    }
}

pub fn relate(operator: RelationalOperator, left: &Value, right: &Value) -> EvalResult<bool> {
    match operator {
        RelationalOperator::Is => Ok(left.is_same(right)),
        other => Ok(other.holds(compare(left, right)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_addition_promotion() {
        assert_eq!(add(&1.into(), &2.into()).unwrap(), Value::Integer(3));
        assert_eq!(add(&1.into(), &2.5.into()).unwrap(), Value::Double(3.5));
        assert_eq!(add(&1.into(), &"a".into()).unwrap(), Value::text("1a"));
        assert_eq!(add(&"a".into(), &1.into()).unwrap(), Value::text("a1"));
        assert_eq!(
            add(&i32::MAX.into(), &1.into()).unwrap(),
            Value::Integer(i32::MIN)
        );
    }

    #[test]
    fn test_division_rules() {
        assert_eq!(divide(&4.into(), &2.into()).unwrap(), Value::Double(2.0));
        assert_eq!(divide(&1.into(), &0.into()).unwrap(), Value::Double(f64::INFINITY));
        assert_eq!(integer_divide(&7.into(), &2.into()).unwrap(), Value::Integer(3));
        assert_eq!(integer_divide(&(-7).into(), &2.into()).unwrap(), Value::Integer(-3));
        assert_eq!(modulo(&7.into(), &2.into()).unwrap(), Value::Integer(1));
        assert_eq!(modulo(&(-7).into(), &2.into()).unwrap(), Value::Integer(-1));

        let error = integer_divide(&1.into(), &0.into()).unwrap_err();
        assert_eq!(error.to_string(), "Attempted to divide by zero.");
        assert_matches!(modulo(&1.into(), &0.into()), Err(EvalError::Arithmetic { .. }));
        assert_eq!(
            integer_divide(&i32::MIN.into(), &(-1).into())
                .unwrap_err()
                .to_string(),
            "Arithmetic operation resulted in an overflow."
        );
        assert_matches!(
            integer_divide(&7.5.into(), &2.into()),
            Err(EvalError::TypeMismatch { .. })
        );
    }

    #[test]
    fn test_multiplication_and_negation() {
        assert_eq!(multiply(&3.into(), &4.into()).unwrap(), Value::Integer(12));
        assert_eq!(multiply(&3.into(), &0.5.into()).unwrap(), Value::Double(1.5));
        assert_eq!(negate(&5.into()).unwrap(), Value::Integer(-5));
        assert_eq!(negate(&i32::MIN.into()).unwrap(), Value::Integer(i32::MIN));
        assert_eq!(negate(&2.5.into()).unwrap(), Value::Double(-2.5));
        assert_matches!(negate(&"a".into()), Err(EvalError::TypeMismatch { .. }));
    }

    #[test]
    fn test_comparison_promotion() {
        use RelationalOperator::*;
        assert!(relate(Less, &"abc".into(), &"abd".into()).unwrap());
        assert!(relate(Less, &1.into(), &2.5.into()).unwrap());
        assert!(relate(Equal, &1.into(), &1.0.into()).unwrap());
        assert!(relate(Equal, &'A'.into(), &65.into()).unwrap());
        assert!(relate(Greater, &true.into(), &false.into()).unwrap());
        assert!(relate(Equal, &"10".into(), &10.into()).unwrap());
        assert!(relate(Less, &Value::Nothing, &"a".into()).unwrap());
        assert!(relate(Equal, &f64::NAN.into(), &f64::NAN.into()).unwrap());
        assert!(relate(Less, &f64::NAN.into(), &f64::NEG_INFINITY.into()).unwrap());
        assert_matches!(
            relate(Equal, &'a'.into(), &1.5.into()),
            Err(EvalError::Conversion { .. })
        );
    }

    #[test]
    fn test_identity() {
        use RelationalOperator::Is;
        assert!(relate(Is, &Value::Nothing, &Value::Nothing).unwrap());
        assert!(!relate(Is, &1.into(), &1.into()).unwrap());
        assert!(!relate(Is, &Value::Nothing, &1.into()).unwrap());
    }

    #[test]
    fn test_type_rules() {
        assert_eq!(
            addition_type(&FormulaType::Integer, &FormulaType::Text),
            FormulaType::Text
        );
        assert_eq!(
            numeric_type(&FormulaType::Integer, &FormulaType::Double),
            FormulaType::Double
        );
        assert!(check_addend(&FormulaType::Boolean).is_err());
        assert!(check_comparable(RelationalOperator::Is, &FormulaType::DateTime).is_ok());
        assert!(check_comparable(RelationalOperator::Equal, &FormulaType::DateTime).is_err());
        assert!(check_integer(&FormulaType::Double).is_err());
    }
}
