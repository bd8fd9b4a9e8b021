//! Value coercions shared by the operators and the function library

use chrono::NaiveDateTime;
use std::cmp::Ordering;

use crate::evaluation::{EvalError, EvalResult};
use crate::types::{datetime, Value};

const BAD_FORMAT: &str = "Input string was not in a correct format.";
const INT32_OVERFLOW: &str = "Value was either too large or too small for an Int32.";

/// Round to the nearest integer, ties to even
pub fn round_half_even(value: f64) -> f64 {
    if (value - value.trunc()).abs() == 0.5 {
        2.0 * (value / 2.0).round()
    } else {
        value.round()
    }
}

/// Narrow a double to `i32` with banker's rounding
pub fn double_to_int32(value: f64) -> EvalResult<i32> {
    let rounded = round_half_even(value);
    if rounded.is_nan() || rounded < i32::MIN as f64 || rounded > i32::MAX as f64 {
        return Err(EvalError::arithmetic(INT32_OVERFLOW));
    }
    Ok(rounded as i32)
}

pub fn to_boolean(value: &Value) -> EvalResult<bool> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Integer(i) => Ok(*i != 0),
        Value::Double(d) => Ok(*d != 0.0),
        Value::Nothing => Ok(false),
        Value::Text(text) => match text.trim() {
            t if t.eq_ignore_ascii_case("true") => Ok(true),
            t if t.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(EvalError::conversion(
                "String was not recognized as a valid Boolean.",
            )),
        },
        other => Err(EvalError::invalid_cast(other.formula_type(), "Boolean")),
    }
}

pub fn to_double(value: &Value) -> EvalResult<f64> {
    match value {
        Value::Double(d) => Ok(*d),
        Value::Integer(i) => Ok(f64::from(*i)),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Nothing => Ok(0.0),
        Value::Text(text) => parse_double(text).ok_or_else(|| EvalError::conversion(BAD_FORMAT)),
        other => Err(EvalError::invalid_cast(other.formula_type(), "Double")),
    }
}

pub fn to_int32(value: &Value) -> EvalResult<i32> {
    match value {
        Value::Integer(i) => Ok(*i),
        Value::Double(d) => double_to_int32(*d),
        Value::Char(c) => Ok(*c as i32),
        Value::Boolean(b) => Ok(i32::from(*b)),
        Value::Nothing => Ok(0),
        Value::Text(text) => parse_int32(text),
        other => Err(EvalError::invalid_cast(other.formula_type(), "Int32")),
    }
}

pub fn to_date_time(value: &Value) -> EvalResult<NaiveDateTime> {
    match value {
        Value::Nothing => Ok(datetime::min_value()),
        Value::Text(text) => datetime::parse(text).ok_or_else(|| {
            EvalError::conversion("String was not recognized as a valid DateTime.")
        }),
        other => other
            .as_date_time()
            .ok_or_else(|| EvalError::invalid_cast(other.formula_type(), "DateTime")),
    }
}

/// Parse text as a double: surrounding whitespace, sign, thousands
/// separators, decimal point and exponent are accepted
pub fn parse_double(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    match trimmed {
        "NaN" => return Some(f64::NAN),
        "Infinity" | "\u{221E}" => return Some(f64::INFINITY),
        "-Infinity" | "-\u{221E}" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    let well_formed = !cleaned.is_empty()
        && cleaned.chars().any(|c| c.is_ascii_digit())
        && cleaned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !well_formed {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Parse text as an `i32`: surrounding whitespace and a sign are accepted
pub fn parse_int32(text: &str) -> EvalResult<i32> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(EvalError::conversion(BAD_FORMAT));
    }
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    trimmed
        .parse::<i32>()
        .map_err(|_| EvalError::arithmetic(INT32_OVERFLOW))
}

/// Culture-style ordering: case-insensitive first, then lowercase before
/// uppercase for strings that differ only in case
pub fn compare_text(left: &str, right: &str) -> Ordering {
    compare_text_ignore_case(left, right).then_with(|| {
        left.chars()
            .zip(right.chars())
            .find(|(a, b)| a != b)
            .map(|(a, b)| match (a.is_lowercase(), b.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => a.cmp(&b),
            })
            .unwrap_or(Ordering::Equal)
    })
}

pub fn compare_text_ignore_case(left: &str, right: &str) -> Ordering {
    left.chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(2.5), 2.0);
        assert_eq!(round_half_even(3.5), 4.0);
        assert_eq!(round_half_even(-2.5), -2.0);
        assert_eq!(round_half_even(2.6), 3.0);
        assert_eq!(round_half_even(-0.4), -0.0);
    }

    #[test]
    fn test_to_int32() {
        assert_eq!(to_int32(&Value::Double(2.5)).unwrap(), 2);
        assert_eq!(to_int32(&Value::Double(-3.5)).unwrap(), -4);
        assert_eq!(to_int32(&Value::Char('A')).unwrap(), 65);
        assert_eq!(to_int32(&Value::text(" -12 ")).unwrap(), -12);
        assert_matches!(
            to_int32(&Value::Double(3e10)),
            Err(EvalError::Arithmetic { .. })
        );
        assert_matches!(to_int32(&Value::text("1.5")), Err(EvalError::Conversion { .. }));
        assert_matches!(
            to_int32(&Value::text("99999999999")),
            Err(EvalError::Arithmetic { .. })
        );
    }

    #[test]
    fn test_to_double() {
        assert_eq!(to_double(&Value::text("1,234.5")).unwrap(), 1234.5);
        assert_eq!(to_double(&Value::text(" 2e3 ")).unwrap(), 2000.0);
        assert_eq!(to_double(&Value::Boolean(true)).unwrap(), 1.0);
        assert!(to_double(&Value::text("NaN")).unwrap().is_nan());
        let error = to_double(&Value::text("abc")).unwrap_err();
        assert_eq!(error.to_string(), "Input string was not in a correct format.");
        assert_matches!(to_double(&Value::text("inf")), Err(EvalError::Conversion { .. }));
        assert_eq!(
            to_double(&Value::Char('a')).unwrap_err().to_string(),
            "Invalid cast from 'Char' to 'Double'."
        );
    }

    #[test]
    fn test_to_boolean() {
        assert!(to_boolean(&Value::text(" TRUE ")).unwrap());
        assert!(!to_boolean(&Value::Integer(0)).unwrap());
        assert!(to_boolean(&Value::Double(0.5)).unwrap());
        assert_matches!(to_boolean(&Value::text("yes")), Err(EvalError::Conversion { .. }));
    }

    #[test]
    fn test_to_date_time() {
        assert_eq!(to_date_time(&Value::Nothing).unwrap(), datetime::min_value());
        assert!(to_date_time(&Value::text("1/2/2020")).is_ok());
        assert_matches!(to_date_time(&Value::Integer(3)), Err(EvalError::Conversion { .. }));
    }

    #[test]
    fn test_compare_text() {
        assert_eq!(compare_text("abc", "abd"), Ordering::Less);
        assert_eq!(compare_text("ABC", "abd"), Ordering::Less);
        assert_eq!(compare_text("abc", "ABC"), Ordering::Less);
        assert_eq!(compare_text("abc", "abc"), Ordering::Equal);
        assert_eq!(compare_text("b", "A"), Ordering::Greater);
        assert_eq!(compare_text_ignore_case("abc", "ABC"), Ordering::Equal);
    }
}
