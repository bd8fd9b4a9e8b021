//! Runtime values

use chrono::NaiveDateTime;
use std::fmt;

use crate::types::{DateInterval, FirstDayOfWeek, FormulaType, HostData, HostObject};

#[derive(Debug, Clone)]
pub enum Value {
    Integer(i32),
    Double(f64),
    Text(String),
    Char(char),
    Boolean(bool),
    /// The null value
    Nothing,
    Object(HostObject),
    /// A registered type named by an identifier, e.g. `DateInterval`
    Type(FormulaType),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn date_time(value: NaiveDateTime) -> Self {
        Value::Object(HostObject::date_time(value))
    }

    pub fn date_interval(value: DateInterval) -> Self {
        Value::Object(HostObject::new(HostData::DateInterval(value)))
    }

    pub fn first_day_of_week(value: FirstDayOfWeek) -> Self {
        Value::Object(HostObject::new(HostData::FirstDayOfWeek(value)))
    }

    /// Runtime type; `Nothing` reports `Object`
    pub fn formula_type(&self) -> FormulaType {
        match self {
            Value::Integer(_) => FormulaType::Integer,
            Value::Double(_) => FormulaType::Double,
            Value::Text(_) => FormulaType::Text,
            Value::Char(_) => FormulaType::Char,
            Value::Boolean(_) => FormulaType::Boolean,
            Value::Nothing => FormulaType::Object,
            Value::Object(object) => object.formula_type(),
            Value::Type(ty) => ty.clone(),
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Value::Nothing)
    }

    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Object(object) => object.as_date_time(),
            _ => None,
        }
    }

    pub fn as_date_interval(&self) -> Option<DateInterval> {
        match self {
            Value::Object(object) => object.as_date_interval(),
            _ => None,
        }
    }

    pub fn as_first_day_of_week(&self) -> Option<FirstDayOfWeek> {
        match self {
            Value::Object(object) => object.as_first_day_of_week(),
            _ => None,
        }
    }

    /// Reference identity as tested by `Is`
    ///
    /// Only `Nothing`, host objects and type references have identity;
    /// primitive values are boxed fresh for every comparison and are never
    /// identical, even to themselves.
    pub fn is_same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nothing, Value::Nothing) => true,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Type(a), Value::Type(b)) => a == b,
            _ => false,
        }
    }

    /// Text conversion used by concatenation and string functions
    pub fn to_text(&self) -> String {
        match self {
            Value::Nothing => String::new(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Nothing, Value::Nothing) => true,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{}", value),
            Value::Double(value) => write!(f, "{}", format_double(*value)),
            Value::Text(value) => write!(f, "{}", value),
            Value::Char(value) => write!(f, "{}", value),
            Value::Boolean(true) => write!(f, "True"),
            Value::Boolean(false) => write!(f, "False"),
            Value::Nothing => write!(f, "Nothing"),
            Value::Object(object) => write!(f, "{}", object),
            Value::Type(ty) => write!(f, "{}", ty),
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

/// Shortest round-trip rendering of a double
///
/// Decimal exponents of 15 and above, or below -5, switch to exponent form
/// with an explicit sign and at least two exponent digits (`1E+15`,
/// `1.5E-07`).
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let scientific = format!("{:e}", value);
    let parsed = scientific
        .split_once('e')
        .and_then(|(mantissa, exponent)| Some((mantissa, exponent.parse::<i32>().ok()?)));

    match parsed {
        Some((mantissa, exponent)) if !(-5..15).contains(&exponent) => {
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}E{}{:02}", mantissa, sign, exponent.abs())
        }
        _ => format!("{}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_double() {
        assert_eq!(format_double(2.5), "2.5");
        assert_eq!(format_double(10.0), "10");
        assert_eq!(format_double(-0.25), "-0.25");
        assert_eq!(format_double(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_double(1e14), "100000000000000");
        assert_eq!(format_double(1e15), "1E+15");
        assert_eq!(format_double(1.5e20), "1.5E+20");
        assert_eq!(format_double(0.0001), "0.0001");
        assert_eq!(format_double(0.00001), "1E-05");
        assert_eq!(format_double(-2.5e-7), "-2.5E-07");
        assert_eq!(format_double(f64::NAN), "NaN");
        assert_eq!(format_double(f64::INFINITY), "Infinity");
        assert_eq!(format_double(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Integer(-3).to_string(), "-3");
        assert_eq!(Value::Boolean(true).to_string(), "True");
        assert_eq!(Value::Char('x').to_string(), "x");
        assert_eq!(Value::Nothing.to_string(), "Nothing");
        assert_eq!(Value::Nothing.to_text(), "");
        assert_eq!(Value::date_interval(DateInterval::Month).to_string(), "Month");
        assert_eq!(Value::Type(FormulaType::FirstDayOfWeek).to_string(), "FirstDayOfWeek");
    }

    #[test]
    fn test_identity() {
        assert!(Value::Nothing.is_same(&Value::Nothing));
        assert!(!Value::Integer(1).is_same(&Value::Integer(1)));
        assert!(!Value::text("a").is_same(&Value::text("a")));
        let object = Value::date_interval(DateInterval::Day);
        assert!(object.is_same(&object.clone()));
        assert!(!object.is_same(&Value::date_interval(DateInterval::Day)));
        assert!(Value::Type(FormulaType::DateInterval).is_same(&Value::Type(FormulaType::DateInterval)));
    }

    #[test]
    fn test_runtime_types() {
        assert_eq!(Value::Nothing.formula_type(), FormulaType::Object);
        assert_eq!(Value::from("a").formula_type(), FormulaType::Text);
        assert_eq!(
            Value::first_day_of_week(FirstDayOfWeek::Monday).formula_type(),
            FormulaType::FirstDayOfWeek
        );
    }
}
