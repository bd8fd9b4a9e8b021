//! JSON rendering of evaluation outcomes

use serde::{Deserialize, Serialize};

use crate::pipeline::{ErrorKind, FormulaError};
use crate::types::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FormulaOutput {
    Success {
        formula: String,
        value: serde_json::Value,
        #[serde(rename = "type")]
        value_type: String,
        display: String,
    },
    Failure {
        formula: String,
        kind: ErrorKind,
        code: String,
        message: String,
        offset: Option<usize>,
    },
}

impl FormulaOutput {
    pub fn success(formula: &str, value: &Value) -> Self {
        Self::Success {
            formula: formula.to_string(),
            value: value_to_json(value),
            value_type: value.formula_type().to_string(),
            display: value.to_string(),
        }
    }

    pub fn failure(formula: &str, error: &FormulaError) -> Self {
        Self::Failure {
            formula: formula.to_string(),
            kind: error.kind(),
            code: error.error_code().as_str().to_string(),
            message: error.to_string(),
            offset: error.offset(),
        }
    }

    pub fn from_result(formula: &str, result: &Result<Value, FormulaError>) -> Self {
        match result {
            Ok(value) => Self::success(formula, value),
            Err(error) => Self::failure(formula, error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Native JSON where one exists; dates, enums, types and non-finite
/// doubles fall back to their text rendering
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Double(d) => serde_json::Number::from_f64(*d)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(value.to_string())),
        Value::Text(text) => serde_json::Value::String(text.clone()),
        Value::Char(c) => serde_json::Value::String(c.to_string()),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Nothing => serde_json::Value::Null,
        Value::Object(_) | Value::Type(_) => serde_json::Value::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::EvalError;
    use serde_json::json;

    #[test]
    fn test_success_output() {
        let output = FormulaOutput::success("1 + 1", &Value::Integer(2));
        let rendered: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();
        assert_eq!(
            rendered,
            json!({
                "status": "success",
                "formula": "1 + 1",
                "value": 2,
                "type": "Int32",
                "display": "2"
            })
        );
    }

    #[test]
    fn test_failure_output() {
        let error = FormulaError::from(EvalError::divide_by_zero().with_offset(4));
        let output = FormulaOutput::failure("1 \\ 0", &error);
        assert!(!output.is_success());
        let rendered: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();
        assert_eq!(rendered["status"], "failure");
        assert_eq!(rendered["kind"], "runtime");
        assert_eq!(rendered["code"], "E202");
        assert_eq!(rendered["message"], "Attempted to divide by zero.");
        assert_eq!(rendered["offset"], 4);
    }

    #[test]
    fn test_value_rendering() {
        assert_eq!(value_to_json(&Value::Nothing), serde_json::Value::Null);
        assert_eq!(value_to_json(&Value::Double(f64::NAN)), json!("NaN"));
        assert_eq!(value_to_json(&Value::Char('x')), json!("x"));
        assert_eq!(value_to_json(&Value::Boolean(false)), json!(false));
    }

    #[test]
    fn test_round_trip_through_serde() {
        let output = FormulaOutput::success("\"a\"", &Value::text("a"));
        let parsed: FormulaOutput = serde_json::from_str(&output.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, output);
    }
}
