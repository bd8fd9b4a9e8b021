//! Math functions
//!
//! `Abs`, `Max`, `Min` and `Sign` have Integer overloads that overload
//! selection prefers for integer arguments.

use crate::config::compile_time::functions::MAX_ROUND_DIGITS;
use crate::evaluation::{EvalError, EvalResult};
use crate::functions::{double_arg, int_arg};
use crate::resolution::FunctionRegistry;
use crate::types::{convert, FormulaType, Value};

type Unary = fn(f64) -> f64;

pub fn register(registry: &mut FunctionRegistry) {
    use FormulaType::{Double, Integer};

    registry
        .register("Abs", vec![Double], Double, |args| {
            Ok(Value::Double(double_arg(args, 0)?.abs()))
        })
        .register("Abs", vec![Integer], Integer, |args| {
            int_arg(args, 0)?
                .checked_abs()
                .map(Value::Integer)
                .ok_or_else(|| {
                    EvalError::arithmetic(
                        "Negating the minimum value of a twos complement number is invalid.",
                    )
                })
        })
        .register("Max", vec![Double, Double], Double, |args| {
            Ok(Value::Double(max(double_arg(args, 0)?, double_arg(args, 1)?)))
        })
        .register("Max", vec![Integer, Integer], Integer, |args| {
            Ok(Value::Integer(int_arg(args, 0)?.max(int_arg(args, 1)?)))
        })
        .register("Min", vec![Double, Double], Double, |args| {
            Ok(Value::Double(min(double_arg(args, 0)?, double_arg(args, 1)?)))
        })
        .register("Min", vec![Integer, Integer], Integer, |args| {
            Ok(Value::Integer(int_arg(args, 0)?.min(int_arg(args, 1)?)))
        })
        .register("Pow", vec![Double, Double], Double, |args| {
            Ok(Value::Double(double_arg(args, 0)?.powf(double_arg(args, 1)?)))
        })
        .register("Round", vec![Double], Double, |args| {
            Ok(Value::Double(convert::round_half_even(double_arg(args, 0)?)))
        })
        .register("Round", vec![Double, Integer], Double, |args| {
            round(double_arg(args, 0)?, int_arg(args, 1)?).map(Value::Double)
        })
        .register("Sign", vec![Double], Integer, |args| {
            sign(double_arg(args, 0)?).map(Value::Integer)
        })
        .register("Sign", vec![Integer], Integer, |args| {
            Ok(Value::Integer(int_arg(args, 0)?.signum()))
        })
        .register("Atan2", vec![Double, Double], Double, |args| {
            Ok(Value::Double(double_arg(args, 0)?.atan2(double_arg(args, 1)?)))
        });

    let unary: [(&str, Unary); 12] = [
        ("Ceiling", f64::ceil),
        ("Floor", f64::floor),
        ("Sqrt", f64::sqrt),
        ("Truncate", f64::trunc),
        ("Log", f64::ln),
        ("Log10", f64::log10),
        ("Sin", f64::sin),
        ("Cos", f64::cos),
        ("Tan", f64::tan),
        ("Asin", f64::asin),
        ("Acos", f64::acos),
        ("Atan", f64::atan),
    ];
    for (name, function) in unary {
        registry.register(name, vec![Double], Double, move |args| {
            Ok(Value::Double(function(double_arg(args, 0)?)))
        });
    }
}

/// NaN wins, matching the runtime's `Math.Max`
fn max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

fn min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

/// Banker's rounding to `digits` decimal places
pub fn round(value: f64, digits: i32) -> EvalResult<f64> {
    if !(0..=MAX_ROUND_DIGITS).contains(&digits) {
        return Err(EvalError::function(format!(
            "Rounding digits must be between 0 and {}, inclusive.",
            MAX_ROUND_DIGITS
        )));
    }
    if value.abs() >= 1e16 {
        return Ok(value);
    }
    let scale = 10f64.powi(digits);
    Ok(convert::round_half_even(value * scale) / scale)
}

pub fn sign(value: f64) -> EvalResult<i32> {
    if value.is_nan() {
        return Err(EvalError::arithmetic(
            "Function does not accept floating point Not-a-Number values.",
        ));
    }
    Ok(if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::test_support::call;
    use assert_matches::assert_matches;

    #[test]
    fn test_overloads_keep_integer_results() {
        assert_eq!(call("Abs", &[Value::Integer(-3)]).unwrap(), Value::Integer(3));
        assert_eq!(call("Abs", &[Value::Double(-3.5)]).unwrap(), Value::Double(3.5));
        assert_eq!(
            call("Max", &[Value::Integer(2), Value::Integer(7)]).unwrap(),
            Value::Integer(7)
        );
        assert_eq!(
            call("Min", &[Value::Integer(2), Value::Double(1.5)]).unwrap(),
            Value::Double(1.5)
        );
        assert_eq!(call("Sign", &[Value::Integer(-9)]).unwrap(), Value::Integer(-1));
        assert_eq!(call("Sign", &[Value::Double(0.0)]).unwrap(), Value::Integer(0));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(call("Round", &[Value::Double(2.5)]).unwrap(), Value::Double(2.0));
        assert_eq!(call("Round", &[Value::Double(3.5)]).unwrap(), Value::Double(4.0));
        assert_eq!(round(1.2345, 2).unwrap(), 1.23);
        assert_eq!(round(2.675, 0).unwrap(), 3.0);
        assert_matches!(round(1.0, 16), Err(EvalError::Function { .. }));
        assert_matches!(round(1.0, -1), Err(EvalError::Function { .. }));
    }

    #[test]
    fn test_unary_functions() {
        assert_eq!(call("Sqrt", &[Value::Integer(16)]).unwrap(), Value::Double(4.0));
        assert_eq!(call("floor", &[Value::Double(-1.5)]).unwrap(), Value::Double(-2.0));
        assert_eq!(call("Ceiling", &[Value::Double(1.1)]).unwrap(), Value::Double(2.0));
        assert_eq!(call("Log10", &[Value::Double(1000.0)]).unwrap(), Value::Double(3.0));
        assert_eq!(
            call("Pow", &[Value::Integer(2), Value::Integer(10)]).unwrap(),
            Value::Double(1024.0)
        );
    }

    #[test]
    fn test_failures() {
        assert_matches!(
            call("Abs", &[Value::Integer(i32::MIN)]),
            Err(EvalError::Arithmetic { .. })
        );
        assert_matches!(sign(f64::NAN), Err(EvalError::Arithmetic { .. }));
        assert!(max(1.0, f64::NAN).is_nan());
    }
}
