//! Conversion functions

use crate::evaluation::{EvalError, EvalResult};
use crate::functions::{argument, double_arg, text_arg};
use crate::resolution::FunctionRegistry;
use crate::types::{convert, datetime, format_double, FormulaType, Value};

pub fn register(registry: &mut FunctionRegistry) {
    use FormulaType::{Boolean, DateTime, Double, Integer, Object, Text};

    registry
        .register("Fix", vec![Double], Double, |args| {
            Ok(Value::Double(double_arg(args, 0)?.trunc()))
        })
        .register("Int", vec![Double], Double, |args| {
            Ok(Value::Double(double_arg(args, 0)?.floor()))
        })
        .register("Str", vec![Object], Text, |args| {
            str_value(argument(args, 0)?).map(Value::Text)
        })
        .register("Val", vec![Text], Double, |args| {
            Ok(Value::Double(val(text_arg(args, 0)?)))
        })
        .register("CBool", vec![Object], Boolean, |args| {
            convert::to_boolean(argument(args, 0)?).map(Value::Boolean)
        })
        .register("CDate", vec![Object], DateTime, |args| {
            convert::to_date_time(argument(args, 0)?).map(Value::date_time)
        })
        .register("CDbl", vec![Object], Double, |args| {
            convert::to_double(argument(args, 0)?).map(Value::Double)
        })
        .register("CInt", vec![Object], Integer, |args| {
            convert::to_int32(argument(args, 0)?).map(Value::Integer)
        })
        .register("CStr", vec![Object], Text, |args| {
            Ok(Value::Text(argument(args, 0)?.to_text()))
        });
}

/// Numbers render with a leading space when non-negative
pub fn str_value(value: &Value) -> EvalResult<String> {
    let number = match value {
        Value::Integer(i) => f64::from(*i),
        Value::Double(d) => *d,
        Value::Boolean(b) => return Ok(value_name(*b).to_string()),
        Value::Nothing => {
            return Err(EvalError::function("Value cannot be null. (Parameter 'Number')"))
        }
        Value::Text(text) => convert::parse_double(text).ok_or_else(|| {
            EvalError::conversion(format!(
                "Conversion from string \"{}\" to type 'Double' is not valid.",
                text
            ))
        })?,
        other => {
            return match other.as_date_time() {
                Some(date) => Ok(datetime::format_general(&date)),
                None => Err(EvalError::invalid_cast(other.formula_type(), "String")),
            }
        }
    };
    let text = match value {
        Value::Integer(i) => i.to_string(),
        _ => format_double(number),
    };
    if number >= 0.0 || number.is_nan() {
        Ok(format!(" {}", text))
    } else {
        Ok(text)
    }
}

fn value_name(flag: bool) -> &'static str {
    if flag {
        "True"
    } else {
        "False"
    }
}

/// Leading numeric value of `text`, 0 when there is none
///
/// Blanks anywhere are skipped. `&H` and `&O` prefixes read hexadecimal and
/// octal; up to four or eight digits wrap like 16- and 32-bit integers.
pub fn val(text: &str) -> f64 {
    let chars: Vec<char> = text
        .chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\n' | '\r'))
        .collect();

    if chars.first() == Some(&'&') {
        let radix = match chars.get(1).map(char::to_ascii_uppercase) {
            Some('H') => 16,
            Some('O') => 8,
            _ => return 0.0,
        };
        let digits: String = chars[2..]
            .iter()
            .take_while(|c| c.is_digit(radix))
            .collect();
        let Ok(parsed) = u64::from_str_radix(&digits, radix) else {
            return 0.0;
        };
        return match digits.len() {
            0..=4 if radix == 16 => f64::from(parsed as u16 as i16),
            0..=8 if radix == 16 => f64::from(parsed as u32 as i32),
            _ => parsed as f64,
        };
    }

    let mut number = String::new();
    let mut i = 0;
    if let Some(sign @ ('+' | '-')) = chars.first() {
        number.push(*sign);
        i += 1;
    }
    let digits_from = |number: &mut String, mut i: usize| {
        while let Some(c) = chars.get(i).filter(|c| c.is_ascii_digit()) {
            number.push(*c);
            i += 1;
        }
        i
    };
    i = digits_from(&mut number, i);
    if chars.get(i) == Some(&'.') {
        number.push('.');
        i = digits_from(&mut number, i + 1);
    }
    if let Some('e' | 'E' | 'd' | 'D') = chars.get(i) {
        let mut exponent = String::from("e");
        let mut j = i + 1;
        if let Some(sign @ ('+' | '-')) = chars.get(j) {
            exponent.push(*sign);
            j += 1;
        }
        let before = exponent.len();
        digits_from(&mut exponent, j);
        if exponent.len() > before {
            number.push_str(&exponent);
        }
    }
    number.parse().unwrap_or(0.0)
}
