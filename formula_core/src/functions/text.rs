//! Text functions
//!
//! Positions are 1-based and counted in characters.

use std::cmp::Ordering;

use crate::evaluation::{EvalError, EvalResult};
use crate::functions::{argument, format, int_arg, text_arg};
use crate::resolution::FunctionRegistry;
use crate::types::{convert, FormulaType, Value};

pub fn register(registry: &mut FunctionRegistry) {
    use FormulaType::{Char, Integer, Object, Text};

    registry
        .register("Format", vec![Object, Text], Text, |args| {
            format::format_value(argument(args, 0)?, text_arg(args, 1)?).map(Value::Text)
        })
        .register("Len", vec![Text], Integer, |args| {
            Ok(Value::Integer(text_arg(args, 0)?.chars().count() as i32))
        })
        .register("StrComp", vec![Text, Text], Integer, |args| {
            let ordering = convert::compare_text_ignore_case(text_arg(args, 0)?, text_arg(args, 1)?);
            Ok(Value::Integer(ordering_to_int(ordering)))
        })
        .register("Replace", vec![Text, Text, Text], Text, |args| {
            Ok(Value::Text(replace_ignore_case(
                text_arg(args, 0)?,
                text_arg(args, 1)?,
                text_arg(args, 2)?,
            )))
        })
        .register("InStr", vec![Text, Text], Integer, |args| {
            Ok(Value::Integer(in_str(text_arg(args, 0)?, text_arg(args, 1)?)))
        })
        .register("InStrRev", vec![Text, Text], Integer, |args| {
            Ok(Value::Integer(in_str_rev(text_arg(args, 0)?, text_arg(args, 1)?)))
        })
        .register("Left", vec![Text, Integer], Text, |args| {
            left(text_arg(args, 0)?, int_arg(args, 1)?).map(Value::Text)
        })
        .register("Right", vec![Text, Integer], Text, |args| {
            right(text_arg(args, 0)?, int_arg(args, 1)?).map(Value::Text)
        })
        .register("Mid", vec![Text, Integer, Integer], Text, |args| {
            mid(text_arg(args, 0)?, int_arg(args, 1)?, int_arg(args, 2)?).map(Value::Text)
        })
        .register("GetChar", vec![Text, Integer], Char, |args| {
            get_char(text_arg(args, 0)?, int_arg(args, 1)?).map(Value::Char)
        })
        .register("LTrim", vec![Text], Text, |args| {
            Ok(Value::text(text_arg(args, 0)?.trim_start_matches(is_blank)))
        })
        .register("RTrim", vec![Text], Text, |args| {
            Ok(Value::text(text_arg(args, 0)?.trim_end_matches(is_blank)))
        })
        .register("Trim", vec![Text], Text, |args| {
            Ok(Value::text(text_arg(args, 0)?.trim_matches(is_blank)))
        })
        .register("LCase", vec![Text], Text, |args| {
            Ok(Value::Text(text_arg(args, 0)?.to_lowercase()))
        })
        .register("UCase", vec![Text], Text, |args| {
            Ok(Value::Text(text_arg(args, 0)?.to_uppercase()))
        })
        .register("TitleCase", vec![Text], Text, |args| {
            Ok(Value::Text(title_case(text_arg(args, 0)?)))
        });
}

// Trim functions strip spaces only, not tabs or newlines
fn is_blank(c: char) -> bool {
    c == ' ' || c == '\u{3000}'
}

fn ordering_to_int(ordering: Ordering) -> i32 {
    match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

fn chars_equal_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Replace every occurrence of `find`, matching case-insensitively
pub fn replace_ignore_case(expression: &str, find: &str, replacement: &str) -> String {
    let find: Vec<char> = find.chars().collect();
    if find.is_empty() {
        return expression.to_string();
    }
    let source: Vec<char> = expression.chars().collect();
    let mut result = String::with_capacity(expression.len());
    let mut i = 0;
    while i < source.len() {
        let matches = i + find.len() <= source.len()
            && source[i..i + find.len()]
                .iter()
                .zip(&find)
                .all(|(a, b)| chars_equal_ignore_case(*a, *b));
        if matches {
            result.push_str(replacement);
            i += find.len();
        } else {
            result.push(source[i]);
            i += 1;
        }
    }
    result
}

/// 1-based position of the first occurrence, 0 when absent
pub fn in_str(check: &str, search: &str) -> i32 {
    if check.is_empty() {
        return 0;
    }
    if search.is_empty() {
        return 1;
    }
    check
        .find(search)
        .map_or(0, |byte| check[..byte].chars().count() as i32 + 1)
}

/// 1-based position of the last occurrence, 0 when absent
pub fn in_str_rev(check: &str, search: &str) -> i32 {
    if check.is_empty() {
        return 0;
    }
    if search.is_empty() {
        return check.chars().count() as i32;
    }
    check
        .rfind(search)
        .map_or(0, |byte| check[..byte].chars().count() as i32 + 1)
}

fn check_length(length: i32) -> EvalResult<usize> {
    usize::try_from(length)
        .map_err(|_| EvalError::function("Argument 'Length' must be greater or equal to zero."))
}

pub fn left(text: &str, length: i32) -> EvalResult<String> {
    let length = check_length(length)?;
    Ok(text.chars().take(length).collect())
}

pub fn right(text: &str, length: i32) -> EvalResult<String> {
    let length = check_length(length)?;
    let count = text.chars().count();
    Ok(text.chars().skip(count.saturating_sub(length)).collect())
}

pub fn mid(text: &str, start: i32, length: i32) -> EvalResult<String> {
    if start <= 0 {
        return Err(EvalError::function(
            "Argument 'Start' must be greater than zero.",
        ));
    }
    let length = check_length(length)?;
    Ok(text.chars().skip(start as usize - 1).take(length).collect())
}

pub fn get_char(text: &str, index: i32) -> EvalResult<char> {
    if text.is_empty() {
        return Err(EvalError::function(
            "Length of argument 'String' must be greater than zero.",
        ));
    }
    if index < 1 {
        return Err(EvalError::function(
            "Argument 'Index' must be greater than or equal to 1.",
        ));
    }
    text.chars().nth(index as usize - 1).ok_or_else(|| {
        EvalError::function(
            "Argument 'Index' must be less than or equal to the length of argument 'String'.",
        )
    })
}

/// Capitalize each word; words written entirely in capitals are kept
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut word = String::new();
    for c in text.chars() {
        if c.is_alphanumeric() || (c == '\'' && !word.is_empty()) {
            word.push(c);
        } else {
            push_title_word(&mut result, &word);
            word.clear();
            result.push(c);
        }
    }
    push_title_word(&mut result, &word);
    result
}

fn push_title_word(result: &mut String, word: &str) {
    let all_caps = word.chars().any(char::is_alphabetic)
        && word.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase);
    if all_caps {
        result.push_str(word);
        return;
    }
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        result.extend(first.to_uppercase());
        for c in chars {
            result.extend(c.to_lowercase());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::test_support::call;
    use assert_matches::assert_matches;

    #[test]
    fn test_len_and_compare() {
        assert_eq!(call("Len", &[Value::text("héllo")]).unwrap(), Value::Integer(5));
        assert_eq!(
            call("StrComp", &[Value::text("abc"), Value::text("ABC")]).unwrap(),
            Value::Integer(0)
        );
        assert_eq!(
            call("StrComp", &[Value::text("abc"), Value::text("abd")]).unwrap(),
            Value::Integer(-1)
        );
    }

    #[test]
    fn test_replace() {
        assert_eq!(replace_ignore_case("Hello hello", "HELLO", "bye"), "bye bye");
        assert_eq!(replace_ignore_case("aaa", "aa", "b"), "ba");
        assert_eq!(replace_ignore_case("abc", "", "x"), "abc");
    }

    #[test]
    fn test_positions() {
        assert_eq!(in_str("abcabc", "c"), 3);
        assert_eq!(in_str("abcabc", "C"), 0);
        assert_eq!(in_str("abc", ""), 1);
        assert_eq!(in_str("", "a"), 0);
        assert_eq!(in_str_rev("abcabc", "c"), 6);
        assert_eq!(in_str_rev("abc", ""), 3);
    }

    #[test]
    fn test_substrings() {
        assert_eq!(left("formula", 4).unwrap(), "form");
        assert_eq!(left("abc", 10).unwrap(), "abc");
        assert_eq!(right("formula", 3).unwrap(), "ula");
        assert_eq!(mid("formula", 2, 3).unwrap(), "orm");
        assert_eq!(mid("abc", 5, 2).unwrap(), "");
        assert_eq!(get_char("abc", 2).unwrap(), 'b');

        assert_matches!(left("abc", -1), Err(EvalError::Function { .. }));
        assert_matches!(mid("abc", 0, 1), Err(EvalError::Function { .. }));
        assert_matches!(get_char("abc", 4), Err(EvalError::Function { .. }));
    }

    #[test]
    fn test_trim_and_case() {
        assert_eq!(call("Trim", &[Value::text("  a b \t ")]).unwrap(), Value::text("a b \t"));
        assert_eq!(call("LTrim", &[Value::text("  x ")]).unwrap(), Value::text("x "));
        assert_eq!(call("RTrim", &[Value::text("  x ")]).unwrap(), Value::text("  x"));
        assert_eq!(call("UCase", &[Value::text("abc")]).unwrap(), Value::text("ABC"));
        assert_eq!(title_case("the QUICK brown-fox"), "The QUICK Brown-Fox");
        assert_eq!(title_case("o'neil"), "O'neil");
    }

    #[test]
    fn test_get_char_returns_char() {
        assert_eq!(
            call("GetChar", &[Value::text("xyz"), Value::Integer(3)]).unwrap(),
            Value::Char('z')
        );
    }
}
