//! The `Format` function
//!
//! Accepts the named Visual Basic styles (`Currency`, `Percent`,
//! `Long Date`, `Yes/No`, ...), single-letter numeric specifiers (`N2`,
//! `X8`, ...) and custom numeric patterns built from `0 # . , % E+0` with
//! up to three `;`-separated sections. Dates use the date pattern language.

use chrono::NaiveDateTime;

use crate::evaluation::{EvalError, EvalResult};
use crate::types::{convert, datetime, format_double, Value};

const INVALID_SPECIFIER: &str = "Format specifier was invalid.";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn is_negative(self) -> bool {
        self.as_f64() < 0.0
    }

    fn general(self) -> String {
        match self {
            Number::Int(i) => i.to_string(),
            Number::Float(f) => format_double(f),
        }
    }
}

/// Render `value` with `style`
pub fn format_value(value: &Value, style: &str) -> EvalResult<String> {
    if style.is_empty() {
        return Ok(value.to_text());
    }
    match value {
        Value::Nothing => Ok(String::new()),
        Value::Integer(i) => format_number(Number::Int(i64::from(*i)), style),
        Value::Double(d) => format_number(Number::Float(*d), style),
        Value::Boolean(b) => match yes_no(style, *b) {
            Some(text) => Ok(text.to_string()),
            None => format_number(Number::Int(if *b { -1 } else { 0 }), style),
        },
        Value::Text(text) => {
            if let Some(number) = convert::parse_double(text) {
                format_number(Number::Float(number), style)
            } else if let Some(date) = datetime::parse(text) {
                Ok(format_date(&date, style))
            } else {
                Ok(text.clone())
            }
        }
        other => match other.as_date_time() {
            Some(date) => Ok(format_date(&date, style)),
            None => Ok(other.to_text()),
        },
    }
}

fn yes_no(style: &str, flag: bool) -> Option<&'static str> {
    let (yes, no) = match style.to_ascii_lowercase().as_str() {
        "yes/no" => ("Yes", "No"),
        "true/false" => ("True", "False"),
        "on/off" => ("On", "Off"),
        _ => return None,
    };
    Some(if flag { yes } else { no })
}

pub fn format_date(value: &NaiveDateTime, style: &str) -> String {
    let pattern = match style.to_ascii_lowercase().as_str() {
        "general date" => datetime::GENERAL_PATTERN,
        "long date" => datetime::LONG_DATE_PATTERN,
        "medium date" => "dd-MMM-yy",
        "short date" => datetime::SHORT_DATE_PATTERN,
        "long time" => datetime::LONG_TIME_PATTERN,
        "medium time" => "hh:mm tt",
        "short time" => "HH:mm",
        _ => return datetime::format(value, style),
    };
    datetime::format_custom(value, pattern)
}

// === NUMBERS ===

fn format_number(number: Number, style: &str) -> EvalResult<String> {
    let value = number.as_f64();
    if let Some(text) = yes_no(style, value != 0.0) {
        return Ok(text.to_string());
    }
    if value.is_nan() || value.is_infinite() {
        return Ok(format_double(value));
    }
    match style.to_ascii_lowercase().as_str() {
        "general number" => return Ok(number.general()),
        "currency" => return standard(number, 'C', None),
        "fixed" => return standard(number, 'F', Some(2)),
        "standard" => return standard(number, 'N', Some(2)),
        "percent" => return standard(number, 'P', Some(2)),
        "scientific" => return Ok(custom(value, "0.00E+00")),
        _ => {}
    }
    match parse_standard(style) {
        Some((letter, precision)) => standard(number, letter, precision),
        None => Ok(custom(value, style)),
    }
}

/// A letter followed by at most two digits
fn parse_standard(style: &str) -> Option<(char, Option<usize>)> {
    let mut chars = style.chars();
    let letter = chars.next().filter(char::is_ascii_alphabetic)?;
    let rest = chars.as_str();
    if rest.len() > 2 || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((letter, rest.parse().ok()))
}

fn standard(number: Number, letter: char, precision: Option<usize>) -> EvalResult<String> {
    let value = number.as_f64();
    let sign = |body: String, is_zero: bool| {
        if number.is_negative() && !is_zero {
            format!("-{}", body)
        } else {
            body
        }
    };
    let text = match letter.to_ascii_uppercase() {
        'C' => {
            let (int, frac) = decimal_digits(value, precision.unwrap_or(2));
            let body = format!("${}", join(&group(&int), &frac));
            if number.is_negative() && !all_zero(&int, &frac) {
                format!("({})", body)
            } else {
                body
            }
        }
        'D' => match number {
            Number::Int(i) => {
                let digits = format!("{:0width$}", i.unsigned_abs(), width = precision.unwrap_or(0));
                sign(digits, i == 0)
            }
            Number::Float(_) => return Err(EvalError::function(INVALID_SPECIFIER)),
        },
        'E' => {
            let (mantissa, exponent) = scientific(value.abs(), precision.unwrap_or(6));
            let marker = if letter.is_ascii_uppercase() { 'E' } else { 'e' };
            let exponent_sign = if exponent < 0 { '-' } else { '+' };
            sign(
                format!("{}{}{}{:03}", mantissa, marker, exponent_sign, exponent.abs()),
                value == 0.0,
            )
        }
        'F' => {
            let (int, frac) = decimal_digits(value, precision.unwrap_or(2));
            let zero = all_zero(&int, &frac);
            sign(join(&pad_int(int), &frac), zero)
        }
        'G' => match precision {
            Some(digits) if digits > 0 => significant(value, digits),
            _ => number.general(),
        },
        'N' => {
            let (int, frac) = decimal_digits(value, precision.unwrap_or(2));
            let zero = all_zero(&int, &frac);
            sign(join(&group(&pad_int(int)), &frac), zero)
        }
        'P' => {
            let (int, frac) = decimal_digits(value * 100.0, precision.unwrap_or(2));
            let zero = all_zero(&int, &frac);
            sign(format!("{}%", join(&group(&pad_int(int)), &frac)), zero)
        }
        'R' => number.general(),
        'X' => match number {
            Number::Int(i) => {
                let bits = i as i32 as u32;
                let width = precision.unwrap_or(0);
                if letter == 'X' {
                    format!("{:0width$X}", bits, width = width)
                } else {
                    format!("{:0width$x}", bits, width = width)
                }
            }
            Number::Float(_) => return Err(EvalError::function(INVALID_SPECIFIER)),
        },
        _ => return Err(EvalError::function(INVALID_SPECIFIER)),
    };
    Ok(text)
}

fn join(int: &str, frac: &str) -> String {
    if frac.is_empty() {
        int.to_string()
    } else {
        format!("{}.{}", int, frac)
    }
}

fn pad_int(int: String) -> String {
    if int.is_empty() {
        "0".to_string()
    } else {
        int
    }
}

fn all_zero(int: &str, frac: &str) -> bool {
    int.chars().chain(frac.chars()).all(|c| c == '0')
}

/// Insert thousands separators
fn group(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Integer digits (no leading zeros, empty for zero) and exactly
/// `decimals` fraction digits of `|value|`, rounding half away from zero
fn decimal_digits(value: f64, decimals: usize) -> (String, String) {
    let repr = format!("{}", value.abs());
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    let mut int_len = int_part.len();
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes())
        .map(|b| b - b'0')
        .collect();

    let keep = int_len + decimals;
    if digits.len() > keep {
        let round_up = digits[keep] >= 5;
        digits.truncate(keep);
        if round_up {
            let mut carried = true;
            for digit in digits.iter_mut().rev() {
                if *digit == 9 {
                    *digit = 0;
                } else {
                    *digit += 1;
                    carried = false;
                    break;
                }
            }
            if carried {
                digits.insert(0, 1);
                int_len += 1;
            }
        }
    } else {
        digits.resize(keep, 0);
    }

    let to_text = |slice: &[u8]| slice.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let int = to_text(&digits[..int_len]);
    let int = int.trim_start_matches('0').to_string();
    (int, to_text(&digits[int_len..]))
}

/// Mantissa with `decimals` fraction digits and a decimal exponent
fn scientific(value: f64, decimals: usize) -> (String, i32) {
    let rendered = format!("{:.*e}", decimals, value);
    match rendered.split_once('e') {
        Some((mantissa, exponent)) => (mantissa.to_string(), exponent.parse().unwrap_or(0)),
        None => (rendered, 0),
    }
}

/// General format limited to `digits` significant digits
fn significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let rendered = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exponent)) = rendered.split_once('e') else {
        return rendered;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent < -5 || exponent >= digits as i32 {
        let mantissa = trim_fraction(mantissa);
        let exponent_sign = if exponent < 0 { '-' } else { '+' };
        format!("{}E{}{:02}", mantissa, exponent_sign, exponent.abs())
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        let rounded: f64 = format!("{}e{}", mantissa, exponent)
            .parse()
            .unwrap_or(value);
        trim_fraction(&format!("{:.*}", decimals, rounded))
    }
}

fn trim_fraction(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text.to_string()
    }
}

// === CUSTOM PATTERNS ===

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Digit { zero: bool },
    Point,
    Group,
    Percent,
    Exponent { upper: bool, plus: bool, digits: usize },
    Literal(String),
}

fn split_sections(pattern: &str) -> Vec<String> {
    let mut sections = vec![String::new()];
    let mut chars = pattern.chars();
    let mut quote: Option<char> = None;
    while let Some(c) = chars.next() {
        let Some(current) = sections.last_mut() else {
            break;
        };
        match (quote, c) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                current.push(c);
            }
            (None, '\\') => {
                current.push(c);
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            (None, ';') => sections.push(String::new()),
            (None, c) => current.push(c),
        }
    }
    sections
}

fn parse_section(section: &str) -> Vec<Part> {
    let chars: Vec<char> = section.chars().collect();
    let mut parts = Vec::new();
    let mut seen_point = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '0' => parts.push(Part::Digit { zero: true }),
            '#' => parts.push(Part::Digit { zero: false }),
            '.' if !seen_point => {
                seen_point = true;
                parts.push(Part::Point);
            }
            '.' => {}
            ',' => parts.push(Part::Group),
            '%' => parts.push(Part::Percent),
            'E' | 'e' => {
                let mut j = i;
                let mut plus = false;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    plus = chars[j] == '+';
                    j += 1;
                }
                let start = j;
                while j < chars.len() && chars[j] == '0' {
                    j += 1;
                }
                if j > start {
                    parts.push(Part::Exponent {
                        upper: c == 'E',
                        plus,
                        digits: j - start,
                    });
                    i = j;
                } else {
                    parts.push(Part::Literal(c.to_string()));
                }
            }
            '\\' => {
                if let Some(escaped) = chars.get(i) {
                    parts.push(Part::Literal(escaped.to_string()));
                    i += 1;
                }
            }
            '\'' | '"' => {
                let mut literal = String::new();
                while i < chars.len() && chars[i] != c {
                    literal.push(chars[i]);
                    i += 1;
                }
                i += 1;
                parts.push(Part::Literal(literal));
            }
            other => parts.push(Part::Literal(other.to_string())),
        }
    }
    parts
}

struct Layout {
    parts: Vec<Part>,
    grouping: bool,
    scaling: i32,
    int_places: usize,
    min_int: usize,
    max_frac: usize,
    min_frac: usize,
    percent: i32,
    exponent: bool,
}

impl Layout {
    fn new(section: &str) -> Self {
        let parsed = parse_section(section);
        let point = parsed
            .iter()
            .position(|part| *part == Part::Point)
            .unwrap_or(parsed.len());
        let last_int_digit = parsed[..point]
            .iter()
            .rposition(|part| matches!(part, Part::Digit { .. }));

        let mut grouping = false;
        let mut scaling = 0;
        let mut parts = Vec::with_capacity(parsed.len());
        for (i, part) in parsed.into_iter().enumerate() {
            if part == Part::Group {
                match last_int_digit {
                    Some(last) if i < last => grouping = true,
                    Some(_) if i < point => scaling += 1,
                    _ => {}
                }
                continue;
            }
            parts.push(part);
        }

        let point = parts
            .iter()
            .position(|part| *part == Part::Point)
            .unwrap_or(parts.len());
        let int_digits: Vec<bool> = parts[..point]
            .iter()
            .filter_map(|part| match part {
                Part::Digit { zero } => Some(*zero),
                _ => None,
            })
            .collect();
        let frac_digits: Vec<bool> = parts[point..]
            .iter()
            .filter_map(|part| match part {
                Part::Digit { zero } => Some(*zero),
                _ => None,
            })
            .collect();

        Layout {
            grouping,
            scaling,
            int_places: int_digits.len(),
            min_int: int_digits
                .iter()
                .position(|zero| *zero)
                .map_or(0, |first| int_digits.len() - first),
            max_frac: frac_digits.len(),
            min_frac: frac_digits.iter().rposition(|zero| *zero).map_or(0, |last| last + 1),
            percent: parts.iter().filter(|part| **part == Part::Percent).count() as i32,
            exponent: parts.iter().any(|part| matches!(part, Part::Exponent { .. })),
            parts,
        }
    }

    fn render(&self, value: f64, signed: bool) -> String {
        let scaled = value.abs() * 100f64.powi(self.percent) / 1000f64.powi(self.scaling);

        let (mut int, mut frac, exponent) = if self.exponent {
            self.mantissa(scaled)
        } else {
            let (int, frac) = decimal_digits(scaled, self.max_frac);
            (int, frac, 0)
        };
        let negative = signed && value < 0.0 && !all_zero(&int, &frac);

        while frac.len() > self.min_frac && frac.ends_with('0') {
            frac.pop();
        }
        if int.len() < self.min_int {
            int = format!("{}{}", "0".repeat(self.min_int - int.len()), int);
        }

        let int: Vec<char> = int.chars().collect();
        let mut out = String::new();
        if negative {
            out.push('-');
        }
        let mut int_seen = 0;
        let mut frac_seen = 0;
        let mut after_point = false;
        for part in &self.parts {
            match part {
                Part::Digit { .. } if !after_point => {
                    let position = int.len() as isize - (self.int_places - int_seen) as isize;
                    if int_seen == 0 {
                        for j in 0..=position.max(-1) {
                            self.push_int_digit(&mut out, &int, j as usize);
                        }
                    } else if position >= 0 {
                        self.push_int_digit(&mut out, &int, position as usize);
                    }
                    int_seen += 1;
                }
                Part::Digit { .. } => {
                    if let Some(c) = frac.chars().nth(frac_seen) {
                        out.push(c);
                    }
                    frac_seen += 1;
                }
                Part::Point => {
                    if self.int_places == 0 {
                        for j in 0..int.len() {
                            self.push_int_digit(&mut out, &int, j);
                        }
                    }
                    after_point = true;
                    if !frac.is_empty() {
                        out.push('.');
                    }
                }
                Part::Percent => out.push('%'),
                Part::Exponent { upper, plus, digits } => {
                    out.push(if *upper { 'E' } else { 'e' });
                    if exponent < 0 {
                        out.push('-');
                    } else if *plus {
                        out.push('+');
                    }
                    out.push_str(&format!("{:0width$}", exponent.abs(), width = *digits));
                }
                Part::Literal(text) => out.push_str(text),
                Part::Group => {}
            }
        }
        out
    }

    fn push_int_digit(&self, out: &mut String, int: &[char], index: usize) {
        if let Some(c) = int.get(index) {
            if self.grouping && index > 0 && (int.len() - index) % 3 == 0 {
                out.push(',');
            }
            out.push(*c);
        }
    }

    /// Shift `value` so the integer placeholders hold its leading digits
    fn mantissa(&self, value: f64) -> (String, String, i32) {
        let places = self.int_places.max(1) as i32;
        if value == 0.0 {
            let (int, frac) = decimal_digits(0.0, self.max_frac);
            return (int, frac, 0);
        }
        let mut exponent = value.log10().floor() as i32 - (places - 1);
        loop {
            let (int, frac) = decimal_digits(value / 10f64.powi(exponent), self.max_frac);
            if int.len() as i32 > places {
                exponent += 1;
                continue;
            }
            return (int, frac, exponent);
        }
    }
}

/// Render a custom numeric pattern with up to three sections
fn custom(value: f64, pattern: &str) -> String {
    let sections = split_sections(pattern);
    let pick = |index: usize| sections.get(index).filter(|section| !section.is_empty());
    if value < 0.0 {
        if let Some(section) = pick(1) {
            return Layout::new(section).render(value, false);
        }
    }
    if value == 0.0 {
        if let Some(section) = pick(2) {
            return Layout::new(section).render(value, false);
        }
    }
    let first = sections.first().map(String::as_str).unwrap_or_default();
    Layout::new(first).render(value, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    fn number(value: f64, style: &str) -> String {
        format_value(&Value::Double(value), style).unwrap()
    }

    #[test]
    fn test_named_styles() {
        assert_eq!(number(1234.5, "Currency"), "$1,234.50");
        assert_eq!(number(-1234.5, "currency"), "($1,234.50)");
        assert_eq!(number(1234.567, "Fixed"), "1234.57");
        assert_eq!(number(1234.567, "Standard"), "1,234.57");
        assert_eq!(number(0.125, "Percent"), "12.50%");
        assert_eq!(number(12345.0, "Scientific"), "1.23E+04");
        assert_eq!(number(0.0, "Yes/No"), "No");
        assert_eq!(number(2.5, "General Number"), "2.5");
        assert_eq!(format_value(&Value::Boolean(true), "On/Off").unwrap(), "On");
    }

    #[test]
    fn test_standard_specifiers() {
        assert_eq!(format_value(&Value::Integer(42), "D5").unwrap(), "00042");
        assert_eq!(format_value(&Value::Integer(-42), "D").unwrap(), "-42");
        assert_eq!(format_value(&Value::Integer(255), "X4").unwrap(), "00FF");
        assert_eq!(format_value(&Value::Integer(255), "x").unwrap(), "ff");
        assert_eq!(number(1234.5678, "N1"), "1,234.6");
        assert_eq!(number(-0.5, "F0"), "-1");
        assert_eq!(number(1234.5, "E2"), "1.23E+003");
        assert_eq!(number(123.456, "G4"), "123.5");
        assert_matches!(
            format_value(&Value::Double(1.5), "D2"),
            Err(EvalError::Function { .. })
        );
        assert_matches!(
            format_value(&Value::Integer(1), "Q"),
            Err(EvalError::Function { .. })
        );
    }

    #[test]
    fn test_custom_patterns() {
        assert_eq!(number(1234.5, "#,##0.00"), "1,234.50");
        assert_eq!(number(0.5, "#.##"), ".5");
        assert_eq!(number(5.0, "#.##"), "5");
        assert_eq!(number(7.0, "000"), "007");
        assert_eq!(number(2.5, "0"), "3");
        assert_eq!(number(-3.0, "0.0"), "-3.0");
        assert_eq!(number(5551234567.0, "(###) ###-####"), "(555) 123-4567");
        assert_eq!(number(1234567.0, "#,##0,"), "1,235");
        assert_eq!(number(0.256, "0.0%"), "25.6%");
        assert_eq!(number(1500.0, "0.0E+00"), "1.5E+03");
        assert_eq!(number(1234.0, "'#'0"), "#1234");
    }

    #[test]
    fn test_sections() {
        assert_eq!(number(5.0, "0.0;(0.0);zero"), "5.0");
        assert_eq!(number(-5.0, "0.0;(0.0);zero"), "(5.0)");
        assert_eq!(number(0.0, "0.0;(0.0);zero"), "zero");
    }

    #[test]
    fn test_dates_and_text() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 4)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        let value = Value::date_time(date);
        assert_eq!(format_value(&value, "Long Date").unwrap(), "Thursday, July 4, 2024");
        assert_eq!(format_value(&value, "Short Time").unwrap(), "15:30");
        assert_eq!(format_value(&value, "yyyy/MM/dd").unwrap(), "2024/07/04");
        assert_eq!(format_value(&Value::text("12.5"), "0.00").unwrap(), "12.50");
        assert_eq!(format_value(&Value::text("hello"), "0.00").unwrap(), "hello");
        assert_eq!(format_value(&Value::Nothing, "0").unwrap(), "");
        assert_eq!(format_value(&Value::Integer(7), "").unwrap(), "7");
    }
}
