//! en-US date and time rendering and parsing
//!
//! Patterns use the letter vocabulary formula authors write in `Format` and
//! `ToString` (`d`, `MMMM`, `yyyy`, `h`, `tt`, ...).

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Day names, Sunday first
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const DAY_ABBREVIATIONS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub const GENERAL_PATTERN: &str = "M/d/yyyy h:mm:ss tt";
pub const SHORT_DATE_PATTERN: &str = "M/d/yyyy";
pub const LONG_DATE_PATTERN: &str = "dddd, MMMM d, yyyy";
pub const SHORT_TIME_PATTERN: &str = "h:mm tt";
pub const LONG_TIME_PATTERN: &str = "h:mm:ss tt";

const PARSE_DATE_TIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%A, %B %d, %Y %I:%M:%S %p",
    "%B %d, %Y %I:%M:%S %p",
];

const PARSE_DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%m/%d/%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%A, %B %d, %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const PARSE_TIME_FORMATS: &[&str] = &["%I:%M:%S %p", "%I:%M %p", "%I %p", "%H:%M:%S%.f", "%H:%M"];

/// 1/1/0001 12:00:00 AM
pub fn min_value() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// 12/31/9999 11:59:59 PM plus 999 milliseconds
pub fn max_value() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|date| date.and_hms_milli_opt(23, 59, 59, 999))
        .unwrap_or_default()
}

/// Whether a value lies within the representable calendar range
pub fn in_range(value: &NaiveDateTime) -> bool {
    *value >= min_value() && *value <= max_value()
}

/// Midnight of the first representable day at the given time
pub fn time_only(time: NaiveTime) -> NaiveDateTime {
    min_value().date().and_time(time)
}

/// Default rendering, `M/d/yyyy h:mm:ss tt`
pub fn format_general(value: &NaiveDateTime) -> String {
    format_custom(value, GENERAL_PATTERN)
}

/// Render with a standard (single letter) or custom pattern
pub fn format(value: &NaiveDateTime, pattern: &str) -> String {
    if pattern.is_empty() {
        return format_general(value);
    }
    let mut chars = pattern.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => match standard_pattern(letter) {
            Some(expanded) => format_custom(value, expanded),
            None => format_custom(value, pattern),
        },
        _ => format_custom(value, pattern),
    }
}

fn standard_pattern(letter: char) -> Option<&'static str> {
    let pattern = match letter {
        'd' => SHORT_DATE_PATTERN,
        'D' => LONG_DATE_PATTERN,
        'f' => "dddd, MMMM d, yyyy h:mm tt",
        'F' => "dddd, MMMM d, yyyy h:mm:ss tt",
        'g' => "M/d/yyyy h:mm tt",
        'G' => GENERAL_PATTERN,
        'm' | 'M' => "MMMM d",
        'o' | 'O' => "yyyy'-'MM'-'dd'T'HH':'mm':'ss'.'fffffff",
        's' => "yyyy'-'MM'-'dd'T'HH':'mm':'ss",
        't' => SHORT_TIME_PATTERN,
        'T' => LONG_TIME_PATTERN,
        'u' => "yyyy'-'MM'-'dd HH':'mm':'ss'Z'",
        'y' | 'Y' => "MMMM yyyy",
        _ => return None,
    };
    Some(pattern)
}

/// Render with a custom pattern such as `yyyy-MM-dd HH:mm`
pub fn format_custom(value: &NaiveDateTime, pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&x| x == c).count();

        match c {
            'd' => {
                let weekday = value.weekday().num_days_from_sunday() as usize;
                match run {
                    1 => out.push_str(&value.day().to_string()),
                    2 => out.push_str(&format!("{:02}", value.day())),
                    3 => out.push_str(DAY_ABBREVIATIONS[weekday]),
                    _ => out.push_str(DAY_NAMES[weekday]),
                }
                i += run;
            }
            'M' => {
                let month = value.month0() as usize;
                match run {
                    1 => out.push_str(&value.month().to_string()),
                    2 => out.push_str(&format!("{:02}", value.month())),
                    3 => out.push_str(MONTH_ABBREVIATIONS[month]),
                    _ => out.push_str(MONTH_NAMES[month]),
                }
                i += run;
            }
            'y' => {
                let year = value.year();
                match run {
                    1 => out.push_str(&(year % 100).to_string()),
                    2 => out.push_str(&format!("{:02}", year % 100)),
                    width => out.push_str(&format!("{:0width$}", year, width = width)),
                }
                i += run;
            }
            'h' => {
                let hour = match value.hour() % 12 {
                    0 => 12,
                    other => other,
                };
                push_number(&mut out, hour, run);
                i += run;
            }
            'H' => {
                push_number(&mut out, value.hour(), run);
                i += run;
            }
            'm' => {
                push_number(&mut out, value.minute(), run);
                i += run;
            }
            's' => {
                push_number(&mut out, value.second(), run);
                i += run;
            }
            'f' | 'F' => {
                let digits = run.min(7);
                let fraction = format!("{:09}", value.nanosecond() % 1_000_000_000);
                let fraction = &fraction[..digits];
                if c == 'f' {
                    out.push_str(fraction);
                } else {
                    let trimmed = fraction.trim_end_matches('0');
                    if trimmed.is_empty() && out.ends_with('.') {
                        out.pop();
                    }
                    out.push_str(trimmed);
                }
                i += run;
            }
            't' => {
                let designator = if value.hour() < 12 { "AM" } else { "PM" };
                if run == 1 {
                    out.push_str(&designator[..1]);
                } else {
                    out.push_str(designator);
                }
                i += run;
            }
            '\'' | '"' => {
                i += 1;
                while i < chars.len() && chars[i] != c {
                    out.push(chars[i]);
                    i += 1;
                }
                i += 1;
            }
            '\\' => {
                if let Some(next) = chars.get(i + 1) {
                    out.push(*next);
                }
                i += 2;
            }
            '%' => {
                i += 1;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }

    out
}

fn push_number(out: &mut String, value: u32, run: usize) {
    if run == 1 {
        out.push_str(&value.to_string());
    } else {
        out.push_str(&format!("{:02}", value));
    }
}

/// Parse a date, a time or both
///
/// Time-only text lands on the first representable day.
pub fn parse(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    PARSE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            PARSE_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .or_else(|| {
            PARSE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
                .map(time_only)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moment(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_general_format() {
        assert_eq!(format_general(&moment(2024, 3, 5, 0, 7, 9)), "3/5/2024 12:07:09 AM");
        assert_eq!(format_general(&moment(1999, 12, 31, 23, 59, 0)), "12/31/1999 11:59:00 PM");
        assert_eq!(format_general(&min_value()), "1/1/0001 12:00:00 AM");
    }

    #[test]
    fn test_standard_patterns() {
        let value = moment(2024, 7, 4, 15, 30, 0);
        assert_eq!(format(&value, "d"), "7/4/2024");
        assert_eq!(format(&value, "D"), "Thursday, July 4, 2024");
        assert_eq!(format(&value, "t"), "3:30 PM");
        assert_eq!(format(&value, "s"), "2024-07-04T15:30:00");
        assert_eq!(format(&value, "Y"), "July 2024");
    }

    #[test]
    fn test_custom_patterns() {
        let value = moment(2024, 7, 4, 9, 5, 3);
        assert_eq!(format(&value, "yyyy-MM-dd HH:mm:ss"), "2024-07-04 09:05:03");
        assert_eq!(format(&value, "ddd MMM d yy"), "Thu Jul 4 24");
        assert_eq!(format(&value, "h 'o''clock' t"), "9 oclock A");
        assert_eq!(format(&value, "\\d\\a\\y d"), "day 4");
        assert_eq!(format(&value, "HH:mm:ss.fff"), "09:05:03.000");
        assert_eq!(format(&value, "ss.FFF"), "03");
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse("3/5/2024"), Some(moment(2024, 3, 5, 0, 0, 0)));
        assert_eq!(parse(" 2024-03-05 "), Some(moment(2024, 3, 5, 0, 0, 0)));
        assert_eq!(parse("3/5/2024 1:15 PM"), Some(moment(2024, 3, 5, 13, 15, 0)));
        assert_eq!(parse("March 5, 2024"), Some(moment(2024, 3, 5, 0, 0, 0)));
        assert_eq!(parse("2024-03-05T08:00:00"), Some(moment(2024, 3, 5, 8, 0, 0)));
        assert_eq!(parse("4:30 PM"), Some(moment(1, 1, 1, 16, 30, 0)));
        assert_eq!(parse("not a date"), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_range() {
        assert!(in_range(&moment(2024, 1, 1, 0, 0, 0)));
        assert!(!in_range(&moment(10000, 1, 1, 0, 0, 0)));
        assert_eq!(max_value().year(), 9999);
    }
}
