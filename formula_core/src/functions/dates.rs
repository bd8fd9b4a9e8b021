//! Date functions, `DateTime` members and the enumeration members
//!
//! Week-based calculations use Sunday as the first day of the week and the
//! week containing January 1 as the first week of the year.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Timelike};

use crate::config::compile_time::functions::TWO_DIGIT_YEAR_PIVOT;
use crate::evaluation::{EvalError, EvalResult};
use crate::functions::{
    bool_arg, date_arg, double_arg, first_day_arg, int_arg, interval_arg, text_arg,
};
use crate::resolution::{FunctionRegistry, MemberTable};
use crate::types::{datetime, DateInterval, FirstDayOfWeek, FormulaType, Value};

const UNREPRESENTABLE: &str =
    "The added or subtracted value results in an un-representable DateTime.";
const ADD_OUT_OF_RANGE: &str = "Value to add was out of range.";

const MILLIS_PER_SECOND: f64 = 1_000.0;
const MILLIS_PER_MINUTE: f64 = 60_000.0;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;
// Span of the representable calendar, 1/1/0001 to 1/1/10000
const MAX_MILLIS: f64 = 315_537_897_600_000.0;

pub fn register(registry: &mut FunctionRegistry) {
    use FormulaType::{Boolean, DateTime, Double, Integer, Text};
    let interval = FormulaType::DateInterval;
    let first_day = FormulaType::FirstDayOfWeek;

    registry
        .register_type(FormulaType::DateInterval)
        .register_type(FormulaType::FirstDayOfWeek)
        .register_property("Now", DateTime, || Ok(Value::date_time(now())))
        .register_property("Today", DateTime, || Ok(Value::date_time(midnight(now()))))
        .register_property("TimeOfDay", DateTime, || {
            Ok(Value::date_time(datetime::time_only(now().time())))
        });

    registry
        .register("DateAdd", vec![interval.clone(), Double, DateTime], DateTime, |args| {
            date_add(interval_arg(args, 0)?, double_arg(args, 1)?, date_arg(args, 2)?)
                .map(Value::date_time)
        })
        .register("DateDiff", vec![interval.clone(), DateTime, DateTime], Integer, |args| {
            date_diff(interval_arg(args, 0)?, date_arg(args, 1)?, date_arg(args, 2)?)
                .map(Value::Integer)
        })
        .register("DatePart", vec![interval, DateTime], Integer, |args| {
            Ok(Value::Integer(date_part(interval_arg(args, 0)?, &date_arg(args, 1)?)))
        })
        .register("DateSerial", vec![Integer, Integer, Integer], DateTime, |args| {
            date_serial(int_arg(args, 0)?, int_arg(args, 1)?, int_arg(args, 2)?)
                .map(Value::date_time)
        })
        .register("DateValue", vec![Text], DateTime, |args| {
            let date = parse_date(text_arg(args, 0)?)?;
            Ok(Value::date_time(midnight(date)))
        })
        .register("TimeValue", vec![Text], DateTime, |args| {
            let date = parse_date(text_arg(args, 0)?)?;
            Ok(Value::date_time(datetime::time_only(date.time())))
        })
        .register("TimeSerial", vec![Integer, Integer, Integer], DateTime, |args| {
            time_serial(int_arg(args, 0)?, int_arg(args, 1)?, int_arg(args, 2)?)
                .map(Value::date_time)
        })
        .register("Year", vec![DateTime], Integer, |args| {
            Ok(Value::Integer(date_arg(args, 0)?.year()))
        })
        .register("Month", vec![DateTime], Integer, |args| {
            Ok(Value::Integer(date_arg(args, 0)?.month() as i32))
        })
        .register("Day", vec![DateTime], Integer, |args| {
            Ok(Value::Integer(date_arg(args, 0)?.day() as i32))
        })
        .register("Hour", vec![DateTime], Integer, |args| {
            Ok(Value::Integer(date_arg(args, 0)?.hour() as i32))
        })
        .register("Minute", vec![DateTime], Integer, |args| {
            Ok(Value::Integer(date_arg(args, 0)?.minute() as i32))
        })
        .register("Second", vec![DateTime], Integer, |args| {
            Ok(Value::Integer(date_arg(args, 0)?.second() as i32))
        })
        .register("MonthName", vec![Integer, Boolean], Text, |args| {
            month_name(int_arg(args, 0)?, bool_arg(args, 1)?).map(Value::text)
        })
        .register("Weekday", vec![DateTime, first_day.clone()], Integer, |args| {
            Ok(Value::Integer(weekday(&date_arg(args, 0)?, first_day_arg(args, 1)?)))
        })
        .register("WeekdayName", vec![Integer, Boolean, first_day], Text, |args| {
            weekday_name(int_arg(args, 0)?, bool_arg(args, 1)?, first_day_arg(args, 2)?)
                .map(Value::text)
        });
}

/// `DateTime` properties and methods, and the members of both enumerations
pub fn register_members(members: &mut MemberTable) {
    use FormulaType::{DateTime, Double, Integer, Text};

    members
        .allow_reads(DateTime)
        .allow_calls(DateTime)
        .allow_reads(FormulaType::DateInterval)
        .allow_reads(FormulaType::FirstDayOfWeek);

    let integer_parts: [(&str, fn(&NaiveDateTime) -> i32); 9] = [
        ("Year", |d: &NaiveDateTime| d.year()),
        ("Month", |d: &NaiveDateTime| d.month() as i32),
        ("Day", |d: &NaiveDateTime| d.day() as i32),
        ("Hour", |d: &NaiveDateTime| d.hour() as i32),
        ("Minute", |d: &NaiveDateTime| d.minute() as i32),
        ("Second", |d: &NaiveDateTime| d.second() as i32),
        ("Millisecond", |d: &NaiveDateTime| (d.nanosecond() / 1_000_000).min(999) as i32),
        ("DayOfYear", |d: &NaiveDateTime| d.ordinal() as i32),
        ("DayOfWeek", |d: &NaiveDateTime| d.weekday().num_days_from_sunday() as i32),
    ];
    for (name, part) in integer_parts {
        members.add_property(DateTime, name, Integer, move |target| {
            Ok(Value::Integer(part(&target_date(target)?)))
        });
    }

    members
        .add_property(DateTime, "Date", DateTime, |target| {
            Ok(Value::date_time(midnight(target_date(target)?)))
        })
        .add_property(DateTime, "Now", DateTime, |_| Ok(Value::date_time(now())))
        .add_property(DateTime, "Today", DateTime, |_| {
            Ok(Value::date_time(midnight(now())))
        })
        .add_property(DateTime, "MinValue", DateTime, |_| {
            Ok(Value::date_time(datetime::min_value()))
        })
        .add_property(DateTime, "MaxValue", DateTime, |_| {
            Ok(Value::date_time(datetime::max_value()))
        });

    members
        .add_method(DateTime, "AddYears", vec![Integer], DateTime, |target, args| {
            let years = i64::from(int_arg(args, 0)?);
            add_months(target_date(target)?, years * 12).map(Value::date_time)
        })
        .add_method(DateTime, "AddMonths", vec![Integer], DateTime, |target, args| {
            let months = i64::from(int_arg(args, 0)?);
            add_months(target_date(target)?, months).map(Value::date_time)
        });

    let scaled: [(&str, f64); 5] = [
        ("AddDays", MILLIS_PER_DAY),
        ("AddHours", MILLIS_PER_HOUR),
        ("AddMinutes", MILLIS_PER_MINUTE),
        ("AddSeconds", MILLIS_PER_SECOND),
        ("AddMilliseconds", 1.0),
    ];
    for (name, scale) in scaled {
        members.add_method(DateTime, name, vec![Double], DateTime, move |target, args| {
            add_scaled(target_date(target)?, double_arg(args, 0)?, scale).map(Value::date_time)
        });
    }

    let patterns: [(&str, &'static str); 4] = [
        ("ToShortDateString", datetime::SHORT_DATE_PATTERN),
        ("ToLongDateString", datetime::LONG_DATE_PATTERN),
        ("ToShortTimeString", datetime::SHORT_TIME_PATTERN),
        ("ToLongTimeString", datetime::LONG_TIME_PATTERN),
    ];
    for (name, pattern) in patterns {
        members.add_method(DateTime, name, vec![], Text, move |target, _| {
            Ok(Value::Text(datetime::format_custom(&target_date(target)?, pattern)))
        });
    }

    members
        .add_method(DateTime, "ToString", vec![], Text, |target, _| {
            Ok(Value::Text(datetime::format_general(&target_date(target)?)))
        })
        .add_method(DateTime, "ToString", vec![Text], Text, |target, args| {
            Ok(Value::Text(datetime::format(&target_date(target)?, text_arg(args, 0)?)))
        });

    for interval in DateInterval::ALL {
        members.add_property(
            FormulaType::DateInterval,
            interval.name(),
            FormulaType::DateInterval,
            move |_| Ok(Value::date_interval(interval)),
        );
    }
    for day in FirstDayOfWeek::ALL {
        members.add_property(
            FormulaType::FirstDayOfWeek,
            day.name(),
            FormulaType::FirstDayOfWeek,
            move |_| Ok(Value::first_day_of_week(day)),
        );
    }
}

fn target_date(target: &Value) -> EvalResult<NaiveDateTime> {
    target.as_date_time().ok_or_else(EvalError::type_mismatch)
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn midnight(value: NaiveDateTime) -> NaiveDateTime {
    value.date().and_hms_opt(0, 0, 0).unwrap_or(value)
}

fn parse_date(text: &str) -> EvalResult<NaiveDateTime> {
    datetime::parse(text).ok_or_else(|| {
        EvalError::conversion(format!(
            "Conversion from string \"{}\" to type 'Date' is not valid.",
            text
        ))
    })
}

fn in_range(value: NaiveDateTime, message: &str) -> EvalResult<NaiveDateTime> {
    if datetime::in_range(&value) {
        Ok(value)
    } else {
        Err(EvalError::function(message))
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Calendar month arithmetic; the day is clamped to the target month's length
pub fn add_months(value: NaiveDateTime, months: i64) -> EvalResult<NaiveDateTime> {
    let total = i64::from(value.year()) * 12 + i64::from(value.month0()) + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    if !(1..=9999).contains(&year) {
        return Err(EvalError::function(UNREPRESENTABLE));
    }
    let year = year as i32;
    let day = value.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| date.and_time(value.time()))
        .ok_or_else(|| EvalError::function(UNREPRESENTABLE))
}

/// Add `amount` units of `scale` milliseconds, rounded to the millisecond
pub fn add_scaled(value: NaiveDateTime, amount: f64, scale: f64) -> EvalResult<NaiveDateTime> {
    let millis = amount * scale;
    let millis = (millis + if millis >= 0.0 { 0.5 } else { -0.5 }).trunc();
    if !millis.is_finite() || millis.abs() >= MAX_MILLIS {
        return Err(EvalError::function(ADD_OUT_OF_RANGE));
    }
    let shifted = value
        .checked_add_signed(Duration::milliseconds(millis as i64))
        .ok_or_else(|| EvalError::function(ADD_OUT_OF_RANGE))?;
    in_range(shifted, ADD_OUT_OF_RANGE)
}

fn fix_to_int(number: f64) -> EvalResult<i64> {
    let fixed = number.trunc();
    if fixed.is_nan() || fixed < f64::from(i32::MIN) || fixed > f64::from(i32::MAX) {
        return Err(EvalError::overflow());
    }
    Ok(fixed as i64)
}

pub fn date_add(interval: DateInterval, number: f64, value: NaiveDateTime) -> EvalResult<NaiveDateTime> {
    match interval {
        DateInterval::Year => add_months(value, fix_to_int(number)? * 12),
        DateInterval::Quarter => add_months(value, fix_to_int(number)? * 3),
        DateInterval::Month => add_months(value, fix_to_int(number)?),
        DateInterval::WeekOfYear => {
            add_scaled(value, fix_to_int(number)? as f64 * 7.0, MILLIS_PER_DAY)
        }
        DateInterval::DayOfYear | DateInterval::Day | DateInterval::Weekday => {
            add_scaled(value, fix_to_int(number)? as f64, MILLIS_PER_DAY)
        }
        DateInterval::Hour => add_scaled(value, number, MILLIS_PER_HOUR),
        DateInterval::Minute => add_scaled(value, number, MILLIS_PER_MINUTE),
        DateInterval::Second => add_scaled(value, number, MILLIS_PER_SECOND),
    }
}

fn week_start(value: NaiveDateTime) -> NaiveDate {
    let date = value.date();
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Number of interval boundaries between two dates, narrowed to `Integer`
pub fn date_diff(interval: DateInterval, first: NaiveDateTime, second: NaiveDateTime) -> EvalResult<i32> {
    let elapsed = second.signed_duration_since(first);
    let years = i64::from(second.year()) - i64::from(first.year());
    let difference = match interval {
        DateInterval::Year => years,
        DateInterval::Quarter => {
            years * 4 + i64::from(second.month0() / 3) - i64::from(first.month0() / 3)
        }
        DateInterval::Month => years * 12 + i64::from(second.month()) - i64::from(first.month()),
        DateInterval::DayOfYear | DateInterval::Day => elapsed.num_days(),
        DateInterval::Weekday => elapsed.num_days() / 7,
        DateInterval::WeekOfYear => (week_start(second) - week_start(first)).num_days() / 7,
        DateInterval::Hour => elapsed.num_hours(),
        DateInterval::Minute => elapsed.num_minutes(),
        DateInterval::Second => elapsed.num_seconds(),
    };
    i32::try_from(difference).map_err(|_| EvalError::overflow())
}

pub fn date_part(interval: DateInterval, value: &NaiveDateTime) -> i32 {
    match interval {
        DateInterval::Year => value.year(),
        DateInterval::Quarter => (value.month0() / 3 + 1) as i32,
        DateInterval::Month => value.month() as i32,
        DateInterval::DayOfYear => value.ordinal() as i32,
        DateInterval::Day => value.day() as i32,
        DateInterval::WeekOfYear => {
            let january_first = value.with_ordinal(1).unwrap_or(*value);
            let offset = january_first.weekday().num_days_from_sunday();
            ((value.ordinal0() + offset) / 7 + 1) as i32
        }
        DateInterval::Weekday => weekday(value, FirstDayOfWeek::Sunday),
        DateInterval::Hour => value.hour() as i32,
        DateInterval::Minute => value.minute() as i32,
        DateInterval::Second => value.second() as i32,
    }
}

/// Build a date from parts that may overflow into neighbouring months
///
/// Two-digit years pivot around the configured century boundary and
/// negative years count back from the current year.
pub fn date_serial(year: i32, month: i32, day: i32) -> EvalResult<NaiveDateTime> {
    let year = match year {
        y if y < 0 => now().year() + y,
        y if y < TWO_DIGIT_YEAR_PIVOT => 2000 + y,
        y if y < 100 => 1900 + y,
        y => y,
    };
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .filter(datetime::in_range)
        .ok_or_else(|| EvalError::invalid_argument("Year"))?;
    let shifted = add_months(start, i64::from(month) - 1)?;
    add_scaled(shifted, f64::from(day) - 1.0, MILLIS_PER_DAY)
}

/// A time of day on the first representable day; negative totals wrap
/// back from midnight once
pub fn time_serial(hour: i32, minute: i32, second: i32) -> EvalResult<NaiveDateTime> {
    let mut seconds = i64::from(hour) * 3_600 + i64::from(minute) * 60 + i64::from(second);
    if seconds < 0 {
        seconds += 86_400;
    }
    if seconds < 0 {
        return Err(EvalError::function(UNREPRESENTABLE));
    }
    add_scaled(datetime::min_value(), seconds as f64, MILLIS_PER_SECOND)
}

pub fn month_name(month: i32, abbreviate: bool) -> EvalResult<&'static str> {
    match month {
        1..=12 => {
            let index = (month - 1) as usize;
            Ok(if abbreviate {
                datetime::MONTH_ABBREVIATIONS[index]
            } else {
                datetime::MONTH_NAMES[index]
            })
        }
        13 => Ok(""),
        _ => Err(EvalError::invalid_argument("Month")),
    }
}

/// 1-based day of the week counted from `first_day`
pub fn weekday(value: &NaiveDateTime, first_day: FirstDayOfWeek) -> i32 {
    let from_sunday = value.weekday().num_days_from_sunday() as i32;
    (from_sunday - first_day.days_from_sunday()).rem_euclid(7) + 1
}

pub fn weekday_name(
    weekday: i32,
    abbreviate: bool,
    first_day: FirstDayOfWeek,
) -> EvalResult<&'static str> {
    if !(1..=7).contains(&weekday) {
        return Err(EvalError::invalid_argument("Weekday"));
    }
    let index = ((weekday - 1 + first_day.days_from_sunday()) % 7) as usize;
    Ok(if abbreviate {
        datetime::DAY_ABBREVIATIONS[index]
    } else {
        datetime::DAY_NAMES[index]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::test_support::call;
    use crate::resolution::{ReferenceResolver, Resolver};
    use assert_matches::assert_matches;

    fn moment(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_date_add() {
        let start = moment(2024, 1, 31, 8, 0, 0);
        assert_eq!(date_add(DateInterval::Month, 1.0, start).unwrap(), moment(2024, 2, 29, 8, 0, 0));
        assert_eq!(date_add(DateInterval::Quarter, 1.0, start).unwrap(), moment(2024, 4, 30, 8, 0, 0));
        assert_eq!(date_add(DateInterval::Day, 1.9, start).unwrap(), moment(2024, 2, 1, 8, 0, 0));
        assert_eq!(date_add(DateInterval::Hour, 1.5, start).unwrap(), moment(2024, 1, 31, 9, 30, 0));
        assert_eq!(date_add(DateInterval::WeekOfYear, -1.0, start).unwrap(), moment(2024, 1, 24, 8, 0, 0));
        assert_matches!(
            date_add(DateInterval::Year, 9000.0, start),
            Err(EvalError::Function { .. })
        );
    }

    #[test]
    fn test_date_diff() {
        let first = moment(2023, 12, 30, 12, 0, 0);
        let second = moment(2024, 1, 2, 6, 0, 0);
        assert_eq!(date_diff(DateInterval::Year, first, second).unwrap(), 1);
        assert_eq!(date_diff(DateInterval::Month, first, second).unwrap(), 1);
        assert_eq!(date_diff(DateInterval::Day, first, second).unwrap(), 2);
        assert_eq!(date_diff(DateInterval::Hour, first, second).unwrap(), 66);
        // Saturday 12/30 and Tuesday 1/2 sit in adjacent weeks
        assert_eq!(date_diff(DateInterval::WeekOfYear, first, second).unwrap(), 1);
        assert_eq!(date_diff(DateInterval::Day, second, first).unwrap(), -2);
        assert_matches!(
            date_diff(DateInterval::Second, datetime::min_value(), datetime::max_value()),
            Err(EvalError::Arithmetic { .. })
        );
    }

    #[test]
    fn test_date_part() {
        let value = moment(2024, 8, 15, 13, 45, 30);
        assert_eq!(date_part(DateInterval::Quarter, &value), 3);
        assert_eq!(date_part(DateInterval::DayOfYear, &value), 228);
        assert_eq!(date_part(DateInterval::Weekday, &value), 5);
        assert_eq!(date_part(DateInterval::WeekOfYear, &moment(2024, 1, 6, 0, 0, 0)), 1);
        assert_eq!(date_part(DateInterval::WeekOfYear, &moment(2024, 1, 7, 0, 0, 0)), 2);
    }

    #[test]
    fn test_serial_constructors() {
        assert_eq!(date_serial(2024, 14, 1).unwrap(), moment(2025, 2, 1, 0, 0, 0));
        assert_eq!(date_serial(2024, 3, 0).unwrap(), moment(2024, 2, 29, 0, 0, 0));
        assert_eq!(date_serial(5, 1, 1).unwrap(), moment(2005, 1, 1, 0, 0, 0));
        assert_eq!(date_serial(75, 1, 1).unwrap(), moment(1975, 1, 1, 0, 0, 0));
        assert_eq!(time_serial(13, 5, 0).unwrap(), moment(1, 1, 1, 13, 5, 0));
        assert_eq!(time_serial(-1, 0, 0).unwrap(), moment(1, 1, 1, 23, 0, 0));
    }

    #[test]
    fn test_names() {
        assert_eq!(month_name(2, false).unwrap(), "February");
        assert_eq!(month_name(2, true).unwrap(), "Feb");
        assert_eq!(month_name(13, false).unwrap(), "");
        assert_matches!(month_name(0, false), Err(EvalError::Function { .. }));
        assert_eq!(weekday_name(1, false, FirstDayOfWeek::Monday).unwrap(), "Monday");
        assert_eq!(weekday_name(7, true, FirstDayOfWeek::Sunday).unwrap(), "Sat");
        assert_matches!(weekday_name(8, false, FirstDayOfWeek::System), Err(EvalError::Function { .. }));
    }

    #[test]
    fn test_weekday() {
        // 8/15/2024 is a Thursday
        let value = moment(2024, 8, 15, 0, 0, 0);
        assert_eq!(weekday(&value, FirstDayOfWeek::Sunday), 5);
        assert_eq!(weekday(&value, FirstDayOfWeek::Monday), 4);
        assert_eq!(weekday(&value, FirstDayOfWeek::Thursday), 1);
        assert_eq!(weekday(&value, FirstDayOfWeek::System), 5);
    }

    #[test]
    fn test_text_parsing_functions() {
        assert_eq!(
            call("DateValue", &[Value::text("3/5/2024 4:00 PM")]).unwrap(),
            Value::date_time(moment(2024, 3, 5, 0, 0, 0))
        );
        assert_eq!(
            call("TimeValue", &[Value::text("3/5/2024 4:00 PM")]).unwrap(),
            Value::date_time(moment(1, 1, 1, 16, 0, 0))
        );
        assert_matches!(
            call("DateValue", &[Value::text("soon")]),
            Err(EvalError::Conversion { ref message, .. }) if message.contains("\"soon\"")
        );
    }

    #[test]
    fn test_members() {
        let resolver = ReferenceResolver::new();
        let value = Value::date_time(moment(2024, 8, 15, 13, 45, 30));
        assert_eq!(resolver.get_member_value(&value, "DayOfWeek").unwrap(), Value::Integer(4));
        assert_eq!(resolver.get_member_value(&value, "dayofyear").unwrap(), Value::Integer(228));
        assert_eq!(
            resolver.get_member_value(&value, "Date").unwrap(),
            Value::date_time(moment(2024, 8, 15, 0, 0, 0))
        );

        let add_days = resolver
            .resolve_member_function(&FormulaType::DateTime, "AddDays", &[FormulaType::Double])
            .unwrap();
        assert_eq!(
            add_days.invoke(Some(&value), &[Value::Double(0.5)]).unwrap(),
            Value::date_time(moment(2024, 8, 16, 1, 45, 30))
        );

        let to_string = resolver
            .resolve_member_function(&FormulaType::DateTime, "ToString", &[FormulaType::Text])
            .unwrap();
        assert_eq!(
            to_string.invoke(Some(&value), &[Value::text("yyyy-MM-dd")]).unwrap(),
            Value::text("2024-08-15")
        );
    }
}
