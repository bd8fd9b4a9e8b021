//! Enumerations exposed to formulas as registered types

use std::fmt;

/// Unit selector for DateAdd, DateDiff and DatePart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateInterval {
    Year,
    Quarter,
    Month,
    DayOfYear,
    Day,
    WeekOfYear,
    Weekday,
    Hour,
    Minute,
    Second,
}

impl DateInterval {
    pub const ALL: [DateInterval; 10] = [
        DateInterval::Year,
        DateInterval::Quarter,
        DateInterval::Month,
        DateInterval::DayOfYear,
        DateInterval::Day,
        DateInterval::WeekOfYear,
        DateInterval::Weekday,
        DateInterval::Hour,
        DateInterval::Minute,
        DateInterval::Second,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DateInterval::Year => "Year",
            DateInterval::Quarter => "Quarter",
            DateInterval::Month => "Month",
            DateInterval::DayOfYear => "DayOfYear",
            DateInterval::Day => "Day",
            DateInterval::WeekOfYear => "WeekOfYear",
            DateInterval::Weekday => "Weekday",
            DateInterval::Hour => "Hour",
            DateInterval::Minute => "Minute",
            DateInterval::Second => "Second",
        }
    }

    pub fn value(&self) -> i32 {
        *self as i32
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// First day of the week for Weekday and WeekdayName
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FirstDayOfWeek {
    System,
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl FirstDayOfWeek {
    pub const ALL: [FirstDayOfWeek; 8] = [
        FirstDayOfWeek::System,
        FirstDayOfWeek::Sunday,
        FirstDayOfWeek::Monday,
        FirstDayOfWeek::Tuesday,
        FirstDayOfWeek::Wednesday,
        FirstDayOfWeek::Thursday,
        FirstDayOfWeek::Friday,
        FirstDayOfWeek::Saturday,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FirstDayOfWeek::System => "System",
            FirstDayOfWeek::Sunday => "Sunday",
            FirstDayOfWeek::Monday => "Monday",
            FirstDayOfWeek::Tuesday => "Tuesday",
            FirstDayOfWeek::Wednesday => "Wednesday",
            FirstDayOfWeek::Thursday => "Thursday",
            FirstDayOfWeek::Friday => "Friday",
            FirstDayOfWeek::Saturday => "Saturday",
        }
    }

    pub fn value(&self) -> i32 {
        *self as i32
    }

    /// Days after Sunday; `System` follows the en-US convention of Sunday
    pub fn days_from_sunday(&self) -> i32 {
        match self {
            FirstDayOfWeek::System => 0,
            other => other.value() - 1,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|day| day.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for FirstDayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_interval_values() {
        assert_eq!(DateInterval::Year.value(), 0);
        assert_eq!(DateInterval::Second.value(), 9);
        assert_eq!(DateInterval::from_name("weekofyear"), Some(DateInterval::WeekOfYear));
        assert_eq!(DateInterval::from_name("fortnight"), None);
    }

    #[test]
    fn test_first_day_of_week_offsets() {
        assert_eq!(FirstDayOfWeek::System.days_from_sunday(), 0);
        assert_eq!(FirstDayOfWeek::Sunday.days_from_sunday(), 0);
        assert_eq!(FirstDayOfWeek::Monday.days_from_sunday(), 1);
        assert_eq!(FirstDayOfWeek::Saturday.days_from_sunday(), 6);
        assert_eq!(FirstDayOfWeek::Saturday.value(), 7);
    }
}
