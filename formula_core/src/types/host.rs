//! Host objects carried inside [`Value::Object`](crate::types::Value)
//!
//! Objects are reference counted so `Is` can compare them by identity.

use chrono::NaiveDateTime;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::types::datetime;
use crate::types::{DateInterval, FirstDayOfWeek, FormulaType};

#[derive(Debug)]
pub enum HostData {
    DateTime(NaiveDateTime),
    DateInterval(DateInterval),
    FirstDayOfWeek(FirstDayOfWeek),
    Custom(CustomObject),
}

/// Object supplied by an embedding application
pub struct CustomObject {
    type_name: String,
    display: String,
    payload: Box<dyn Any>,
}

impl CustomObject {
    pub fn new(type_name: impl Into<String>, display: impl Into<String>, payload: Box<dyn Any>) -> Self {
        Self {
            type_name: type_name.into(),
            display: display.into(),
            payload,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn payload(&self) -> &dyn Any {
        self.payload.as_ref()
    }
}

impl fmt::Debug for CustomObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomObject")
            .field("type_name", &self.type_name)
            .field("display", &self.display)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct HostObject(Rc<HostData>);

impl HostObject {
    pub fn new(data: HostData) -> Self {
        Self(Rc::new(data))
    }

    pub fn date_time(value: NaiveDateTime) -> Self {
        Self::new(HostData::DateTime(value))
    }

    pub fn data(&self) -> &HostData {
        &self.0
    }

    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self.data() {
            HostData::DateTime(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date_interval(&self) -> Option<DateInterval> {
        match self.data() {
            HostData::DateInterval(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_first_day_of_week(&self) -> Option<FirstDayOfWeek> {
        match self.data() {
            HostData::FirstDayOfWeek(value) => Some(*value),
            _ => None,
        }
    }

    /// Identity comparison used by the `Is` operator
    pub fn ptr_eq(&self, other: &HostObject) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn formula_type(&self) -> FormulaType {
        match self.data() {
            HostData::DateTime(_) => FormulaType::DateTime,
            HostData::DateInterval(_) => FormulaType::DateInterval,
            HostData::FirstDayOfWeek(_) => FormulaType::FirstDayOfWeek,
            HostData::Custom(object) => FormulaType::Host(object.type_name.clone()),
        }
    }
}

impl PartialEq for HostObject {
    fn eq(&self, other: &Self) -> bool {
        match (self.data(), other.data()) {
            (HostData::DateTime(a), HostData::DateTime(b)) => a == b,
            (HostData::DateInterval(a), HostData::DateInterval(b)) => a == b,
            (HostData::FirstDayOfWeek(a), HostData::FirstDayOfWeek(b)) => a == b,
            _ => self.ptr_eq(other),
        }
    }
}

impl fmt::Display for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data() {
            HostData::DateTime(value) => write!(f, "{}", datetime::format_general(value)),
            HostData::DateInterval(value) => write!(f, "{}", value),
            HostData::FirstDayOfWeek(value) => write!(f, "{}", value),
            HostData::Custom(object) => write!(f, "{}", object.display),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_identity_differs_from_equality() {
        let moment = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(13, 5, 0)
            .unwrap();
        let a = HostObject::date_time(moment);
        let b = HostObject::date_time(moment);
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert!(a.ptr_eq(&a.clone()));
        assert_eq!(a.to_string(), "2/29/2024 1:05:00 PM");
    }

    #[test]
    fn test_custom_objects() {
        let object = HostObject::new(HostData::Custom(CustomObject::new(
            "Invoice",
            "Invoice #7",
            Box::new(7u32),
        )));
        assert_eq!(object.formula_type(), FormulaType::Host("Invoice".into()));
        assert_eq!(object.to_string(), "Invoice #7");
        match object.data() {
            HostData::Custom(custom) => {
                assert_eq!(custom.payload().downcast_ref::<u32>(), Some(&7));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
