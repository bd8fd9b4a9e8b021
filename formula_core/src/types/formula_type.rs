use serde::{Deserialize, Serialize};
use std::fmt;

/// Static type of an expression, as inferred during validation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormulaType {
    Integer,
    Double,
    Text,
    Char,
    Boolean,
    /// Catch-all: the `Nothing` literal and untyped results such as `Iif`
    Object,
    DateTime,
    DateInterval,
    FirstDayOfWeek,
    /// Opaque host type, identified by name
    Host(String),
}

impl FormulaType {
    /// Host-facing type name used in diagnostics
    pub fn name(&self) -> &str {
        match self {
            FormulaType::Integer => "Int32",
            FormulaType::Double => "Double",
            FormulaType::Text => "String",
            FormulaType::Char => "Char",
            FormulaType::Boolean => "Boolean",
            FormulaType::Object => "Object",
            FormulaType::DateTime => "DateTime",
            FormulaType::DateInterval => "DateInterval",
            FormulaType::FirstDayOfWeek => "FirstDayOfWeek",
            FormulaType::Host(name) => name,
        }
    }

    /// Types eligible for non-identity relational comparison
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            FormulaType::Integer
                | FormulaType::Double
                | FormulaType::Text
                | FormulaType::Char
                | FormulaType::Boolean
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FormulaType::Integer | FormulaType::Double)
    }

    /// Look up a built-in type by its diagnostic name or common alias
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name.to_lowercase().as_str() {
            "int32" | "integer" | "int" => FormulaType::Integer,
            "double" => FormulaType::Double,
            "string" | "text" => FormulaType::Text,
            "char" => FormulaType::Char,
            "boolean" | "bool" => FormulaType::Boolean,
            "object" => FormulaType::Object,
            "datetime" | "date" => FormulaType::DateTime,
            "dateinterval" => FormulaType::DateInterval,
            "firstdayofweek" => FormulaType::FirstDayOfWeek,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for FormulaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
