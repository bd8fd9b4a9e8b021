//! Runtime value and static type model
//!
//! Values form a closed tagged union; all coercion happens at operator or
//! function evaluation time through [`convert`].

pub mod convert;
pub mod datetime;
pub mod enums;
pub mod formula_type;
pub mod host;
pub mod value;

pub use enums::{DateInterval, FirstDayOfWeek};
pub use formula_type::FormulaType;
pub use host::{CustomObject, HostData, HostObject};
pub use value::{format_double, Value};
