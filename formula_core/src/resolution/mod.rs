//! Name resolution
//!
//! The [`Resolver`] trait is the evaluator's only view of the host.
//! [`ReferenceResolver`] implements it over the built-in library.

pub mod reference;
pub mod registry;
pub mod resolver;

pub use reference::ReferenceResolver;
pub use registry::{conversion_cost, select_overload, FunctionRegistry, MemberProperty, MemberTable};
pub use resolver::{
    FunctionBinding, IdentifierBinding, MemberGetter, NativeFunction, PropertyBinding,
    PropertyGetter, Resolver,
};
