//! Errors raised while binding, type checking or executing a tree
//!
//! Nodes attach their own offset on the way out; the innermost offset wins,
//! so a failure deep in a call reports the position of the call itself.

use crate::logging::{codes, Code};
use crate::pipeline::ErrorKind;

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("type mismatch")]
    TypeMismatch { offset: Option<usize> },

    #[error("Identifier {name} is unknown")]
    UnknownIdentifier { name: String, offset: Option<usize> },

    #[error("{name} is not a known function")]
    UnknownFunction { name: String, offset: Option<usize> },

    #[error("{name}: argument count or types do not match")]
    SignatureMismatch { name: String, offset: Option<usize> },

    #[error("Cannot access specified member of {type_name}")]
    MemberAccessDenied {
        type_name: String,
        offset: Option<usize>,
    },

    #[error("{member} is not a member of {type_name}")]
    UnknownMemberFunction {
        member: String,
        type_name: String,
        offset: Option<usize>,
    },

    #[error("No member by the name {member} found in {type_name}")]
    UnknownMember {
        member: String,
        type_name: String,
        offset: Option<usize>,
    },

    #[error("Formula error: Cannot get value of {target}.{member} because {target} is Null.")]
    NullMemberAccess {
        target: String,
        member: String,
        offset: Option<usize>,
    },

    /// A value could not be converted to the type an operation needs
    #[error("{message}")]
    Conversion {
        message: String,
        offset: Option<usize>,
    },

    /// Division by zero or integer overflow
    #[error("{message}")]
    Arithmetic {
        message: String,
        offset: Option<usize>,
    },

    /// A library function rejected its arguments
    #[error("{message}")]
    Function {
        message: String,
        offset: Option<usize>,
    },
}

impl EvalError {
    pub fn type_mismatch() -> Self {
        Self::TypeMismatch { offset: None }
    }

    pub fn unknown_identifier(name: impl ToString) -> Self {
        Self::UnknownIdentifier {
            name: name.to_string(),
            offset: None,
        }
    }

    pub fn unknown_function(name: impl ToString) -> Self {
        Self::UnknownFunction {
            name: name.to_string(),
            offset: None,
        }
    }

    pub fn signature_mismatch(name: impl ToString) -> Self {
        Self::SignatureMismatch {
            name: name.to_string(),
            offset: None,
        }
    }

    pub fn member_access_denied(type_name: impl ToString) -> Self {
        Self::MemberAccessDenied {
            type_name: type_name.to_string(),
            offset: None,
        }
    }

    pub fn unknown_member_function(member: impl ToString, type_name: impl ToString) -> Self {
        Self::UnknownMemberFunction {
            member: member.to_string(),
            type_name: type_name.to_string(),
            offset: None,
        }
    }

    pub fn unknown_member(member: impl ToString, type_name: impl ToString) -> Self {
        Self::UnknownMember {
            member: member.to_string(),
            type_name: type_name.to_string(),
            offset: None,
        }
    }

    pub fn null_member_access(target: impl ToString, member: impl ToString) -> Self {
        Self::NullMemberAccess {
            target: target.to_string(),
            member: member.to_string(),
            offset: None,
        }
    }

    pub fn conversion(message: impl ToString) -> Self {
        Self::Conversion {
            message: message.to_string(),
            offset: None,
        }
    }

    pub fn invalid_cast(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        Self::conversion(format!("Invalid cast from '{}' to '{}'.", from, to))
    }

    pub fn arithmetic(message: impl ToString) -> Self {
        Self::Arithmetic {
            message: message.to_string(),
            offset: None,
        }
    }

    pub fn divide_by_zero() -> Self {
        Self::arithmetic("Attempted to divide by zero.")
    }

    pub fn overflow() -> Self {
        Self::arithmetic("Arithmetic operation resulted in an overflow.")
    }

    pub fn function(message: impl ToString) -> Self {
        Self::Function {
            message: message.to_string(),
            offset: None,
        }
    }

    /// Invalid argument passed to a library procedure
    pub fn invalid_argument(name: &str) -> Self {
        Self::function(format!("Argument '{}' is not a valid value.", name))
    }

    fn offset_slot(&mut self) -> &mut Option<usize> {
        match self {
            Self::TypeMismatch { offset }
            | Self::UnknownIdentifier { offset, .. }
            | Self::UnknownFunction { offset, .. }
            | Self::SignatureMismatch { offset, .. }
            | Self::MemberAccessDenied { offset, .. }
            | Self::UnknownMemberFunction { offset, .. }
            | Self::UnknownMember { offset, .. }
            | Self::NullMemberAccess { offset, .. }
            | Self::Conversion { offset, .. }
            | Self::Arithmetic { offset, .. }
            | Self::Function { offset, .. } => offset,
        }
    }

    /// Attach an offset unless one is already present
    pub fn with_offset(mut self, offset: usize) -> Self {
        let slot = self.offset_slot();
        if slot.is_none() {
            *slot = Some(offset);
        }
        self
    }

    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::TypeMismatch { offset }
            | Self::UnknownIdentifier { offset, .. }
            | Self::UnknownFunction { offset, .. }
            | Self::SignatureMismatch { offset, .. }
            | Self::MemberAccessDenied { offset, .. }
            | Self::UnknownMemberFunction { offset, .. }
            | Self::UnknownMember { offset, .. }
            | Self::NullMemberAccess { offset, .. }
            | Self::Conversion { offset, .. }
            | Self::Arithmetic { offset, .. }
            | Self::Function { offset, .. } => *offset,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TypeMismatch { .. } => ErrorKind::Type,
            Self::UnknownIdentifier { .. }
            | Self::UnknownFunction { .. }
            | Self::SignatureMismatch { .. }
            | Self::MemberAccessDenied { .. }
            | Self::UnknownMemberFunction { .. }
            | Self::UnknownMember { .. } => ErrorKind::Binding,
            Self::NullMemberAccess { .. }
            | Self::Conversion { .. }
            | Self::Arithmetic { .. }
            | Self::Function { .. } => ErrorKind::Runtime,
        }
    }

    /// Get error code for global logging system
    pub fn error_code(&self) -> Code {
        match self {
            Self::TypeMismatch { .. } => codes::types::TYPE_MISMATCH,
            Self::UnknownIdentifier { .. } => codes::binding::UNKNOWN_IDENTIFIER,
            Self::UnknownFunction { .. } => codes::binding::UNKNOWN_FUNCTION,
            Self::SignatureMismatch { .. } => codes::binding::SIGNATURE_MISMATCH,
            Self::MemberAccessDenied { .. } => codes::binding::MEMBER_ACCESS_DENIED,
            Self::UnknownMemberFunction { .. } | Self::UnknownMember { .. } => {
                codes::binding::UNKNOWN_MEMBER
            }
            Self::NullMemberAccess { .. } => codes::runtime::NULL_MEMBER_ACCESS,
            Self::Conversion { .. } => codes::runtime::CONVERSION_FAILURE,
            Self::Arithmetic { .. } => codes::runtime::ARITHMETIC_FAILURE,
            Self::Function { .. } => codes::runtime::FUNCTION_FAILURE,
        }
    }
}
