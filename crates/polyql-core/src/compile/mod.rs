//! Query description → dialect SQL text + placeholder index list.

mod compiler;
pub mod dialect;
mod placeholder;
mod statement;

#[cfg(test)]
mod tests;

use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    query::Op,
};
use thiserror::Error as ThisError;

pub use compiler::Compiler;
pub use dialect::{Dialect, SqlDialect};
pub use placeholder::Placeholders;
pub use statement::*;

///
/// CompiledQuery
///
/// SQL text plus the source value index for each placeholder, in the order
/// the placeholders appear in the text.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub indices: Vec<usize>,
}

impl CompiledQuery {
    #[must_use]
    pub const fn placeholder_count(&self) -> usize {
        self.indices.len()
    }
}

///
/// CompileError
///
/// Rejections raised before any SQL reaches a driver.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    #[error("{position} has an empty field name")]
    EmptyField { position: &'static str },

    #[error("operator {op} on '{field}' requires a value")]
    MissingOperand { field: String, op: Op },

    #[error("operator {op} on '{field}' does not take a value")]
    UnexpectedOperand { field: String, op: Op },

    #[error("operator {op} on '{field}': {reason}")]
    InvalidOperand {
        field: String,
        op: Op,
        reason: String,
    },

    #[error("{logic} group has no conditions")]
    EmptyGroup { logic: &'static str },

    #[error("NOT requires exactly one condition, found {found}")]
    NotArity { found: usize },

    #[error("invalid {bound}: {reason}")]
    InvalidPagination { bound: &'static str, reason: String },

    #[error("table name is empty")]
    EmptyTable,

    #[error("update of '{field}' has no value")]
    MissingUpdateValue { field: String },

    #[error("{what} is empty")]
    Empty { what: &'static str },

    #[error("{feature} is not supported by the {dialect} dialect")]
    Unsupported { dialect: Dialect, feature: String },
}

impl CompileError {
    pub(crate) fn invalid_operand(field: &str, op: Op, reason: impl Into<String>) -> Self {
        Self::InvalidOperand {
            field: field.to_string(),
            op,
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(dialect: Dialect, feature: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect,
            feature: feature.into(),
        }
    }

    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::Unsupported { .. } => ErrorClass::Unsupported,
            _ => ErrorClass::InvalidQuery,
        }
    }
}

impl From<CompileError> for InternalError {
    fn from(err: CompileError) -> Self {
        Self::new(err.class(), ErrorOrigin::Compile, err.to_string())
    }
}
