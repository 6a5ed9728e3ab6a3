use crate::executor::Operation;
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable classification.
/// Every failure surfaced by the compiler, the statement cache or the
/// executor converges here before reaching the caller.
///

#[derive(Debug, ThisError)]
#[error("{}", self.render())]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Operation and table the failure happened under, when known.
    pub context: Option<ErrorContext>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            context: None,
        }
    }

    /// Construct a config-origin error.
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvalidConfig, ErrorOrigin::Config, message)
    }

    /// Construct a driver-origin error that could not be classified further.
    pub(crate) fn unknown_database(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::UnknownDatabase, ErrorOrigin::Driver, message)
    }

    /// Attach operation/table context. An existing context is kept.
    #[must_use]
    pub fn with_context(mut self, operation: Operation, table: impl Into<String>) -> Self {
        if self.context.is_none() {
            self.context = Some(ErrorContext {
                operation,
                table: table.into(),
            });
        }

        self
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::RecordNotFound)
    }

    #[must_use]
    pub const fn is_canceled(&self) -> bool {
        matches!(self.class, ErrorClass::Canceled)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.render())
    }

    fn render(&self) -> String {
        match &self.context {
            Some(ctx) if ctx.table.is_empty() => format!("{}: {}", ctx.operation, self.message),
            Some(ctx) => format!("{} {}: {}", ctx.operation, ctx.table, self.message),
            None => self.message.clone(),
        }
    }
}

///
/// ErrorContext
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErrorContext {
    pub operation: Operation,
    pub table: String,
}

///
/// ErrorClass
/// Error taxonomy shared by every layer.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Bad connection, dialect or cache configuration.
    InvalidConfig,

    /// The compiler rejected the query description.
    InvalidQuery,

    /// Valid description, but the dialect cannot express it.
    Unsupported,

    /// A row-level lookup returned nothing.
    RecordNotFound,

    /// A write expected to affect one row affected none.
    NoRecordInserted,

    TransactionClosed,
    ConnectionClosed,

    /// The caller's cancellation token fired.
    Canceled,

    /// Opaque driver failure.
    UnknownDatabase,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidConfig => "invalid_config",
            Self::InvalidQuery => "invalid_query",
            Self::Unsupported => "unsupported",
            Self::RecordNotFound => "record_not_found",
            Self::NoRecordInserted => "no_record_inserted",
            Self::TransactionClosed => "transaction_closed",
            Self::ConnectionClosed => "connection_closed",
            Self::Canceled => "canceled",
            Self::UnknownDatabase => "unknown_database",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Config,
    Compile,
    Cache,
    Executor,
    Driver,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Config => "config",
            Self::Compile => "compile",
            Self::Cache => "cache",
            Self::Executor => "executor",
            Self::Driver => "driver",
        };
        write!(f, "{label}")
    }
}
