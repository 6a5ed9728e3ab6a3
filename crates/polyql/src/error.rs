use derive_more::Display;
use polyql_core::error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::RecordNotFound)
    }

    #[must_use]
    pub const fn is_canceled(&self) -> bool {
        matches!(self.kind, ErrorKind::Canceled)
    }
}

// The message keeps the operation/table prefix the core attached.
impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let message = err.to_string();

        Self::new(err.class.into(), err.origin.into(), message)
    }
}

///
/// ErrorKind
/// What went wrong, in terms a caller can act on.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorKind {
    /// The caller's cancellation token fired.
    Canceled,
    ConnectionClosed,
    InvalidConfig,

    /// The query description was rejected before reaching the database.
    InvalidQuery,
    NoRecordInserted,
    RecordNotFound,
    TransactionClosed,

    /// The database failed in a way the driver could not classify.
    Unknown,

    /// The dialect cannot express the query.
    Unsupported,
}

impl From<ErrorClass> for ErrorKind {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::InvalidConfig => Self::InvalidConfig,
            ErrorClass::InvalidQuery => Self::InvalidQuery,
            ErrorClass::Unsupported => Self::Unsupported,
            ErrorClass::RecordNotFound => Self::RecordNotFound,
            ErrorClass::NoRecordInserted => Self::NoRecordInserted,
            ErrorClass::TransactionClosed => Self::TransactionClosed,
            ErrorClass::ConnectionClosed => Self::ConnectionClosed,
            ErrorClass::Canceled => Self::Canceled,
            ErrorClass::UnknownDatabase => Self::Unknown,
        }
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorOrigin {
    Cache,
    Compile,
    Config,
    Driver,
    Executor,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Cache => Self::Cache,
            CoreErrorOrigin::Compile => Self::Compile,
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Driver => Self::Driver,
            CoreErrorOrigin::Executor => Self::Executor,
        }
    }
}
