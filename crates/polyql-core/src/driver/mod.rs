//! Connection contract consumed by the executor.
//!
//! The executor treats these traits as its only I/O boundary. Drivers
//! classify their own failures into [`DriverError`]; the executor never
//! inspects driver-specific error types.

mod row;

pub use row::Row;

use crate::value::Value;
use async_trait::async_trait;
use thiserror::Error as ThisError;

///
/// Stmt
///
/// A statement addressed either by SQL text or by a handle previously
/// returned from [`Session::prepare`].
///

#[derive(Clone, Copy, Debug)]
pub enum Stmt<'a, S> {
    Text(&'a str),
    Prepared(&'a S),
}

///
/// ExecSummary
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExecSummary {
    pub rows_affected: u64,

    /// Driver-reported generated id, when the driver has the primitive.
    pub last_insert_id: Option<i64>,
}

///
/// Session
///
/// Statement execution shared by connections and transactions.
///

#[async_trait]
pub trait Session: Send + Sync {
    type Statement: Send + Sync + 'static;

    async fn prepare(&self, sql: &str) -> Result<Self::Statement, DriverError>;

    async fn exec(
        &self,
        stmt: Stmt<'_, Self::Statement>,
        args: &[Value],
    ) -> Result<ExecSummary, DriverError>;

    async fn query(
        &self,
        stmt: Stmt<'_, Self::Statement>,
        args: &[Value],
    ) -> Result<Vec<Row>, DriverError>;

    /// First row of the result; [`DriverError::NoRows`] when there is none.
    async fn query_row(
        &self,
        stmt: Stmt<'_, Self::Statement>,
        args: &[Value],
    ) -> Result<Row, DriverError>;
}

///
/// Connection
///

#[async_trait]
pub trait Connection: Session {
    type Transaction: Transaction<Statement = Self::Statement>;

    async fn ping(&self) -> Result<(), DriverError>;

    async fn close(&self) -> Result<(), DriverError>;

    async fn close_statement(&self, stmt: &Self::Statement) -> Result<(), DriverError>;

    async fn begin(&self) -> Result<Self::Transaction, DriverError>;
}

///
/// Transaction
///
/// Caller-owned. The executor routes statements through it but never
/// commits or rolls back on the caller's behalf.
///

#[async_trait]
pub trait Transaction: Session {
    async fn commit(&self) -> Result<(), DriverError>;

    async fn rollback(&self) -> Result<(), DriverError>;
}

///
/// DriverError
///

#[derive(Debug, ThisError)]
pub enum DriverError {
    #[error("no rows in result set")]
    NoRows,

    #[error("connection is closed")]
    ConnectionClosed,

    #[error("transaction has already been committed or rolled back")]
    TransactionClosed,

    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl DriverError {
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(err.into())
    }
}
