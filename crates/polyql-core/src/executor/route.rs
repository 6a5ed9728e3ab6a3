use crate::{
    driver::{Connection, DriverError, ExecSummary, Row, Session, Stmt},
    value::Value,
};

///
/// Route
///
/// Where a statement runs: the handle's connection, or a transaction the
/// caller supplied for this call.
///

pub(crate) enum Route<'a, C: Connection> {
    Conn(&'a C),
    Tx(&'a C::Transaction),
}

impl<C: Connection> Route<'_, C> {
    pub(crate) const fn label(&self) -> &'static str {
        match self {
            Self::Conn(_) => "connection",
            Self::Tx(_) => "transaction",
        }
    }

    pub(crate) async fn exec(
        &self,
        stmt: Stmt<'_, C::Statement>,
        args: &[Value],
    ) -> Result<ExecSummary, DriverError> {
        match self {
            Self::Conn(conn) => conn.exec(stmt, args).await,
            Self::Tx(tx) => tx.exec(stmt, args).await,
        }
    }

    pub(crate) async fn query(
        &self,
        stmt: Stmt<'_, C::Statement>,
        args: &[Value],
    ) -> Result<Vec<Row>, DriverError> {
        match self {
            Self::Conn(conn) => conn.query(stmt, args).await,
            Self::Tx(tx) => tx.query(stmt, args).await,
        }
    }

    pub(crate) async fn query_row(
        &self,
        stmt: Stmt<'_, C::Statement>,
        args: &[Value],
    ) -> Result<Row, DriverError> {
        match self {
            Self::Conn(conn) => conn.query_row(stmt, args).await,
            Self::Tx(tx) => tx.query_row(stmt, args).await,
        }
    }
}
