//! Recording fake connection and record fixtures for executor tests.

pub(crate) mod fixtures;

use crate::{
    compile::Dialect,
    config::DbConfig,
    driver::{Connection, DriverError, ExecSummary, Row, Session, Stmt, Transaction},
    executor::Db,
    value::Value,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

///
/// Target
/// What a recorded call addressed.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Target {
    Text(String),
    Prepared(u32),
}

impl Target {
    fn of(stmt: Stmt<'_, FakeStatement>) -> Self {
        match stmt {
            Stmt::Text(sql) => Self::Text(sql.to_string()),
            Stmt::Prepared(handle) => Self::Prepared(handle.id),
        }
    }
}

///
/// Event
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Event {
    Prepare {
        sql: String,
    },
    Exec {
        route: &'static str,
        target: Target,
        args: Vec<Value>,
    },
    Query {
        route: &'static str,
        target: Target,
        args: Vec<Value>,
    },
    QueryRow {
        route: &'static str,
        target: Target,
        args: Vec<Value>,
    },
    CloseStatement {
        id: u32,
    },
    Ping,
    Close,
    Begin,
    Commit,
    Rollback,
}

impl Event {
    pub(crate) fn args(&self) -> Option<&[Value]> {
        match self {
            Self::Exec { args, .. } | Self::Query { args, .. } | Self::QueryRow { args, .. } => {
                Some(args)
            }
            _ => None,
        }
    }

    pub(crate) const fn target(&self) -> Option<&Target> {
        match self {
            Self::Exec { target, .. }
            | Self::Query { target, .. }
            | Self::QueryRow { target, .. } => Some(target),
            _ => None,
        }
    }
}

///
/// Reply
/// Scripted driver response, consumed in call order.
///

pub(crate) enum Reply {
    Exec(ExecSummary),
    Rows(Vec<Row>),
    Fail(DriverError),
    /// Never completes; only cancellation ends the call.
    Pending,
}

///
/// FakeStatement
///

#[derive(Debug)]
pub(crate) struct FakeStatement {
    pub(crate) id: u32,
    pub(crate) sql: String,
}

#[derive(Default)]
struct State {
    events: Vec<Event>,
    replies: VecDeque<Reply>,
    next_statement: u32,
    cancel_on_prepare: Option<CancellationToken>,
    prepare_gate: Option<PrepareGate>,
    closed: bool,
}

///
/// PrepareGate
/// Parks the next `prepare` after it has produced a handle.
///

#[derive(Clone, Default)]
pub(crate) struct PrepareGate {
    pub(crate) entered: Arc<Notify>,
    pub(crate) release: Arc<Notify>,
}

///
/// RecordingConnection
///
/// Clones share one log, so a test can hand one clone to `Db` and inspect
/// the other.
///

#[derive(Clone, Default)]
pub(crate) struct RecordingConnection {
    state: Arc<Mutex<State>>,
}

impl RecordingConnection {
    pub(crate) fn reply(&self, reply: Reply) {
        self.state.lock().replies.push_back(reply);
    }

    pub(crate) fn reply_rows(&self, rows: Vec<Row>) {
        self.reply(Reply::Rows(rows));
    }

    pub(crate) fn reply_exec(&self, rows_affected: u64, last_insert_id: Option<i64>) {
        self.reply(Reply::Exec(ExecSummary {
            rows_affected,
            last_insert_id,
        }));
    }

    /// Cancel `token` from inside the next `prepare`, after it succeeds.
    pub(crate) fn cancel_on_prepare(&self, token: CancellationToken) {
        self.state.lock().cancel_on_prepare = Some(token);
    }

    /// Hold the next `prepare` until the returned gate is released.
    pub(crate) fn hold_prepare(&self) -> PrepareGate {
        let gate = PrepareGate::default();
        self.state.lock().prepare_gate = Some(gate.clone());
        gate
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.state.lock().events.clone()
    }

    /// Statement-running events only: exec, query, query_row.
    pub(crate) fn calls(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.target().is_some())
            .collect()
    }

    pub(crate) fn prepares(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Prepare { .. }))
            .count()
    }

    fn push(&self, event: Event) -> Result<Option<Reply>, DriverError> {
        respond(&self.state, event)
    }
}

fn respond(state: &Mutex<State>, event: Event) -> Result<Option<Reply>, DriverError> {
    let mut state = state.lock();
    if state.closed {
        return Err(DriverError::ConnectionClosed);
    }
    let takes_reply = event.target().is_some();
    state.events.push(event);

    Ok(if takes_reply {
        state.replies.pop_front()
    } else {
        None
    })
}

async fn exec_reply(reply: Option<Reply>) -> Result<ExecSummary, DriverError> {
    match reply {
        None => Ok(ExecSummary {
            rows_affected: 1,
            last_insert_id: None,
        }),
        Some(Reply::Exec(summary)) => Ok(summary),
        Some(Reply::Fail(err)) => Err(err),
        Some(Reply::Pending) => std::future::pending().await,
        Some(Reply::Rows(_)) => panic!("rows scripted for an exec call"),
    }
}

async fn rows_reply(reply: Option<Reply>) -> Result<Vec<Row>, DriverError> {
    match reply {
        None => Ok(Vec::new()),
        Some(Reply::Rows(rows)) => Ok(rows),
        Some(Reply::Fail(err)) => Err(err),
        Some(Reply::Pending) => std::future::pending().await,
        Some(Reply::Exec(_)) => panic!("exec summary scripted for a query call"),
    }
}

async fn row_reply(reply: Option<Reply>) -> Result<Row, DriverError> {
    rows_reply(reply).await?.into_iter().next().ok_or(DriverError::NoRows)
}

#[async_trait]
impl Session for RecordingConnection {
    type Statement = FakeStatement;

    async fn prepare(&self, sql: &str) -> Result<FakeStatement, DriverError> {
        self.push(Event::Prepare {
            sql: sql.to_string(),
        })?;

        let (id, gate) = {
            let mut state = self.state.lock();
            state.next_statement += 1;
            if let Some(token) = state.cancel_on_prepare.take() {
                token.cancel();
            }
            (state.next_statement, state.prepare_gate.take())
        };

        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        Ok(FakeStatement {
            id,
            sql: sql.to_string(),
        })
    }

    async fn exec(
        &self,
        stmt: Stmt<'_, FakeStatement>,
        args: &[Value],
    ) -> Result<ExecSummary, DriverError> {
        let reply = self.push(Event::Exec {
            route: "connection",
            target: Target::of(stmt),
            args: args.to_vec(),
        })?;

        exec_reply(reply).await
    }

    async fn query(
        &self,
        stmt: Stmt<'_, FakeStatement>,
        args: &[Value],
    ) -> Result<Vec<Row>, DriverError> {
        let reply = self.push(Event::Query {
            route: "connection",
            target: Target::of(stmt),
            args: args.to_vec(),
        })?;

        rows_reply(reply).await
    }

    async fn query_row(
        &self,
        stmt: Stmt<'_, FakeStatement>,
        args: &[Value],
    ) -> Result<Row, DriverError> {
        let reply = self.push(Event::QueryRow {
            route: "connection",
            target: Target::of(stmt),
            args: args.to_vec(),
        })?;

        row_reply(reply).await
    }
}

#[async_trait]
impl Connection for RecordingConnection {
    type Transaction = RecordingTransaction;

    async fn ping(&self) -> Result<(), DriverError> {
        self.push(Event::Ping).map(drop)
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.push(Event::Close)?;
        self.state.lock().closed = true;

        Ok(())
    }

    async fn close_statement(&self, stmt: &FakeStatement) -> Result<(), DriverError> {
        self.push(Event::CloseStatement { id: stmt.id }).map(drop)
    }

    async fn begin(&self) -> Result<RecordingTransaction, DriverError> {
        self.push(Event::Begin)?;

        Ok(RecordingTransaction {
            state: Arc::clone(&self.state),
            done: AtomicBool::new(false),
        })
    }
}

///
/// RecordingTransaction
///

pub(crate) struct RecordingTransaction {
    state: Arc<Mutex<State>>,
    done: AtomicBool,
}

impl RecordingTransaction {
    fn push(&self, event: Event) -> Result<Option<Reply>, DriverError> {
        if self.done.load(Ordering::Acquire) {
            return Err(DriverError::TransactionClosed);
        }

        respond(&self.state, event)
    }
}

#[async_trait]
impl Session for RecordingTransaction {
    type Statement = FakeStatement;

    async fn prepare(&self, _sql: &str) -> Result<FakeStatement, DriverError> {
        Err(DriverError::other("statements are prepared on the connection"))
    }

    async fn exec(
        &self,
        stmt: Stmt<'_, FakeStatement>,
        args: &[Value],
    ) -> Result<ExecSummary, DriverError> {
        let reply = self.push(Event::Exec {
            route: "transaction",
            target: Target::of(stmt),
            args: args.to_vec(),
        })?;

        exec_reply(reply).await
    }

    async fn query(
        &self,
        stmt: Stmt<'_, FakeStatement>,
        args: &[Value],
    ) -> Result<Vec<Row>, DriverError> {
        let reply = self.push(Event::Query {
            route: "transaction",
            target: Target::of(stmt),
            args: args.to_vec(),
        })?;

        rows_reply(reply).await
    }

    async fn query_row(
        &self,
        stmt: Stmt<'_, FakeStatement>,
        args: &[Value],
    ) -> Result<Row, DriverError> {
        let reply = self.push(Event::QueryRow {
            route: "transaction",
            target: Target::of(stmt),
            args: args.to_vec(),
        })?;

        row_reply(reply).await
    }
}

#[async_trait]
impl Transaction for RecordingTransaction {
    async fn commit(&self) -> Result<(), DriverError> {
        self.push(Event::Commit)?;
        self.done.store(true, Ordering::Release);

        Ok(())
    }

    async fn rollback(&self) -> Result<(), DriverError> {
        self.push(Event::Rollback)?;
        self.done.store(true, Ordering::Release);

        Ok(())
    }
}

/// Build a row from `(column, value)` pairs.
pub(crate) fn row(cells: &[(&str, Value)]) -> Row {
    let columns: Arc<[String]> = cells.iter().map(|(c, _)| (*c).to_string()).collect();
    let values = cells.iter().map(|(_, v)| v.clone()).collect();

    Row::new(columns, values)
}

/// A handle over a fresh recording connection, plus a clone for inspection.
pub(crate) fn recording_db(dialect: Dialect) -> (Db<RecordingConnection>, RecordingConnection) {
    let conn = RecordingConnection::default();

    (Db::new(conn.clone(), DbConfig::new(dialect)), conn)
}
