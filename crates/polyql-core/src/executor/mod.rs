//! Executor: compile or reuse a statement, bind arguments, run it on the
//! connection or a caller transaction, interpret the result.
//!
//! Per call:
//! 1. no cache key → compile every time;
//! 2. key, miss → compile, prepare on the connection, store;
//! 3. key, hit → reuse the stored index list, no recompilation;
//! 4. resolve positional arguments through the index list;
//! 5. execute through the caller's transaction when given, else the connection;
//! 6. interpret rows / affected counts and classify any failure.

mod bind;
mod options;
mod read;
mod route;
mod write;


pub use options::ExecOptions;

use crate::{
    cache::{CachedStatement, StatementCache},
    compile::{CompileError, CompiledQuery, Dialect},
    config::DbConfig,
    driver::{Connection, DriverError, ExecSummary, Row, Stmt},
    error::{ErrorClass, ErrorOrigin, InternalError},
    obs::sink::{self, MetricsEvent, MetricsSink},
    record::{Record, ScanError},
    value::Value,
};
use derive_more::Display;
use route::Route;
use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use thiserror::Error as ThisError;
use tracing::{debug, warn};

const TARGET: &str = "polyql::executor";

///
/// Operation
///
/// Executor entrypoint names, used in error context, logs and metrics.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Operation {
    #[display("insert")]
    Insert,
    #[display("insert_many")]
    InsertMany,
    #[display("upsert")]
    Upsert,
    #[display("get")]
    Get,
    #[display("get_by_id")]
    GetById,
    #[display("select")]
    Select,
    #[display("count")]
    Count,
    #[display("update")]
    Update,
    #[display("update_by_id")]
    UpdateById,
    #[display("delete")]
    Delete,
    #[display("delete_by_id")]
    DeleteById,
    #[display("soft_delete")]
    SoftDelete,
    #[display("soft_delete_by_id")]
    SoftDeleteById,
    #[display("call")]
    Call,
    #[display("ping")]
    Ping,
    #[display("close")]
    Close,
}

impl Operation {
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::Get | Self::GetById | Self::Select | Self::Count)
    }
}

///
/// ExecutorError
///

#[derive(Debug, ThisError)]
pub enum ExecutorError {
    #[error("database handle is closed")]
    Closed,

    #[error("operation canceled")]
    Canceled,

    #[error("placeholder binds values[{index}] but only {len} value(s) were supplied")]
    BindIndex { index: usize, len: usize },

    #[error("record for '{table}' returned {found} value(s) for {expected} column(s)")]
    ValueCount {
        table: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("no row was written to '{table}'")]
    NoRowsAffected { table: String },

    #[error("record type for '{table}' has no soft-delete column")]
    NoSoftDeleteColumn { table: &'static str },

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("unexpected driver result: {0}")]
    UnexpectedResult(String),
}

impl ExecutorError {
    const fn class(&self) -> ErrorClass {
        match self {
            Self::Closed => ErrorClass::ConnectionClosed,
            Self::Canceled => ErrorClass::Canceled,
            Self::BindIndex { .. } | Self::ValueCount { .. } | Self::Scan(_) => {
                ErrorClass::InvalidQuery
            }
            Self::NoRowsAffected { .. } => ErrorClass::NoRecordInserted,
            Self::NoSoftDeleteColumn { .. } => ErrorClass::InvalidConfig,
            Self::UnexpectedResult(_) => ErrorClass::UnknownDatabase,
        }
    }
}

impl From<ExecutorError> for InternalError {
    fn from(err: ExecutorError) -> Self {
        Self::new(err.class(), ErrorOrigin::Executor, err.to_string())
    }
}

// Driver failures are classified here and nowhere else.
impl From<DriverError> for InternalError {
    fn from(err: DriverError) -> Self {
        let class = match &err {
            DriverError::NoRows => ErrorClass::RecordNotFound,
            DriverError::ConnectionClosed => ErrorClass::ConnectionClosed,
            DriverError::TransactionClosed => ErrorClass::TransactionClosed,
            DriverError::Other(_) => return Self::unknown_database(err.to_string()),
        };

        Self::new(class, ErrorOrigin::Driver, err.to_string())
    }
}

///
/// Prepared
///
/// A statement ready to run: compiled for this call only, or shared from
/// the cache.
///

pub(crate) enum Prepared<S> {
    Text(CompiledQuery),
    Cached(Arc<CachedStatement<S>>),
}

impl<S> Prepared<S> {
    fn query(&self) -> &CompiledQuery {
        match self {
            Self::Text(query) => query,
            Self::Cached(entry) => &entry.query,
        }
    }

    fn stmt(&self) -> Stmt<'_, S> {
        match self {
            Self::Text(query) => Stmt::Text(&query.sql),
            Self::Cached(entry) => Stmt::Prepared(&entry.handle),
        }
    }

    fn bind(&self, values: &[Value]) -> Result<Vec<Value>, ExecutorError> {
        bind::resolve(&self.query().indices, values)
    }
}

///
/// Db
///
/// Database handle: one connection, its dialect, and the prepared
/// statement cache that belongs to that connection.
///

pub struct Db<C: Connection> {
    conn: C,
    config: DbConfig,
    cache: StatementCache<C::Statement>,
    sink: Option<Arc<dyn MetricsSink>>,
    closed: AtomicBool,
}

impl<C: Connection> Db<C> {
    #[must_use]
    pub fn new(conn: C, config: DbConfig) -> Self {
        Self {
            conn,
            config,
            cache: StatementCache::new(),
            sink: None,
            closed: AtomicBool::new(false),
        }
    }

    /// Route this handle's metrics to `sink` instead of the global counters.
    #[must_use]
    pub fn with_metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    #[must_use]
    pub const fn config(&self) -> &DbConfig {
        &self.config
    }

    #[must_use]
    pub const fn connection(&self) -> &C {
        &self.conn
    }

    /// Number of prepared statements currently cached.
    #[must_use]
    pub fn cached_statements(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Begin a transaction owned by the caller. Pass it back through
    /// [`ExecOptions::transaction`]; commit and rollback stay with the caller.
    pub async fn begin(&self) -> Result<C::Transaction, InternalError> {
        self.ensure_open()?;

        Ok(self.conn.begin().await?)
    }

    pub async fn ping(&self, opts: &ExecOptions<'_, C::Transaction>) -> Result<(), InternalError> {
        self.observe(Operation::Ping, "", opts, |_| 0, async {
            cancellable(opts, self.conn.ping()).await
        })
        .await
    }

    /// Close every cached statement, then the connection. Further calls
    /// fail with `ConnectionClosed`; closing twice is a no-op.
    pub async fn close(&self) -> Result<(), InternalError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.close_cached().await;
        debug!(target: TARGET, "closing connection");

        self.conn
            .close()
            .await
            .map_err(|err| InternalError::from(err).with_context(Operation::Close, ""))
    }

    async fn close_cached(&self) {
        for entry in self.cache.drain() {
            if let Err(err) = self.conn.close_statement(&entry.handle).await {
                warn!(
                    target: TARGET,
                    sql = %entry.query.sql,
                    error = %err,
                    "close statement failed"
                );
            }
        }
    }

    // ---------------------------------------------------------------------
    // Pipeline
    // ---------------------------------------------------------------------

    fn ensure_open(&self) -> Result<(), ExecutorError> {
        if self.is_closed() {
            Err(ExecutorError::Closed)
        } else {
            Ok(())
        }
    }

    fn record(&self, event: MetricsEvent<'_>) {
        sink::record(self.sink.as_deref(), event);
    }

    fn route<'r>(&'r self, tx: Option<&'r C::Transaction>) -> Route<'r, C> {
        tx.map_or(Route::Conn(&self.conn), Route::Tx)
    }

    /// Run one entrypoint: metrics, logging and error context around `fut`.
    async fn observe<T>(
        &self,
        op: Operation,
        table: &str,
        opts: &ExecOptions<'_, C::Transaction>,
        rows: impl FnOnce(&T) -> u64,
        fut: impl Future<Output = Result<T, InternalError>>,
    ) -> Result<T, InternalError> {
        debug!(
            target: TARGET,
            %op,
            table,
            prepared = opts.cache_key().unwrap_or_default(),
            in_transaction = opts.transaction.is_some(),
            use_primary = opts.use_primary,
            "start"
        );
        self.record(MetricsEvent::ExecStart { op, table });

        let result = match self.ensure_open() {
            Ok(()) if opts.is_canceled() => Err(ExecutorError::Canceled.into()),
            Ok(()) => fut.await,
            Err(err) => Err(err.into()),
        };

        match result {
            Ok(value) => {
                let rows = rows(&value);
                self.record(MetricsEvent::ExecFinish { op, table, rows });
                debug!(target: TARGET, %op, table, rows, "finish");
                Ok(value)
            }
            Err(err) => {
                let err = err.with_context(op, table);
                self.record(MetricsEvent::Error {
                    op,
                    table,
                    class: err.class,
                });
                debug!(target: TARGET, %op, table, error = %err.display_with_class(), "failed");
                Err(err)
            }
        }
    }

    fn compile(
        &self,
        compile: impl FnOnce(Dialect) -> Result<CompiledQuery, CompileError>,
    ) -> Result<CompiledQuery, InternalError> {
        let dialect = self.dialect();
        let query = compile(dialect)?;
        self.record(MetricsEvent::Compile { dialect });

        if self.config.debug {
            debug!(
                target: TARGET,
                %dialect,
                sql = %query.sql,
                placeholders = query.placeholder_count(),
                "compiled"
            );
        }

        Ok(query)
    }

    /// Compile, or fetch from the cache when the call names a statement.
    ///
    /// `records` pins the batch size of multi-record statements. Only fully
    /// prepared statements are ever stored.
    async fn prepare(
        &self,
        opts: &ExecOptions<'_, C::Transaction>,
        records: Option<usize>,
        compile: impl FnOnce(Dialect) -> Result<CompiledQuery, CompileError>,
    ) -> Result<Prepared<C::Statement>, InternalError> {
        let key = opts.cache_key().filter(|_| self.config.cache_statements);
        let Some(name) = key else {
            return Ok(Prepared::Text(self.compile(compile)?));
        };

        if let Some(entry) = self.cache.get(name) {
            self.record(MetricsEvent::CacheHit { name });
            if let Some(records) = records {
                entry.check_records(name, records)?;
            }
            return Ok(Prepared::Cached(entry));
        }

        self.record(MetricsEvent::CacheMiss { name });
        let query = self.compile(compile)?;
        let handle = cancellable(opts, self.conn.prepare(&query.sql)).await?;

        let mut statement = CachedStatement::new(query, handle);
        if let Some(records) = records {
            statement = statement.with_records(records);
        }

        let (entry, rejected) = self.cache.add(name, statement);
        if let Some(handle) = rejected {
            self.record(MetricsEvent::CacheRace { name });
            if let Err(err) = self.conn.close_statement(&handle).await {
                warn!(
                    target: TARGET,
                    statement = name,
                    error = %err,
                    "close of duplicate statement failed"
                );
            }
        }
        // close() may have drained the cache while this handle was prepared
        if self.is_closed() {
            self.close_cached().await;
            return Err(ExecutorError::Closed.into());
        }
        if let Some(records) = records {
            entry.check_records(name, records)?;
        }
        debug!(target: TARGET, statement = name, "statement cached");

        Ok(Prepared::Cached(entry))
    }

    async fn exec(
        &self,
        prepared: &Prepared<C::Statement>,
        values: &[Value],
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<ExecSummary, InternalError> {
        let args = prepared.bind(values)?;
        ensure_live(opts)?;

        let route = self.route(opts.transaction);
        debug!(target: TARGET, route = route.label(), args = args.len(), "exec");
        cancellable(opts, route.exec(prepared.stmt(), &args)).await
    }

    async fn query(
        &self,
        prepared: &Prepared<C::Statement>,
        values: &[Value],
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<Vec<Row>, InternalError> {
        let args = prepared.bind(values)?;
        ensure_live(opts)?;

        let route = self.route(opts.transaction);
        debug!(target: TARGET, route = route.label(), args = args.len(), "query");
        cancellable(opts, route.query(prepared.stmt(), &args)).await
    }

    async fn query_row(
        &self,
        prepared: &Prepared<C::Statement>,
        values: &[Value],
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<Row, InternalError> {
        let args = prepared.bind(values)?;
        ensure_live(opts)?;

        let route = self.route(opts.transaction);
        debug!(target: TARGET, route = route.label(), args = args.len(), "query_row");
        cancellable(opts, route.query_row(prepared.stmt(), &args)).await
    }
}

// Cancellation checkpoint between driver calls.
fn ensure_live<T>(opts: &ExecOptions<'_, T>) -> Result<(), ExecutorError> {
    if opts.is_canceled() {
        Err(ExecutorError::Canceled)
    } else {
        Ok(())
    }
}

// Race a driver call against the caller's cancellation token.
async fn cancellable<T, X>(
    opts: &ExecOptions<'_, X>,
    fut: impl Future<Output = Result<T, DriverError>>,
) -> Result<T, InternalError> {
    let Some(token) = opts.cancel.as_ref() else {
        return fut.await.map_err(InternalError::from);
    };

    tokio::select! {
        biased;
        () = token.cancelled() => Err(ExecutorError::Canceled.into()),
        result = fut => result.map_err(InternalError::from),
    }
}

// Values of `record`, checked against its declared columns.
fn record_values<R: Record>(record: &R) -> Result<Vec<Value>, ExecutorError> {
    let values = record.values();
    if values.len() == R::COLUMNS.len() {
        Ok(values)
    } else {
        Err(ExecutorError::ValueCount {
            table: R::TABLE,
            expected: R::COLUMNS.len(),
            found: values.len(),
        })
    }
}
