use crate::error::Error;
use polyql_core::{
    config::DbConfig,
    driver::{Connection, Row},
    executor::{self, ExecOptions},
    obs::MetricsSink,
    query::{Filter, Table, Updates},
    record::{Record, RecordSet},
    value::Value,
};
use std::sync::Arc;

/// Per-call options for a [`Database`] over connection `C`.
pub type Options<'a, C> = ExecOptions<'a, <C as Connection>::Transaction>;

///
/// Database
/// Public handle over one connection.
/// Converts core errors into `polyql::Error`.
///

pub struct Database<C: Connection> {
    inner: executor::Db<C>,
}

impl<C: Connection> Database<C> {
    #[must_use]
    pub fn new(conn: C, config: DbConfig) -> Self {
        Self {
            inner: executor::Db::new(conn, config),
        }
    }

    /// Override the metrics sink for calls made through this handle.
    #[must_use]
    pub fn metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.inner = self.inner.with_metrics_sink(sink);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &DbConfig {
        self.inner.config()
    }

    #[must_use]
    pub const fn connection(&self) -> &C {
        self.inner.connection()
    }

    #[must_use]
    pub fn cached_statements(&self) -> usize {
        self.inner.cached_statements()
    }

    //
    // Lifecycle
    //

    pub async fn begin(&self) -> Result<C::Transaction, Error> {
        Ok(self.inner.begin().await?)
    }

    pub async fn ping(&self, opts: &Options<'_, C>) -> Result<(), Error> {
        Ok(self.inner.ping(opts).await?)
    }

    pub async fn close(&self) -> Result<(), Error> {
        Ok(self.inner.close().await?)
    }

    //
    // Writes
    //

    pub async fn insert<R: Record>(
        &self,
        record: &mut R,
        opts: &Options<'_, C>,
    ) -> Result<(), Error> {
        Ok(self.inner.insert(record, opts).await?)
    }

    pub async fn insert_many<R: Record>(
        &self,
        records: &mut [R],
        opts: &Options<'_, C>,
    ) -> Result<(), Error> {
        Ok(self.inner.insert_many(records, opts).await?)
    }

    pub async fn upsert<R: Record>(
        &self,
        record: &mut R,
        opts: &Options<'_, C>,
    ) -> Result<(), Error> {
        Ok(self.inner.upsert(record, opts).await?)
    }

    pub async fn update<R: Record>(
        &self,
        updates: &Updates,
        filter: &Filter,
        values: &[Value],
        opts: &Options<'_, C>,
    ) -> Result<u64, Error> {
        Ok(self.inner.update::<R>(updates, filter, values, opts).await?)
    }

    pub async fn update_by_id<R: Record>(
        &self,
        record: &R,
        opts: &Options<'_, C>,
    ) -> Result<bool, Error> {
        Ok(self.inner.update_by_id(record, opts).await?)
    }

    pub async fn delete<R: Record>(
        &self,
        filter: &Filter,
        values: &[Value],
        opts: &Options<'_, C>,
    ) -> Result<u64, Error> {
        Ok(self.inner.delete::<R>(filter, values, opts).await?)
    }

    pub async fn delete_by_id<R: Record>(
        &self,
        record: &R,
        opts: &Options<'_, C>,
    ) -> Result<bool, Error> {
        Ok(self.inner.delete_by_id(record, opts).await?)
    }

    pub async fn soft_delete<R: Record>(
        &self,
        filter: &Filter,
        values: &[Value],
        opts: &Options<'_, C>,
    ) -> Result<u64, Error> {
        Ok(self.inner.soft_delete::<R>(filter, values, opts).await?)
    }

    pub async fn soft_delete_by_id<R: Record>(
        &self,
        record: &R,
        opts: &Options<'_, C>,
    ) -> Result<bool, Error> {
        Ok(self.inner.soft_delete_by_id(record, opts).await?)
    }

    pub async fn call(
        &self,
        procedure: &str,
        args: &[Value],
        opts: &Options<'_, C>,
    ) -> Result<u64, Error> {
        Ok(self.inner.call(procedure, args, opts).await?)
    }

    //
    // Reads
    //

    pub async fn get<S: RecordSet>(
        &self,
        out: &mut S,
        filter: &Filter,
        values: &[Value],
        opts: &Options<'_, C>,
    ) -> Result<usize, Error> {
        Ok(self.inner.get(out, filter, values, opts).await?)
    }

    pub async fn get_by_id<R: Record>(
        &self,
        record: &mut R,
        opts: &Options<'_, C>,
    ) -> Result<(), Error> {
        Ok(self.inner.get_by_id(record, opts).await?)
    }

    pub async fn select(
        &self,
        table: &Table,
        columns: &[&str],
        filter: &Filter,
        values: &[Value],
        opts: &Options<'_, C>,
    ) -> Result<Vec<Row>, Error> {
        Ok(self.inner.select(table, columns, filter, values, opts).await?)
    }

    pub async fn count<R: Record>(
        &self,
        filter: &Filter,
        values: &[Value],
        opts: &Options<'_, C>,
    ) -> Result<u64, Error> {
        Ok(self.inner.count::<R>(filter, values, opts).await?)
    }
}
