use super::{Db, ExecOptions, ExecutorError, Operation, write::by_id};
use crate::{
    compile,
    driver::{Connection, Row},
    error::InternalError,
    query::{Condition, Filter, Table},
    record::{Record, RecordSet},
    value::Value,
};

impl<C: Connection> Db<C> {
    /// Scan every live row matching `filter` into `out`; returns the number
    /// of rows read.
    pub async fn get<S: RecordSet>(
        &self,
        out: &mut S,
        filter: &Filter,
        values: &[Value],
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<usize, InternalError> {
        let table = <S::Item as Record>::TABLE;

        self.observe(Operation::Get, table, opts, |n| *n as u64, async {
            let prepared = self
                .prepare(opts, None, |d| {
                    compile::select(
                        d,
                        &Table::new(table),
                        &<S::Item as Record>::select_columns(),
                        &live::<S::Item>(filter),
                    )
                })
                .await?;

            let rows = self.query(&prepared, values, opts).await?;
            out.scan_rows(&rows).map_err(ExecutorError::from)?;

            Ok(rows.len())
        })
        .await
    }

    /// Load the live row with `record`'s id into `record`.
    ///
    /// Fails with `RecordNotFound` when there is no such row.
    pub async fn get_by_id<R: Record>(
        &self,
        record: &mut R,
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<(), InternalError> {
        self.observe(Operation::GetById, R::TABLE, opts, |_| 1, async {
            let prepared = self
                .prepare(opts, None, |d| {
                    compile::select(
                        d,
                        &Table::new(R::TABLE),
                        &R::select_columns(),
                        &live::<R>(&by_id::<R>(0)),
                    )
                })
                .await?;

            let row = self.query_row(&prepared, &[record.id()], opts).await?;
            record.scan(&row).map_err(ExecutorError::from)?;

            Ok(())
        })
        .await
    }

    /// Raw rows over an arbitrary table expression, joins included.
    /// An empty `columns` selects `*`.
    pub async fn select(
        &self,
        table: &Table,
        columns: &[&str],
        filter: &Filter,
        values: &[Value],
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<Vec<Row>, InternalError> {
        self.observe(Operation::Select, &table.name, opts, |rows| rows.len() as u64, async {
            let prepared = self
                .prepare(opts, None, |d| compile::select(d, table, columns, filter))
                .await?;

            self.query(&prepared, values, opts).await
        })
        .await
    }

    /// Number of live rows matching `filter`.
    pub async fn count<R: Record>(
        &self,
        filter: &Filter,
        values: &[Value],
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<u64, InternalError> {
        self.observe(Operation::Count, R::TABLE, opts, |_| 1, async {
            let prepared = self
                .prepare(opts, None, |d| {
                    compile::count(d, &Table::new(R::TABLE), &live::<R>(filter))
                })
                .await?;

            let row = self.query_row(&prepared, values, opts).await?;
            let count = match row.get_at(0) {
                Some(Value::Uint(n)) => Some(*n),
                Some(Value::Int(n)) => u64::try_from(*n).ok(),
                _ => None,
            };

            count.ok_or_else(|| {
                ExecutorError::UnexpectedResult(format!(
                    "COUNT(*) returned {:?}",
                    row.get_at(0)
                ))
                .into()
            })
        })
        .await
    }
}

// Reads skip soft-deleted rows.
fn live<R: Record>(filter: &Filter) -> Filter {
    match R::SOFT_DELETE_COLUMN {
        Some(column) => filter.clone().filter(Condition::is_null(column)),
        None => filter.clone(),
    }
}
