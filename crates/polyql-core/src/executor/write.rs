use super::{Db, ExecOptions, ExecutorError, Operation, Prepared, record_values};
use crate::{
    compile::{
        self,
        dialect::{Dialect, Returning},
    },
    driver::Connection,
    error::InternalError,
    query::{Condition, Filter, Operand, Table, Updates},
    record::Record,
    value::Value,
};

impl<C: Connection> Db<C> {
    /// Insert `record` and assign its generated id.
    ///
    /// Fails with `NoRecordInserted` when the driver reports no row written.
    pub async fn insert<R: Record>(
        &self,
        record: &mut R,
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<(), InternalError> {
        self.observe(Operation::Insert, R::TABLE, opts, |_| 1, async {
            let values = record_values(record)?;
            let prepared = self
                .prepare(opts, None, |d| {
                    compile::insert(d, R::TABLE, R::ID_COLUMN, R::COLUMNS)
                })
                .await?;

            if let Some(id) = self
                .insert_returning(&prepared, &values, R::TABLE, R::ID_COLUMN, opts)
                .await?
            {
                record.set_id(id).map_err(ExecutorError::from)?;
            }

            Ok(())
        })
        .await
    }

    /// Insert every record in one statement and assign generated ids in
    /// order.
    ///
    /// A cached batch statement is bound to the record count it was first
    /// compiled for; a different count under the same name is rejected.
    pub async fn insert_many<R: Record>(
        &self,
        records: &mut [R],
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<(), InternalError> {
        let count = records.len();

        self.observe(Operation::InsertMany, R::TABLE, opts, |_| count as u64, async {
            let mut values = Vec::with_capacity(count * R::COLUMNS.len());
            for record in records.iter() {
                values.extend(record_values(record)?);
            }

            let prepared = self
                .prepare(opts, Some(count), |d| {
                    compile::insert_many(d, R::TABLE, R::ID_COLUMN, R::COLUMNS, count)
                })
                .await?;

            match self.dialect().rules().returning() {
                Returning::Suffix | Returning::Output => {
                    let rows = self.query(&prepared, &values, opts).await?;
                    if rows.is_empty() {
                        return Err(no_rows(R::TABLE));
                    }
                    if rows.len() != count {
                        return Err(ExecutorError::UnexpectedResult(format!(
                            "{} id(s) returned for {count} record(s)",
                            rows.len()
                        ))
                        .into());
                    }
                    for (record, row) in records.iter_mut().zip(&rows) {
                        if let Some(id) = row.get_at(0) {
                            record.set_id(id.clone()).map_err(ExecutorError::from)?;
                        }
                    }
                }
                Returning::LastInsertId => {
                    let summary = self.exec(&prepared, &values, opts).await?;
                    if summary.rows_affected == 0 {
                        return Err(no_rows(R::TABLE));
                    }
                    // the driver reports the first id of a multi-row insert
                    if let Some(first) = summary.last_insert_id {
                        for (offset, record) in (0i64..).zip(records.iter_mut()) {
                            record
                                .set_id(Value::Int(first.saturating_add(offset)))
                                .map_err(ExecutorError::from)?;
                        }
                    }
                }
            }

            Ok(())
        })
        .await
    }

    /// Insert or update `record` keyed on its id, then assign the id the
    /// database reports.
    pub async fn upsert<R: Record>(
        &self,
        record: &mut R,
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<(), InternalError> {
        self.observe(Operation::Upsert, R::TABLE, opts, |_| 1, async {
            let mut values = Vec::with_capacity(R::COLUMNS.len() + 1);
            values.push(record.id());
            values.extend(record_values(record)?);

            let prepared = self
                .prepare(opts, None, |d| {
                    compile::upsert(d, R::TABLE, R::ID_COLUMN, R::COLUMNS)
                })
                .await?;

            let id = match self.dialect().rules().returning() {
                Returning::Suffix | Returning::Output => {
                    let row = self
                        .query_row(&prepared, &values, opts)
                        .await
                        .map_err(|err| inserted(err, R::TABLE))?;
                    row.get_at(0).cloned()
                }
                Returning::LastInsertId => self
                    .exec(&prepared, &values, opts)
                    .await?
                    .last_insert_id
                    .map(Value::Int),
            };
            if let Some(id) = id {
                record.set_id(id).map_err(ExecutorError::from)?;
            }

            Ok(())
        })
        .await
    }

    /// `UPDATE` every row matching `filter`; returns the affected row count.
    ///
    /// `values` feeds both the assignments and the filter.
    pub async fn update<R: Record>(
        &self,
        updates: &Updates,
        filter: &Filter,
        values: &[Value],
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<u64, InternalError> {
        self.observe(Operation::Update, R::TABLE, opts, |n| *n, async {
            let prepared = self
                .prepare(opts, None, |d| {
                    compile::update(d, &Table::new(R::TABLE), updates, filter)
                })
                .await?;

            Ok(self.exec(&prepared, values, opts).await?.rows_affected)
        })
        .await
    }

    /// Write every column of `record` to the row with its id.
    ///
    /// Returns `false` when no row has that id.
    pub async fn update_by_id<R: Record>(
        &self,
        record: &R,
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<bool, InternalError> {
        self.observe(Operation::UpdateById, R::TABLE, opts, |b| u64::from(*b), async {
            let mut values = record_values(record)?;
            let id_index = values.len();
            values.push(record.id());

            let prepared = self
                .prepare(opts, None, |d| {
                    let updates = Updates::params(R::COLUMNS.iter().copied(), 0);
                    compile::update(d, &Table::new(R::TABLE), &updates, &by_id::<R>(id_index))
                })
                .await?;

            Ok(self.exec(&prepared, &values, opts).await?.rows_affected > 0)
        })
        .await
    }

    /// `DELETE` every row matching `filter`; returns the affected row count.
    pub async fn delete<R: Record>(
        &self,
        filter: &Filter,
        values: &[Value],
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<u64, InternalError> {
        self.observe(Operation::Delete, R::TABLE, opts, |n| *n, async {
            let prepared = self
                .prepare(opts, None, |d| {
                    compile::delete(d, &Table::new(R::TABLE), filter)
                })
                .await?;

            Ok(self.exec(&prepared, values, opts).await?.rows_affected)
        })
        .await
    }

    /// Delete the row with `record`'s id. Returns `false` when there was none.
    pub async fn delete_by_id<R: Record>(
        &self,
        record: &R,
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<bool, InternalError> {
        self.observe(Operation::DeleteById, R::TABLE, opts, |b| u64::from(*b), async {
            let prepared = self
                .prepare(opts, None, |d| {
                    compile::delete(d, &Table::new(R::TABLE), &by_id::<R>(0))
                })
                .await?;

            Ok(self.exec(&prepared, &[record.id()], opts).await?.rows_affected > 0)
        })
        .await
    }

    /// Stamp the soft-delete column of every live row matching `filter`.
    pub async fn soft_delete<R: Record>(
        &self,
        filter: &Filter,
        values: &[Value],
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<u64, InternalError> {
        self.observe(Operation::SoftDelete, R::TABLE, opts, |n| *n, async {
            let column = soft_delete_column::<R>()?;
            let prepared = self
                .prepare(opts, None, |d| {
                    compile::soft_delete(d, &Table::new(R::TABLE), column, filter)
                })
                .await?;

            Ok(self.exec(&prepared, values, opts).await?.rows_affected)
        })
        .await
    }

    /// Soft-delete the live row with `record`'s id. Returns `false` when
    /// there is no such row or it was already deleted.
    pub async fn soft_delete_by_id<R: Record>(
        &self,
        record: &R,
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<bool, InternalError> {
        self.observe(Operation::SoftDeleteById, R::TABLE, opts, |b| u64::from(*b), async {
            let column = soft_delete_column::<R>()?;
            let prepared = self
                .prepare(opts, None, |d| {
                    compile::soft_delete(d, &Table::new(R::TABLE), column, &by_id::<R>(0))
                })
                .await?;

            Ok(self.exec(&prepared, &[record.id()], opts).await?.rows_affected > 0)
        })
        .await
    }

    /// Call a stored procedure with `args` bound in order; returns the
    /// affected row count the driver reports.
    pub async fn call(
        &self,
        procedure: &str,
        args: &[Value],
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<u64, InternalError> {
        self.observe(Operation::Call, procedure, opts, |n| *n, async {
            let prepared = self
                .prepare(opts, None, |d| compile::call(d, procedure, args.len()))
                .await?;

            Ok(self.exec(&prepared, args, opts).await?.rows_affected)
        })
        .await
    }

    // Run an insert and fetch the generated id the way the dialect hands it
    // back.
    async fn insert_returning(
        &self,
        prepared: &Prepared<C::Statement>,
        values: &[Value],
        table: &str,
        id_column: &str,
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<Option<Value>, InternalError> {
        match self.dialect().rules().returning() {
            Returning::Suffix | Returning::Output => {
                let row = self
                    .query_row(prepared, values, opts)
                    .await
                    .map_err(|err| inserted(err, table))?;

                Ok(row.get_at(0).cloned())
            }
            Returning::LastInsertId => {
                let summary = self.exec(prepared, values, opts).await?;
                if summary.rows_affected == 0 {
                    return Err(no_rows(table));
                }
                match summary.last_insert_id {
                    Some(id) => Ok(Some(Value::Int(id))),
                    None => self.last_id(table, id_column, opts).await.map(Some),
                }
            }
        }
    }

    // Fallback for drivers without a last-insert-id primitive.
    async fn last_id(
        &self,
        table: &str,
        id_column: &str,
        opts: &ExecOptions<'_, C::Transaction>,
    ) -> Result<Value, InternalError> {
        let query = self.compile(|d: Dialect| compile::last_id(d, table, id_column))?;
        let row = self
            .query_row(&Prepared::Text(query), &[], opts)
            .await
            .map_err(|err| inserted(err, table))?;

        row.get_at(0).cloned().ok_or_else(|| {
            ExecutorError::UnexpectedResult("id lookup returned no column".to_string()).into()
        })
    }
}

// `id_column = values[index]`
pub(super) fn by_id<R: Record>(index: usize) -> Filter {
    Filter::with_condition(Condition::eq(R::ID_COLUMN, Operand::param(index)))
}

fn soft_delete_column<R: Record>() -> Result<&'static str, ExecutorError> {
    R::SOFT_DELETE_COLUMN.ok_or(ExecutorError::NoSoftDeleteColumn { table: R::TABLE })
}

fn no_rows(table: &str) -> InternalError {
    ExecutorError::NoRowsAffected {
        table: table.to_string(),
    }
    .into()
}

// An insert that returns no row wrote nothing.
fn inserted(err: InternalError, table: &str) -> InternalError {
    if err.is_not_found() {
        no_rows(table)
    } else {
        err
    }
}
