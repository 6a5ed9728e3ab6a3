//! Record contract.
//!
//! A record describes its own table and column mapping; the executor never
//! reflects over record types.

use crate::{driver::Row, value::Value};
use thiserror::Error as ThisError;

///
/// Record
///
/// `COLUMNS` lists the insertable/updatable columns, excluding the id.
/// `values` must return one value per entry of `COLUMNS`, in the same order.
///

pub trait Record: Send + Sync {
    const TABLE: &'static str;
    const ID_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str];

    /// Column stamped by soft deletes. Reads skip rows where it is set.
    const SOFT_DELETE_COLUMN: Option<&'static str> = None;

    fn id(&self) -> Value;

    /// Assign the id generated by an insert or upsert.
    fn set_id(&mut self, id: Value) -> Result<(), ScanError>;

    fn values(&self) -> Vec<Value>;

    /// Read one result row into `self`.
    fn scan(&mut self, row: &Row) -> Result<(), ScanError>;

    /// Every column a read selects: the id followed by `COLUMNS`.
    #[must_use]
    fn select_columns() -> Vec<&'static str> {
        let mut columns = Vec::with_capacity(Self::COLUMNS.len() + 1);
        columns.push(Self::ID_COLUMN);
        columns.extend_from_slice(Self::COLUMNS);
        columns
    }
}

///
/// RecordSet
///
/// Multi-row scan target.
///

pub trait RecordSet: Send {
    type Item: Record;

    fn scan_rows(&mut self, rows: &[Row]) -> Result<(), ScanError>;
}

impl<R> RecordSet for Vec<R>
where
    R: Record + Default,
{
    type Item = R;

    fn scan_rows(&mut self, rows: &[Row]) -> Result<(), ScanError> {
        self.reserve(rows.len());
        for row in rows {
            let mut record = R::default();
            record.scan(row)?;
            self.push(record);
        }

        Ok(())
    }
}

///
/// ScanError
///

#[derive(Debug, ThisError)]
pub enum ScanError {
    #[error("column '{0}' is missing from the row")]
    MissingColumn(String),

    #[error("column '{column}' expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl ScanError {
    /// Column lookup helper for `Record::scan` implementations.
    pub fn column<'a>(row: &'a Row, name: &str) -> Result<&'a Value, Self> {
        row.get(name)
            .ok_or_else(|| Self::MissingColumn(name.to_string()))
    }

    pub fn mismatch(column: &str, expected: &'static str, found: &Value) -> Self {
        Self::TypeMismatch {
            column: column.to_string(),
            expected,
            found: found.kind(),
        }
    }
}
