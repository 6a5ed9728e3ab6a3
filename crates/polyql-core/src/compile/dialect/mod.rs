//! Per-dialect rule tables.
//!
//! The compiler core is shared; a dialect only answers token questions
//! (placeholder syntax, literal spelling, keyword availability) and names
//! the statement shapes it uses for pagination, id retrieval, upserts and
//! procedure calls.

mod mssql;
mod mysql;
mod postgres;

use crate::query::JoinKind;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

pub use mssql::MsSql;
pub use mysql::MySql;
pub use postgres::Postgres;

///
/// Dialect
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[serde(alias = "postgresql", alias = "pg")]
    #[display("postgres")]
    Postgres,

    #[serde(alias = "mariadb")]
    #[display("mysql")]
    MySql,

    #[serde(alias = "sqlserver")]
    #[display("mssql")]
    MsSql,
}

impl Dialect {
    pub const ALL: [Self; 3] = [Self::Postgres, Self::MySql, Self::MsSql];

    /// Static rule table for this dialect.
    #[must_use]
    pub fn rules(self) -> &'static dyn SqlDialect {
        match self {
            Self::Postgres => &Postgres,
            Self::MySql => &MySql,
            Self::MsSql => &MsSql,
        }
    }
}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "mssql" | "sqlserver" => Ok(Self::MsSql),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

///
/// UnknownDialect
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("unknown dialect '{0}'")]
pub struct UnknownDialect(pub String);

///
/// SqlDialect
///

pub trait SqlDialect: Send + Sync + fmt::Debug {
    fn dialect(&self) -> Dialect;

    /// Write the placeholder for the 1-based `ordinal`.
    fn write_placeholder(&self, out: &mut String, ordinal: usize);

    fn bool_literal(&self, value: bool) -> &'static str;

    fn write_blob(&self, out: &mut String, bytes: &[u8]);

    /// Regex-match keyword, if the dialect has one.
    fn regexp_keyword(&self, negated: bool) -> Option<&'static str>;

    fn supports_join(&self, kind: JoinKind) -> bool;

    fn pagination(&self) -> Pagination;

    fn returning(&self) -> Returning;

    fn upsert(&self) -> UpsertStyle;

    fn call(&self) -> CallStyle;
}

///
/// Pagination
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Pagination {
    /// `LIMIT n OFFSET m`. `offset_only_limit` is the sentinel emitted when
    /// the dialect cannot express OFFSET without LIMIT.
    LimitOffset {
        offset_only_limit: Option<&'static str>,
    },

    /// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`; requires ORDER BY.
    OffsetFetch,
}

///
/// Returning
/// How INSERT hands back the generated id.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Returning {
    /// `... RETURNING id`
    Suffix,

    /// `INSERT INTO t (...) OUTPUT INSERTED.id VALUES (...)`
    Output,

    /// Driver last-insert-id, with a `SELECT ... ORDER BY id DESC` fallback.
    LastInsertId,
}

///
/// UpsertStyle
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UpsertStyle {
    OnConflict,
    OnDuplicateKey,
    Merge,
}

///
/// CallStyle
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CallStyle {
    /// `CALL proc(a, b)`
    Call,

    /// `EXEC proc a, b`
    Exec,
}

// Hex writer shared by the blob literal spellings.
pub(crate) fn write_hex(out: &mut String, bytes: &[u8], upper: bool) {
    const LOWER: &[u8; 16] = b"0123456789abcdef";
    const UPPER: &[u8; 16] = b"0123456789ABCDEF";
    let table = if upper { UPPER } else { LOWER };

    for b in bytes {
        out.push(table[usize::from(b >> 4)] as char);
        out.push(table[usize::from(b & 0x0f)] as char);
    }
}
