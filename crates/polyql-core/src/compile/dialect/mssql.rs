use super::{CallStyle, Dialect, Pagination, Returning, SqlDialect, UpsertStyle, write_hex};
use crate::query::JoinKind;
use std::fmt::Write;

///
/// MsSql
///
/// SQL Server has no boolean literal and no regex operator; BIT values are
/// spelled `1`/`0` and REGEXP clauses are rejected at compile time.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct MsSql;

impl SqlDialect for MsSql {
    fn dialect(&self) -> Dialect {
        Dialect::MsSql
    }

    fn write_placeholder(&self, out: &mut String, ordinal: usize) {
        let _ = write!(out, "@p{ordinal}");
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn write_blob(&self, out: &mut String, bytes: &[u8]) {
        out.push_str("0x");
        write_hex(out, bytes, true);
    }

    fn regexp_keyword(&self, _negated: bool) -> Option<&'static str> {
        None
    }

    fn supports_join(&self, _kind: JoinKind) -> bool {
        true
    }

    fn pagination(&self) -> Pagination {
        Pagination::OffsetFetch
    }

    fn returning(&self) -> Returning {
        Returning::Output
    }

    fn upsert(&self) -> UpsertStyle {
        UpsertStyle::Merge
    }

    fn call(&self) -> CallStyle {
        CallStyle::Exec
    }
}
