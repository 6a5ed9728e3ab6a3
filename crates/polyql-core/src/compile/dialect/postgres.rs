use super::{CallStyle, Dialect, Pagination, Returning, SqlDialect, UpsertStyle, write_hex};
use crate::query::JoinKind;
use std::fmt::Write;

///
/// Postgres
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn write_placeholder(&self, out: &mut String, ordinal: usize) {
        let _ = write!(out, "${ordinal}");
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "TRUE" } else { "FALSE" }
    }

    // bytea hex input format
    fn write_blob(&self, out: &mut String, bytes: &[u8]) {
        out.push_str("'\\x");
        write_hex(out, bytes, false);
        out.push('\'');
    }

    fn regexp_keyword(&self, negated: bool) -> Option<&'static str> {
        Some(if negated { "!~" } else { "~" })
    }

    fn supports_join(&self, _kind: JoinKind) -> bool {
        true
    }

    fn pagination(&self) -> Pagination {
        Pagination::LimitOffset {
            offset_only_limit: None,
        }
    }

    fn returning(&self) -> Returning {
        Returning::Suffix
    }

    fn upsert(&self) -> UpsertStyle {
        UpsertStyle::OnConflict
    }

    fn call(&self) -> CallStyle {
        CallStyle::Call
    }
}
