use super::{CallStyle, Dialect, Pagination, Returning, SqlDialect, UpsertStyle, write_hex};
use crate::query::JoinKind;

/// Largest row count MySQL accepts; used when OFFSET is given without LIMIT.
const MAX_ROWS: &str = "18446744073709551615";

///
/// MySql
///

#[derive(Clone, Copy, Debug, Default)]
pub struct MySql;

impl SqlDialect for MySql {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn write_placeholder(&self, out: &mut String, _ordinal: usize) {
        out.push('?');
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "TRUE" } else { "FALSE" }
    }

    fn write_blob(&self, out: &mut String, bytes: &[u8]) {
        out.push_str("X'");
        write_hex(out, bytes, true);
        out.push('\'');
    }

    fn regexp_keyword(&self, negated: bool) -> Option<&'static str> {
        Some(if negated { "NOT REGEXP" } else { "REGEXP" })
    }

    fn supports_join(&self, kind: JoinKind) -> bool {
        !matches!(kind, JoinKind::Full)
    }

    fn pagination(&self) -> Pagination {
        Pagination::LimitOffset {
            offset_only_limit: Some(MAX_ROWS),
        }
    }

    fn returning(&self) -> Returning {
        Returning::LastInsertId
    }

    fn upsert(&self) -> UpsertStyle {
        UpsertStyle::OnDuplicateKey
    }

    fn call(&self) -> CallStyle {
        CallStyle::Call
    }
}
