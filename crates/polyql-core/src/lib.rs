//! Core runtime for polyql: query descriptions, the dialect compiler, the
//! prepared statement cache and the async executor, plus the vocabulary
//! exported via the `prelude`.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod cache;
pub mod compile;
pub mod config;
pub mod driver;
pub mod error;
pub mod executor;
pub mod obs;
pub mod query;
pub mod record;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only query vocabulary and the record contract.
/// No executors, drivers or errors are re-exported here.
///

pub mod prelude {
    pub use crate::{
        compile::Dialect,
        query::{Condition, Direction, Filter, JoinKind, Operand, Table, Updates},
        record::{Record, RecordSet},
        value::Value,
    };
}
