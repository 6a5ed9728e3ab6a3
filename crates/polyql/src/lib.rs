//! ## Crate layout
//! - `core`: query descriptions, dialect compiler, statement cache, executor
//!   and observability.
//! - `error`: the public error type every [`Database`] call returns.
//!
//! Drivers implement the `core::driver` traits; callers work through
//! [`Database`] and the `prelude`.

pub use polyql_core as core;

mod db;
pub mod error;

/// re-exports
///
/// driver crates implement `async_trait` traits and callers build
/// cancellation tokens; these save them the direct dependencies
pub mod __reexports {
    pub use async_trait;
    pub use tokio_util;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::{compile, config::DbConfig, executor::ExecOptions, obs};
pub use db::{Database, Options};
pub use error::{Error, ErrorKind, ErrorOrigin};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::{
        Database, DbConfig, Error, ExecOptions, Options,
        core::{
            compile::Dialect,
            driver::{Connection as _, Row, Session as _, Transaction as _},
            query::{Condition, Direction, Filter, JoinKind, Operand, Table, Updates},
            record::{Record, RecordSet, ScanError},
            value::Value,
        },
    };
    pub use tokio_util::sync::CancellationToken;
}
