//! Prepared statement cache.
//!
//! One cache is owned by one `Db` handle and never shared across
//! connections. Entries are immutable once stored: the compiled index list
//! of a name is fixed for the life of the entry.

use crate::{
    compile::CompiledQuery,
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

///
/// CachedStatement
///
/// Compiled SQL, its placeholder index list and the driver handle it was
/// prepared into. Batch statements also pin the record count they were
/// compiled for.
///

#[derive(Debug)]
pub struct CachedStatement<S> {
    pub query: CompiledQuery,
    pub handle: S,
    pub expected_records: Option<usize>,
}

impl<S> CachedStatement<S> {
    #[must_use]
    pub const fn new(query: CompiledQuery, handle: S) -> Self {
        Self {
            query,
            handle,
            expected_records: None,
        }
    }

    #[must_use]
    pub const fn with_records(mut self, records: usize) -> Self {
        self.expected_records = Some(records);
        self
    }

    /// Reject a batch call whose record count differs from the one this
    /// statement was compiled for.
    pub fn check_records(&self, name: &str, records: usize) -> Result<(), InternalError> {
        match self.expected_records {
            Some(expected) if expected != records => Err(InternalError::new(
                ErrorClass::InvalidConfig,
                ErrorOrigin::Cache,
                format!(
                    "prepared statement '{name}' was compiled for {expected} record(s), \
                     called with {records}"
                ),
            )),
            _ => Ok(()),
        }
    }
}

///
/// StatementCache
///

#[derive(Debug)]
pub struct StatementCache<S> {
    entries: RwLock<HashMap<String, Arc<CachedStatement<S>>>>,
}

impl<S> StatementCache<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<CachedStatement<S>>> {
        self.entries.read().get(name).cloned()
    }

    /// Store `statement` under `name` unless an entry already exists.
    ///
    /// Returns the entry now stored under `name`. When another caller won
    /// the race, the stored entry is theirs and the handle of `statement` is
    /// handed back so the caller can close it.
    pub fn add(
        &self,
        name: impl Into<String>,
        statement: CachedStatement<S>,
    ) -> (Arc<CachedStatement<S>>, Option<S>) {
        let mut entries = self.entries.write();
        let name = name.into();

        if let Some(existing) = entries.get(&name) {
            return (Arc::clone(existing), Some(statement.handle));
        }

        let entry = Arc::new(statement);
        entries.insert(name, Arc::clone(&entry));

        (entry, None)
    }

    /// Remove every entry, returning them so their handles can be closed.
    pub fn drain(&self) -> Vec<Arc<CachedStatement<S>>> {
        self.entries.write().drain().map(|(_, entry)| entry).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<S> Default for StatementCache<S> {
    fn default() -> Self {
        Self::new()
    }
}
