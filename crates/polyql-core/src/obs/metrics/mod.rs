use crate::{error::ErrorClass, executor::Operation};
use serde::{Deserialize, Serialize};
use parking_lot::Mutex;
use std::{cmp::Ordering, collections::BTreeMap, sync::LazyLock};
use time::OffsetDateTime;

///
/// EventState
/// Ephemeral, in-memory counters shared by every thread in the process.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub tables: BTreeMap<String, TableCounters>,
    pub window_start_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            tables: BTreeMap::new(),
            window_start_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Executor entrypoints
    pub read_calls: u64,
    pub write_calls: u64,
    pub call_calls: u64,

    // Compilation and cache
    pub compiles: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_races: u64,

    // Rows
    pub rows_read: u64,
    pub rows_written: u64,

    // Failures
    pub errors: u64,
    pub canceled: u64,
}

///
/// TableCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TableCounters {
    pub read_calls: u64,
    pub write_calls: u64,
    pub rows_read: u64,
    pub rows_written: u64,
    pub errors: u64,
}

static EVENT_STATE: LazyLock<Mutex<EventState>> =
    LazyLock::new(|| Mutex::new(EventState::default()));

/// Serializes tests that reset or read the shared counters.
#[cfg(test)]
pub(crate) static TEST_LOCK: Mutex<()> = Mutex::new(());

fn now_millis() -> u64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    u64::try_from(nanos).unwrap_or_default()
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    f(&EVENT_STATE.lock())
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    f(&mut EVENT_STATE.lock())
}

/// Reset all counters and restart the window.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

pub(crate) fn record_exec_start(m: &mut EventState, op: Operation, table: &str) {
    let entry = m.tables.entry(table.to_string()).or_default();
    if op.is_read() {
        m.ops.read_calls = m.ops.read_calls.saturating_add(1);
        entry.read_calls = entry.read_calls.saturating_add(1);
    } else if op == Operation::Call {
        m.ops.call_calls = m.ops.call_calls.saturating_add(1);
    } else {
        m.ops.write_calls = m.ops.write_calls.saturating_add(1);
        entry.write_calls = entry.write_calls.saturating_add(1);
    }
}

pub(crate) fn record_exec_finish(m: &mut EventState, op: Operation, table: &str, rows: u64) {
    let entry = m.tables.entry(table.to_string()).or_default();
    if op.is_read() {
        m.ops.rows_read = m.ops.rows_read.saturating_add(rows);
        entry.rows_read = entry.rows_read.saturating_add(rows);
    } else {
        m.ops.rows_written = m.ops.rows_written.saturating_add(rows);
        entry.rows_written = entry.rows_written.saturating_add(rows);
    }
}

pub(crate) fn record_error(m: &mut EventState, table: &str, class: ErrorClass) {
    m.ops.errors = m.ops.errors.saturating_add(1);
    if class == ErrorClass::Canceled {
        m.ops.canceled = m.ops.canceled.saturating_add(1);
    }
    let entry = m.tables.entry(table.to_string()).or_default();
    entry.errors = entry.errors.saturating_add(1);
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Counters since `window_start_ms`.
    pub counters: Option<EventState>,
    /// Per-table counters and averages.
    pub table_counters: Vec<TableSummary>,
}

///
/// TableSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TableSummary {
    pub table: String,
    pub read_calls: u64,
    pub write_calls: u64,
    pub rows_read: u64,
    pub rows_written: u64,
    pub avg_rows_per_read: f64,
    pub errors: u64,
}

/// Build a report from the in-memory counters.
///
/// `window_start_ms` after the current window start yields an empty report.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    let snap = with_state(Clone::clone);
    if window_start_ms.is_some_and(|start| start > snap.window_start_ms) {
        return EventReport::default();
    }

    let mut table_counters: Vec<TableSummary> = snap
        .tables
        .iter()
        .map(|(table, c)| TableSummary {
            table: table.clone(),
            read_calls: c.read_calls,
            write_calls: c.write_calls,
            rows_read: c.rows_read,
            rows_written: c.rows_written,
            avg_rows_per_read: if c.read_calls > 0 {
                c.rows_read as f64 / c.read_calls as f64
            } else {
                0.0
            },
            errors: c.errors,
        })
        .collect();

    table_counters.sort_by(|a, b| {
        match b
            .avg_rows_per_read
            .partial_cmp(&a.avg_rows_per_read)
            .unwrap_or(Ordering::Equal)
        {
            Ordering::Equal => a.table.cmp(&b.table),
            other => other,
        }
    });

    EventReport {
        counters: Some(snap),
        table_counters,
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn reset_all_clears_state() {
        let _guard = TEST_LOCK.lock();
        with_state_mut(|m| {
            m.tables.insert(
                "reset_me".to_string(),
                TableCounters {
                    read_calls: 1,
                    ..Default::default()
                },
            );
        });

        reset_all();

        with_state(|m| assert!(!m.tables.contains_key("reset_me")));
    }

    #[test]
    fn counts_from_other_threads_are_visible() {
        let _guard = TEST_LOCK.lock();
        reset_all();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                thread::spawn(|| {
                    with_state_mut(|m| record_exec_start(m, Operation::Delete, "cross_thread"));
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        with_state(|m| assert_eq!(m.tables["cross_thread"].write_calls, 4));
    }

    #[test]
    fn report_sorts_tables_by_average_rows() {
        let _guard = TEST_LOCK.lock();
        reset_all();
        with_state_mut(|m| {
            for (table, reads, rows) in [("alpha", 2, 6), ("beta", 1, 5), ("gamma", 2, 6)] {
                m.tables.insert(
                    table.to_string(),
                    TableCounters {
                        read_calls: reads,
                        rows_read: rows,
                        ..Default::default()
                    },
                );
            }
        });

        let report = report_window_start(None);
        let tables: Vec<_> = report
            .table_counters
            .iter()
            .filter(|t| ["alpha", "beta", "gamma"].contains(&t.table.as_str()))
            .collect();

        let names: Vec<_> = tables.iter().map(|t| t.table.as_str()).collect();
        assert_eq!(names, ["beta", "alpha", "gamma"]);
        assert_eq!(tables[0].avg_rows_per_read, 5.0);
        assert_eq!(tables[1].avg_rows_per_read, 3.0);
    }

    #[test]
    fn window_start_after_window_returns_empty() {
        let _guard = TEST_LOCK.lock();
        reset_all();
        let start = with_state(|m| m.window_start_ms);

        let report = report_window_start(Some(start.saturating_add(1)));
        assert!(report.counters.is_none());
        assert!(report.table_counters.is_empty());

        let report = report_window_start(Some(start));
        assert!(report.counters.is_some());
    }

    #[test]
    fn canceled_errors_are_counted_separately() {
        let mut m = EventState::default();
        record_error(&mut m, "users", ErrorClass::Canceled);
        record_error(&mut m, "users", ErrorClass::UnknownDatabase);

        assert_eq!(m.ops.errors, 2);
        assert_eq!(m.ops.canceled, 1);
        assert_eq!(m.tables["users"].errors, 2);
    }
}
