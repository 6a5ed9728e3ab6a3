//! Statement-level builders.
//!
//! Each builder writes one statement kind through the shared [`Compiler`];
//! dialect differences come only from the rule table's statement shapes.

use crate::{
    compile::{
        CompileError, CompiledQuery, Compiler,
        dialect::{CallStyle, Dialect, Returning, UpsertStyle},
    },
    query::{Arity, Condition, Direction, Filter, Operand, Param, Table, Updates},
};
use std::fmt::Write;

/// SQL expression assigned by soft deletes.
pub const SOFT_DELETE_NOW: &str = "CURRENT_TIMESTAMP";

/// `SELECT cols FROM table WHERE ...`
pub fn select(
    dialect: Dialect,
    table: &Table,
    columns: &[&str],
    filter: &Filter,
) -> Result<CompiledQuery, CompileError> {
    let mut c = Compiler::new(dialect);
    c.push("SELECT ");
    if columns.is_empty() {
        c.push("*");
    } else {
        write_columns(&mut c, columns, "")?;
    }
    c.push(" FROM ");
    c.table(table)?;
    c.push(" ");
    c.filter(filter)?;

    Ok(c.finish())
}

/// `SELECT COUNT(*) FROM table WHERE ...`
pub fn count(
    dialect: Dialect,
    table: &Table,
    filter: &Filter,
) -> Result<CompiledQuery, CompileError> {
    let mut c = Compiler::new(dialect);
    c.push("SELECT COUNT(*) FROM ");
    c.table(table)?;
    c.push(" ");
    c.filter(filter)?;

    Ok(c.finish())
}

/// `SELECT cols FROM table WHERE id_column = <values[0]>`
pub fn select_by_id(
    dialect: Dialect,
    table: &str,
    columns: &[&str],
    id_column: &str,
) -> Result<CompiledQuery, CompileError> {
    let filter = Filter::with_condition(Condition::eq(id_column, Operand::param(0)));

    select(dialect, &Table::new(table), columns, &filter)
}

/// Fallback id lookup for drivers without a last-insert-id primitive.
pub fn last_id(
    dialect: Dialect,
    table: &str,
    id_column: &str,
) -> Result<CompiledQuery, CompileError> {
    let filter = Filter::new()
        .order_by(id_column, Direction::Desc)
        .limit(Operand::literal(1i64));

    select(dialect, &Table::new(table), &[id_column], &filter)
}

/// Single-row insert. Values bind `0..columns.len()`.
pub fn insert(
    dialect: Dialect,
    table: &str,
    id_column: &str,
    columns: &[&str],
) -> Result<CompiledQuery, CompileError> {
    insert_many(dialect, table, id_column, columns, 1)
}

/// Multi-row insert. Record `r`, column `c` binds `values[r * columns + c]`.
pub fn insert_many(
    dialect: Dialect,
    table: &str,
    id_column: &str,
    columns: &[&str],
    records: usize,
) -> Result<CompiledQuery, CompileError> {
    if records == 0 {
        return Err(CompileError::Empty { what: "record batch" });
    }
    let mut c = insert_head(dialect, table, columns)?;

    let returning = dialect.rules().returning();
    if returning == Returning::Output {
        let _ = write!(c, " OUTPUT INSERTED.{id_column}");
    }

    c.push(" VALUES ");
    for record in 0..records {
        if record > 0 {
            c.push(", ");
        }
        c.push("(");
        c.param(
            Param::new(record * columns.len(), Arity::Many(columns.len())),
            ", ",
        );
        c.push(")");
    }

    if returning == Returning::Suffix {
        let _ = write!(c, " RETURNING {id_column}");
    }

    Ok(c.finish())
}

/// Insert-or-update keyed on `id_column`. `values[0]` is the id, followed by
/// one value per entry of `columns`.
pub fn upsert(
    dialect: Dialect,
    table: &str,
    id_column: &str,
    columns: &[&str],
) -> Result<CompiledQuery, CompileError> {
    if columns.is_empty() {
        return Err(CompileError::Empty {
            what: "column list",
        });
    }
    if id_column.trim().is_empty() {
        return Err(CompileError::EmptyField {
            position: "id column",
        });
    }

    let mut all = Vec::with_capacity(columns.len() + 1);
    all.push(id_column);
    all.extend_from_slice(columns);
    let all_params = Param::new(0, Arity::Many(all.len()));

    let c = match dialect.rules().upsert() {
        UpsertStyle::OnConflict => {
            let mut c = insert_head(dialect, table, &all)?;
            c.push(" VALUES (");
            c.param(all_params, ", ");
            let _ = write!(c, ") ON CONFLICT ({id_column}) DO UPDATE SET ");
            write_assignments(&mut c, columns, |col| format!("{col} = EXCLUDED.{col}"));
            let _ = write!(c, " RETURNING {id_column}");
            c
        }
        UpsertStyle::OnDuplicateKey => {
            let mut c = insert_head(dialect, table, &all)?;
            c.push(" VALUES (");
            c.param(all_params, ", ");
            let _ = write!(
                c,
                ") ON DUPLICATE KEY UPDATE {id_column} = LAST_INSERT_ID({id_column}), "
            );
            write_assignments(&mut c, columns, |col| format!("{col} = VALUES({col})"));
            c
        }
        UpsertStyle::Merge => {
            if table.trim().is_empty() {
                return Err(CompileError::EmptyTable);
            }
            let mut c = Compiler::new(dialect);
            let _ = write!(c, "MERGE INTO {table} AS target USING (VALUES (");
            c.param(all_params, ", ");
            c.push(")) AS source (");
            write_columns(&mut c, &all, "")?;
            let _ = write!(
                c,
                ") ON target.{id_column} = source.{id_column} WHEN MATCHED THEN UPDATE SET "
            );
            write_assignments(&mut c, columns, |col| format!("target.{col} = source.{col}"));
            c.push(" WHEN NOT MATCHED THEN INSERT (");
            write_columns(&mut c, &all, "")?;
            c.push(") VALUES (");
            write_columns(&mut c, &all, "source.")?;
            let _ = write!(c, ") OUTPUT INSERTED.{id_column};");
            c
        }
    };

    Ok(c.finish())
}

/// `UPDATE table SET ... WHERE ...`
pub fn update(
    dialect: Dialect,
    table: &Table,
    updates: &Updates,
    filter: &Filter,
) -> Result<CompiledQuery, CompileError> {
    let mut c = Compiler::new(dialect);
    c.push("UPDATE ");
    c.table(table)?;
    c.push(" SET ");
    c.updates(updates)?;
    c.push(" ");
    c.filter(filter)?;

    Ok(c.finish())
}

/// `DELETE FROM table WHERE ...`
pub fn delete(
    dialect: Dialect,
    table: &Table,
    filter: &Filter,
) -> Result<CompiledQuery, CompileError> {
    let mut c = Compiler::new(dialect);
    c.push("DELETE FROM ");
    c.table(table)?;
    c.push(" ");
    c.filter(filter)?;

    Ok(c.finish())
}

/// Mark matching live rows deleted by stamping `column`.
pub fn soft_delete(
    dialect: Dialect,
    table: &Table,
    column: &str,
    filter: &Filter,
) -> Result<CompiledQuery, CompileError> {
    let updates = Updates::new().set(column, Operand::column(SOFT_DELETE_NOW));
    let filter = filter.clone().filter(Condition::is_null(column));

    update(dialect, table, &updates, &filter)
}

/// Stored procedure call binding `values[0..args]`.
pub fn call(
    dialect: Dialect,
    procedure: &str,
    args: usize,
) -> Result<CompiledQuery, CompileError> {
    if procedure.trim().is_empty() {
        return Err(CompileError::Empty {
            what: "procedure name",
        });
    }

    let mut c = Compiler::new(dialect);
    let params = Param::new(0, Arity::Many(args));
    match dialect.rules().call() {
        CallStyle::Call => {
            let _ = write!(c, "CALL {procedure}(");
            c.param(params, ", ");
            c.push(")");
        }
        CallStyle::Exec => {
            let _ = write!(c, "EXEC {procedure}");
            if args > 0 {
                c.push(" ");
                c.param(params, ", ");
            }
        }
    }

    Ok(c.finish())
}

// `INSERT INTO table (cols)`
fn insert_head(
    dialect: Dialect,
    table: &str,
    columns: &[&str],
) -> Result<Compiler, CompileError> {
    if table.trim().is_empty() {
        return Err(CompileError::EmptyTable);
    }
    if columns.is_empty() {
        return Err(CompileError::Empty {
            what: "column list",
        });
    }

    let mut c = Compiler::new(dialect);
    let _ = write!(c, "INSERT INTO {table} (");
    write_columns(&mut c, columns, "")?;
    c.push(")");

    Ok(c)
}

fn write_columns(c: &mut Compiler, columns: &[&str], prefix: &str) -> Result<(), CompileError> {
    for (i, column) in columns.iter().enumerate() {
        if column.trim().is_empty() {
            return Err(CompileError::EmptyField {
                position: "column list",
            });
        }
        if i > 0 {
            c.push(", ");
        }
        c.push(prefix);
        c.push(column);
    }

    Ok(())
}

fn write_assignments(c: &mut Compiler, columns: &[&str], render: impl Fn(&str) -> String) {
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            c.push(", ");
        }
        c.push(&render(column));
    }
}
