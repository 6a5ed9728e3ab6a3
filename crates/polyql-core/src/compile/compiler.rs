use crate::{
    compile::{
        CompileError, CompiledQuery,
        dialect::{Dialect, Pagination, SqlDialect},
        placeholder::Placeholders,
    },
    query::{Clause, Condition, Filter, Op, Operand, Param, Table, Updates},
    value::Value,
};
use std::fmt::Write;
use time::format_description::well_known::Rfc3339;

/// Always-true predicate emitted for an absent root condition.
const TRUE_PREDICATE: &str = "1=1";

///
/// Compiler
///
/// Single-pass writer shared by every dialect. Text and placeholder
/// allocation advance together; nothing is emitted out of order, so the
/// index list is correct by construction.
///

pub struct Compiler {
    dialect: &'static dyn SqlDialect,
    sql: String,
    placeholders: Placeholders,
}

impl Compiler {
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect: dialect.rules(),
            sql: String::new(),
            placeholders: Placeholders::new(),
        }
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect.dialect()
    }

    pub fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    #[must_use]
    pub fn finish(self) -> CompiledQuery {
        CompiledQuery {
            sql: self.sql,
            indices: self.placeholders.into_indices(),
        }
    }

    /// Write the placeholders for `param`, separated by `sep`.
    pub fn param(&mut self, param: Param, sep: &str) {
        let tokens = self.placeholders.allocate(self.dialect, param);
        self.sql.push_str(&tokens.join(sep));
    }

    // ---------------------------------------------------------------------
    // Condition
    // ---------------------------------------------------------------------

    /// Compile a condition tree; `None` compiles to an always-true predicate.
    pub fn condition(&mut self, condition: Option<&Condition>) -> Result<(), CompileError> {
        match condition {
            Some(condition) => self.node(condition),
            None => {
                self.push(TRUE_PREDICATE);
                Ok(())
            }
        }
    }

    fn node(&mut self, condition: &Condition) -> Result<(), CompileError> {
        match condition {
            Condition::Clause(clause) => self.clause(clause),
            Condition::And(children) => self.group("AND", children),
            Condition::Or(children) => self.group("OR", children),
            Condition::Not(children) => {
                let [child] = children.as_slice() else {
                    return Err(CompileError::NotArity {
                        found: children.len(),
                    });
                };
                self.push("NOT (");
                self.node(child)?;
                self.push(")");
                Ok(())
            }
        }
    }

    fn group(&mut self, logic: &'static str, children: &[Condition]) -> Result<(), CompileError> {
        if children.is_empty() {
            return Err(CompileError::EmptyGroup { logic });
        }

        self.push("(");
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                let _ = write!(self.sql, " {logic} ");
            }
            self.node(child)?;
        }
        self.push(")");

        Ok(())
    }

    fn clause(&mut self, clause: &Clause) -> Result<(), CompileError> {
        let Clause { field, op, operand } = clause;
        let op = *op;

        if field.trim().is_empty() {
            return Err(CompileError::EmptyField { position: "clause" });
        }

        let operand = match (op.takes_operand(), operand) {
            (true, Some(operand)) => Some(operand),
            (true, None) => {
                return Err(CompileError::MissingOperand {
                    field: field.clone(),
                    op,
                });
            }
            (false, Some(_)) => {
                return Err(CompileError::UnexpectedOperand {
                    field: field.clone(),
                    op,
                });
            }
            (false, None) => None,
        };

        match (op, operand) {
            (Op::IsNull, _) => {
                let _ = write!(self.sql, "{field} IS NULL");
                Ok(())
            }
            (Op::IsNotNull, _) => {
                let _ = write!(self.sql, "{field} IS NOT NULL");
                Ok(())
            }
            (Op::Exists | Op::NotExists, _) => {
                Err(CompileError::unsupported(self.dialect(), op.to_string()))
            }
            (_, None) => Err(CompileError::MissingOperand {
                field: field.clone(),
                op,
            }),
            (op, Some(operand)) if op.is_comparison() => {
                let keyword = comparison_keyword(op);
                let _ = write!(self.sql, "{field} {keyword} ");
                self.scalar_operand(field, op, operand)
            }
            (Op::Like | Op::NotLike, Some(operand)) => {
                let keyword = if op == Op::Like { "LIKE" } else { "NOT LIKE" };
                let _ = write!(self.sql, "{field} {keyword} ");
                self.pattern_operand(field, op, operand)
            }
            (Op::Regexp | Op::NotRegexp, Some(operand)) => {
                let keyword = self
                    .dialect
                    .regexp_keyword(op == Op::NotRegexp)
                    .ok_or_else(|| CompileError::unsupported(self.dialect(), op.to_string()))?;
                let _ = write!(self.sql, "{field} {keyword} ");
                self.pattern_operand(field, op, operand)
            }
            (Op::In | Op::NotIn, Some(operand)) => {
                let keyword = if op == Op::In { "IN" } else { "NOT IN" };
                let _ = write!(self.sql, "{field} {keyword} (");
                self.list_operand(field, op, operand)?;
                self.push(")");
                Ok(())
            }
            (Op::Between | Op::NotBetween, Some(operand)) => {
                let keyword = if op == Op::Between {
                    "BETWEEN"
                } else {
                    "NOT BETWEEN"
                };
                let _ = write!(self.sql, "({field} {keyword} ");
                self.range_operand(field, op, operand)?;
                self.push(")");
                Ok(())
            }
            (op, Some(_)) => Err(CompileError::invalid_operand(
                field,
                op,
                "operator has no SQL form",
            )),
        }
    }

    // ---------------------------------------------------------------------
    // Operands
    // ---------------------------------------------------------------------

    /// Comparison / assignment operand: scalar literal, column, or one slot.
    fn scalar_operand(
        &mut self,
        field: &str,
        op: Op,
        operand: &Operand,
    ) -> Result<(), CompileError> {
        match operand {
            Operand::Literal(Value::List(_)) => Err(CompileError::invalid_operand(
                field,
                op,
                "list literal is not a scalar",
            )),
            Operand::Literal(value) => self.literal(field, op, value),
            Operand::Column(expr) => self.column(field, op, expr),
            Operand::Param(param) => {
                expect_slots(field, op, *param, 1)?;
                self.param(*param, ", ");
                Ok(())
            }
        }
    }

    fn pattern_operand(
        &mut self,
        field: &str,
        op: Op,
        operand: &Operand,
    ) -> Result<(), CompileError> {
        match operand {
            Operand::Literal(Value::Text(pattern)) if pattern.is_empty() => Err(
                CompileError::invalid_operand(field, op, "pattern is an empty string"),
            ),
            Operand::Literal(value @ Value::Text(_)) => self.literal(field, op, value),
            Operand::Literal(value) => Err(CompileError::invalid_operand(
                field,
                op,
                format!("pattern must be text, got {}", value.kind()),
            )),
            Operand::Column(_) => Err(CompileError::invalid_operand(
                field,
                op,
                "pattern cannot be a column reference",
            )),
            Operand::Param(param) => {
                expect_slots(field, op, *param, 1)?;
                self.param(*param, ", ");
                Ok(())
            }
        }
    }

    fn list_operand(
        &mut self,
        field: &str,
        op: Op,
        operand: &Operand,
    ) -> Result<(), CompileError> {
        match operand {
            Operand::Literal(Value::List(items)) if items.is_empty() => {
                Err(CompileError::invalid_operand(field, op, "value list is empty"))
            }
            Operand::Literal(Value::List(items)) => self.literal_items(field, op, items, ", "),
            Operand::Param(param) if param.arity.slots() == 0 => Err(
                CompileError::invalid_operand(field, op, "param binds zero values"),
            ),
            Operand::Param(param) => {
                expect_addressable(field, op, *param)?;
                self.param(*param, ", ");
                Ok(())
            }
            Operand::Literal(value) => Err(CompileError::invalid_operand(
                field,
                op,
                format!("expected a value list, got {}", value.kind()),
            )),
            Operand::Column(_) => Err(CompileError::invalid_operand(
                field,
                op,
                "value list cannot be a column reference",
            )),
        }
    }

    fn range_operand(
        &mut self,
        field: &str,
        op: Op,
        operand: &Operand,
    ) -> Result<(), CompileError> {
        match operand {
            Operand::Literal(Value::List(items)) if items.len() == 2 => {
                self.literal_items(field, op, items, " AND ")
            }
            Operand::Literal(value) => Err(CompileError::invalid_operand(
                field,
                op,
                format!("expected a two-value list, got {}", describe(value)),
            )),
            Operand::Param(param) => {
                expect_slots(field, op, *param, 2)?;
                self.param(*param, " AND ");
                Ok(())
            }
            Operand::Column(_) => Err(CompileError::invalid_operand(
                field,
                op,
                "range bounds cannot be a column reference",
            )),
        }
    }

    fn literal_items(
        &mut self,
        field: &str,
        op: Op,
        items: &[Value],
        sep: &str,
    ) -> Result<(), CompileError> {
        for (i, item) in items.iter().enumerate() {
            if item.is_list() {
                return Err(CompileError::invalid_operand(
                    field,
                    op,
                    "nested value lists are not allowed",
                ));
            }
            if i > 0 {
                self.push(sep);
            }
            self.literal(field, op, item)?;
        }

        Ok(())
    }

    fn column(&mut self, field: &str, op: Op, expr: &str) -> Result<(), CompileError> {
        if expr.trim().is_empty() {
            return Err(CompileError::invalid_operand(
                field,
                op,
                "column reference is empty",
            ));
        }
        self.push(expr);

        Ok(())
    }

    fn literal(&mut self, field: &str, op: Op, value: &Value) -> Result<(), CompileError> {
        match value {
            Value::Null => self.push("NULL"),
            Value::Bool(b) => self.push(self.dialect.bool_literal(*b)),
            Value::Int(v) => {
                let _ = write!(self.sql, "{v}");
            }
            Value::Uint(v) => {
                let _ = write!(self.sql, "{v}");
            }
            Value::Float(v) if v.is_finite() => {
                let _ = write!(self.sql, "{v}");
            }
            Value::Float(_) => {
                return Err(CompileError::invalid_operand(
                    field,
                    op,
                    "non-finite float literal",
                ));
            }
            Value::Text(s) => write_quoted(&mut self.sql, s),
            Value::Timestamp(ts) => {
                let text = ts.format(&Rfc3339).map_err(|err| {
                    CompileError::invalid_operand(field, op, format!("timestamp literal: {err}"))
                })?;
                write_quoted(&mut self.sql, &text);
            }
            Value::Blob(bytes) => self.dialect.write_blob(&mut self.sql, bytes),
            Value::List(items) => self.literal_items(field, op, items, ", ")?,
        }

        Ok(())
    }

    // ---------------------------------------------------------------------
    // Filter
    // ---------------------------------------------------------------------

    /// `WHERE ... [GROUP BY ...] [ORDER BY ...] [pagination]`
    pub fn filter(&mut self, filter: &Filter) -> Result<(), CompileError> {
        self.push("WHERE ");
        self.condition(filter.condition.as_ref())?;

        if !filter.group_by.is_empty() {
            // bare list: Postgres reads "GROUP BY (a, b)" as one row-valued key
            self.push(" GROUP BY ");
            for (i, field) in filter.group_by.iter().enumerate() {
                if field.trim().is_empty() {
                    return Err(CompileError::EmptyField {
                        position: "GROUP BY",
                    });
                }
                if i > 0 {
                    self.push(", ");
                }
                self.push(field);
            }
        }

        let pagination = self.dialect.pagination();
        let synthesize_order = pagination == Pagination::OffsetFetch
            && filter.is_paginated()
            && filter.order_by.is_empty();

        if synthesize_order {
            self.push(" ORDER BY (SELECT NULL)");
        } else if !filter.order_by.is_empty() {
            self.push(" ORDER BY ");
            for (i, sort) in filter.order_by.iter().enumerate() {
                if sort.field.trim().is_empty() {
                    return Err(CompileError::EmptyField {
                        position: "ORDER BY",
                    });
                }
                if i > 0 {
                    self.push(", ");
                }
                let _ = write!(self.sql, "{} {}", sort.field, sort.direction);
            }
        }

        match pagination {
            Pagination::LimitOffset { offset_only_limit } => {
                match (&filter.limit, &filter.offset) {
                    (Some(limit), _) => {
                        self.push(" LIMIT ");
                        self.bound("limit", limit, 1)?;
                    }
                    (None, Some(_)) => {
                        if let Some(max) = offset_only_limit {
                            let _ = write!(self.sql, " LIMIT {max}");
                        }
                    }
                    (None, None) => {}
                }
                if let Some(offset) = &filter.offset {
                    self.push(" OFFSET ");
                    self.bound("offset", offset, 0)?;
                }
            }
            Pagination::OffsetFetch => {
                if filter.is_paginated() {
                    self.push(" OFFSET ");
                    match &filter.offset {
                        Some(offset) => self.bound("offset", offset, 0)?,
                        None => self.push("0"),
                    }
                    self.push(" ROWS");
                }
                if let Some(limit) = &filter.limit {
                    self.push(" FETCH NEXT ");
                    self.bound("limit", limit, 1)?;
                    self.push(" ROWS ONLY");
                }
            }
        }

        Ok(())
    }

    // Limit/offset operand: integer literal >= `min`, or a one-slot param.
    fn bound(
        &mut self,
        bound: &'static str,
        operand: &Operand,
        min: i64,
    ) -> Result<(), CompileError> {
        match operand {
            Operand::Literal(value) => {
                let n = value.as_i64().ok_or_else(|| CompileError::InvalidPagination {
                    bound,
                    reason: format!("expected an integer, got {}", value.kind()),
                })?;
                if n < min {
                    return Err(CompileError::InvalidPagination {
                        bound,
                        reason: format!("{n} is below the minimum of {min}"),
                    });
                }
                let _ = write!(self.sql, "{n}");
                Ok(())
            }
            Operand::Param(param) if param.arity.slots() == 1 => {
                if param.end().is_none() {
                    return Err(CompileError::InvalidPagination {
                        bound,
                        reason: format!("param index {} is out of range", param.index),
                    });
                }
                self.param(*param, ", ");
                Ok(())
            }
            Operand::Param(param) => Err(CompileError::InvalidPagination {
                bound,
                reason: format!("param must bind one value, binds {}", param.arity.slots()),
            }),
            Operand::Column(_) => Err(CompileError::InvalidPagination {
                bound,
                reason: "column references are not allowed".to_string(),
            }),
        }
    }

    // ---------------------------------------------------------------------
    // Table / Updates
    // ---------------------------------------------------------------------

    /// `name [AS alias] [JOIN other [AS alias] ON cond]...`
    pub fn table(&mut self, table: &Table) -> Result<(), CompileError> {
        if table.name.trim().is_empty() {
            return Err(CompileError::EmptyTable);
        }

        self.push(&table.name);
        if let Some(alias) = &table.alias {
            let _ = write!(self.sql, " AS {alias}");
        }

        for join in &table.joins {
            if !self.dialect.supports_join(join.kind) {
                return Err(CompileError::unsupported(
                    self.dialect(),
                    join.kind.to_string(),
                ));
            }
            let _ = write!(self.sql, " {} ", join.kind);
            self.table(&join.table)?;
            self.push(" ON ");
            self.node(&join.on)?;
        }

        Ok(())
    }

    /// `field = operand, ...`
    pub fn updates(&mut self, updates: &Updates) -> Result<(), CompileError> {
        if updates.is_empty() {
            return Err(CompileError::Empty {
                what: "update list",
            });
        }

        for (i, assignment) in updates.iter().enumerate() {
            if assignment.field.trim().is_empty() {
                return Err(CompileError::EmptyField { position: "SET" });
            }
            let Some(operand) = &assignment.operand else {
                return Err(CompileError::MissingUpdateValue {
                    field: assignment.field.clone(),
                });
            };
            if i > 0 {
                self.push(", ");
            }
            let _ = write!(self.sql, "{} = ", assignment.field);
            self.scalar_operand(&assignment.field, Op::Eq, operand)?;
        }

        Ok(())
    }
}

const fn comparison_keyword(op: Op) -> &'static str {
    match op {
        Op::Ne => "<>",
        Op::Gt => ">",
        Op::Gte => ">=",
        Op::Lt => "<",
        Op::Lte => "<=",
        _ => "=",
    }
}

fn expect_slots(field: &str, op: Op, param: Param, slots: usize) -> Result<(), CompileError> {
    let found = param.arity.slots();
    if found == slots {
        expect_addressable(field, op, param)
    } else {
        Err(CompileError::invalid_operand(
            field,
            op,
            format!("param must bind {slots} value(s), binds {found}"),
        ))
    }
}

fn expect_addressable(field: &str, op: Op, param: Param) -> Result<(), CompileError> {
    match param.end() {
        Some(_) => Ok(()),
        None => Err(CompileError::invalid_operand(
            field,
            op,
            format!(
                "param index {} with {} slot(s) is out of range",
                param.index,
                param.arity.slots()
            ),
        )),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::List(items) => format!("{}-value list", items.len()),
        other => other.kind().to_string(),
    }
}

fn write_quoted(out: &mut String, text: &str) {
    out.push('\'');
    for c in text.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
}

impl Write for Compiler {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.push(s);
        Ok(())
    }
}
