
use crate::{
    compile::{CompileError, CompiledQuery, Compiler, Dialect},
    query::{Condition, Filter},
};

fn compile_condition(
    dialect: Dialect,
    condition: &Condition,
) -> Result<CompiledQuery, CompileError> {
    let mut c = Compiler::new(dialect);
    c.condition(Some(condition))?;

    Ok(c.finish())
}

fn compile_filter(dialect: Dialect, filter: &Filter) -> Result<CompiledQuery, CompileError> {
    let mut c = Compiler::new(dialect);
    c.filter(filter)?;

    Ok(c.finish())
}

fn pg(condition: &Condition) -> CompiledQuery {
    compile_condition(Dialect::Postgres, condition).expect("condition should compile")
}
