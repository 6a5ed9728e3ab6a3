//! Scripted driver shared by the integration tests.

use parking_lot::Mutex;
use polyql::{
    __reexports::async_trait::async_trait,
    core::driver::{Connection, DriverError, ExecSummary, Row, Session, Stmt, Transaction},
    prelude::*,
};
use std::{collections::VecDeque, sync::Arc};

///
/// Script
///

#[derive(Default)]
pub struct Script {
    pub sql: Vec<String>,
    pub args: Vec<Vec<Value>>,
    pub rows: VecDeque<Vec<Row>>,
    pub affected: VecDeque<u64>,
    pub prepared: Vec<String>,
    pub closed: bool,
}

#[derive(Clone, Default)]
pub struct ScriptedConnection {
    pub script: Arc<Mutex<Script>>,
}

impl ScriptedConnection {
    pub fn rows(&self, rows: Vec<Row>) -> &Self {
        self.script.lock().rows.push_back(rows);
        self
    }

    pub fn affected(&self, n: u64) -> &Self {
        self.script.lock().affected.push_back(n);
        self
    }

    pub fn sql(&self) -> Vec<String> {
        self.script.lock().sql.clone()
    }

    fn run(&self, stmt: Stmt<'_, String>, args: &[Value]) -> Result<(), DriverError> {
        let mut script = self.script.lock();
        if script.closed {
            return Err(DriverError::ConnectionClosed);
        }
        let sql = match stmt {
            Stmt::Text(sql) => sql.to_string(),
            Stmt::Prepared(sql) => sql.clone(),
        };
        script.sql.push(sql);
        script.args.push(args.to_vec());

        Ok(())
    }
}

pub fn row(cells: &[(&str, Value)]) -> Row {
    let columns: Arc<[String]> = cells.iter().map(|(c, _)| (*c).to_string()).collect();

    Row::new(columns, cells.iter().map(|(_, v)| v.clone()).collect())
}

#[async_trait]
impl Session for ScriptedConnection {
    type Statement = String;

    async fn prepare(&self, sql: &str) -> Result<String, DriverError> {
        self.script.lock().prepared.push(sql.to_string());

        Ok(sql.to_string())
    }

    async fn exec(&self, stmt: Stmt<'_, String>, args: &[Value]) -> Result<ExecSummary, DriverError> {
        self.run(stmt, args)?;
        let rows_affected = self.script.lock().affected.pop_front().unwrap_or(1);

        Ok(ExecSummary {
            rows_affected,
            last_insert_id: None,
        })
    }

    async fn query(
        &self,
        stmt: Stmt<'_, String>,
        args: &[Value],
    ) -> Result<Vec<Row>, DriverError> {
        self.run(stmt, args)?;

        Ok(self.script.lock().rows.pop_front().unwrap_or_default())
    }

    async fn query_row(&self, stmt: Stmt<'_, String>, args: &[Value]) -> Result<Row, DriverError> {
        self.query(stmt, args)
            .await?
            .into_iter()
            .next()
            .ok_or(DriverError::NoRows)
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    type Transaction = Self;

    async fn ping(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.script.lock().closed = true;
        Ok(())
    }

    async fn close_statement(&self, _stmt: &String) -> Result<(), DriverError> {
        Ok(())
    }

    async fn begin(&self) -> Result<Self, DriverError> {
        Ok(self.clone())
    }
}

#[async_trait]
impl Transaction for ScriptedConnection {
    async fn commit(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn rollback(&self) -> Result<(), DriverError> {
        Ok(())
    }
}

///
/// Account
///

#[derive(Debug, Default, PartialEq)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub balance: i64,
}

impl Account {
    pub fn new(owner: &str, balance: i64) -> Self {
        Self {
            id: 0,
            owner: owner.to_string(),
            balance,
        }
    }
}

impl Record for Account {
    const TABLE: &'static str = "accounts";
    const COLUMNS: &'static [&'static str] = &["owner", "balance"];
    const SOFT_DELETE_COLUMN: Option<&'static str> = Some("closed_at");

    fn id(&self) -> Value {
        Value::Int(self.id)
    }

    fn set_id(&mut self, id: Value) -> Result<(), ScanError> {
        self.id = id.as_i64().ok_or_else(|| ScanError::mismatch("id", "int", &id))?;
        Ok(())
    }

    fn values(&self) -> Vec<Value> {
        vec![self.owner.clone().into(), self.balance.into()]
    }

    fn scan(&mut self, row: &Row) -> Result<(), ScanError> {
        let int = |name: &str| {
            let value = ScanError::column(row, name)?;
            value.as_i64().ok_or_else(|| ScanError::mismatch(name, "int", value))
        };
        self.id = int("id")?;
        self.balance = int("balance")?;
        self.owner = ScanError::column(row, "owner")?
            .as_text()
            .map(str::to_string)
            .ok_or_else(|| ScanError::MissingColumn("owner".to_string()))?;

        Ok(())
    }
}
