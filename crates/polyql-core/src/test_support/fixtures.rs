use crate::{
    driver::Row,
    record::{Record, ScanError},
    value::Value,
};

fn int(row: &Row, column: &str) -> Result<i64, ScanError> {
    match ScanError::column(row, column)? {
        Value::Int(n) => Ok(*n),
        other => Err(ScanError::mismatch(column, "int", other)),
    }
}

fn text(row: &Row, column: &str) -> Result<String, ScanError> {
    match ScanError::column(row, column)? {
        Value::Text(s) => Ok(s.clone()),
        other => Err(ScanError::mismatch(column, "text", other)),
    }
}

fn id_from(value: &Value) -> Result<i64, ScanError> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Uint(n) => i64::try_from(*n).map_err(|_| ScanError::mismatch("id", "int", value)),
        other => Err(ScanError::mismatch("id", "int", other)),
    }
}

///
/// User
///

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) email: String,
}

impl User {
    pub(crate) fn new(name: &str, email: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            email: email.to_string(),
        }
    }
}

impl Record for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &["name", "email"];

    fn id(&self) -> Value {
        Value::Int(self.id)
    }

    fn set_id(&mut self, id: Value) -> Result<(), ScanError> {
        self.id = id_from(&id)?;
        Ok(())
    }

    fn values(&self) -> Vec<Value> {
        vec![self.name.clone().into(), self.email.clone().into()]
    }

    fn scan(&mut self, row: &Row) -> Result<(), ScanError> {
        self.id = int(row, "id")?;
        self.name = text(row, "name")?;
        self.email = text(row, "email")?;
        Ok(())
    }
}

///
/// Note
/// Soft-deletable record.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Note {
    pub(crate) id: i64,
    pub(crate) body: String,
}

impl Record for Note {
    const TABLE: &'static str = "notes";
    const COLUMNS: &'static [&'static str] = &["body"];
    const SOFT_DELETE_COLUMN: Option<&'static str> = Some("deleted_at");

    fn id(&self) -> Value {
        Value::Int(self.id)
    }

    fn set_id(&mut self, id: Value) -> Result<(), ScanError> {
        self.id = id_from(&id)?;
        Ok(())
    }

    fn values(&self) -> Vec<Value> {
        vec![self.body.clone().into()]
    }

    fn scan(&mut self, row: &Row) -> Result<(), ScanError> {
        self.id = int(row, "id")?;
        self.body = text(row, "body")?;
        Ok(())
    }
}
