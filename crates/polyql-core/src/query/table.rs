use crate::query::condition::Condition;
use derive_more::Display;

///
/// Table
///

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    pub name: String,
    pub alias: Option<String>,
    pub joins: Vec<Join>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            joins: Vec::new(),
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn join(mut self, kind: JoinKind, table: Self, on: Condition) -> Self {
        self.joins.push(Join { kind, table, on });
        self
    }
}

impl From<&str> for Table {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

///
/// Join
///

#[derive(Clone, Debug, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: Table,
    pub on: Condition,
}

///
/// JoinKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum JoinKind {
    #[display("INNER JOIN")]
    Inner,
    #[display("LEFT JOIN")]
    Left,
    #[display("RIGHT JOIN")]
    Right,
    #[display("FULL JOIN")]
    Full,
}
