use crate::value::Value;
use std::sync::Arc;

///
/// Row
///
/// One result row. Column names are shared by every row of a result set.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    #[must_use]
    pub const fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of the column called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        let pos = self.columns.iter().position(|c| c == name)?;
        self.values.get(pos)
    }

    #[must_use]
    pub fn get_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
