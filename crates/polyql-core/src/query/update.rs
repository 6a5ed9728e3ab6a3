use crate::query::operand::Operand;

///
/// Updates
///
/// Ordered SET-clause assignments.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Updates(pub Vec<Assignment>);

impl Updates {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn set(mut self, field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        self.0.push(Assignment::new(field, Some(operand.into())));
        self
    }

    /// One-slot param assignments for `fields`, starting at `values[start]`.
    pub fn params<'a>(fields: impl IntoIterator<Item = &'a str>, start: usize) -> Self {
        Self(
            fields
                .into_iter()
                .enumerate()
                .map(|(i, field)| Assignment::new(field, Some(Operand::param(start + i))))
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.0.iter()
    }
}

///
/// Assignment
///

#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub field: String,
    pub operand: Option<Operand>,
}

impl Assignment {
    pub fn new(field: impl Into<String>, operand: Option<Operand>) -> Self {
        Self {
            field: field.into(),
            operand,
        }
    }
}
