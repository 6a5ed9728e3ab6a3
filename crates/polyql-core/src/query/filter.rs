use crate::query::{condition::Condition, operand::Operand};
use derive_more::Display;

///
/// Filter
///
/// A condition plus grouping, ordering and pagination.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    pub condition: Option<Condition>,
    pub group_by: Vec<String>,
    pub order_by: Vec<SortField>,
    pub limit: Option<Operand>,
    pub offset: Option<Operand>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_condition(condition: Condition) -> Self {
        Self {
            condition: Some(condition),
            ..Self::default()
        }
    }

    /// Set the root condition, AND-ing with any existing one.
    #[must_use]
    pub fn filter(mut self, condition: Condition) -> Self {
        self.condition = Some(match self.condition.take() {
            Some(existing) => existing & condition,
            None => condition,
        });
        self
    }

    #[must_use]
    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by.push(field.into());
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by.push(SortField::new(field, direction));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: impl Into<Operand>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: impl Into<Operand>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    #[must_use]
    pub const fn is_paginated(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }
}

impl From<Condition> for Filter {
    fn from(condition: Condition) -> Self {
        Self::with_condition(condition)
    }
}

///
/// SortField
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SortField {
    pub field: String,
    pub direction: Direction,
}

impl SortField {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

///
/// Direction
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum Direction {
    #[default]
    #[display("ASC")]
    Asc,
    #[display("DESC")]
    Desc,
}
