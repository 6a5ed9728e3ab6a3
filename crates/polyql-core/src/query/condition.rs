use crate::query::operand::Operand;
use derive_more::Display;
use std::ops::{BitAnd, BitOr, Not};

///
/// Condition
///
/// Schema-agnostic predicate tree. Shape rules (operand presence, boolean
/// arity) are enforced by the compiler, not by construction, so a tree can
/// be assembled incrementally and rejected as a whole.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Clause(Clause),
    And(Vec<Self>),
    Or(Vec<Self>),

    /// Must hold exactly one child.
    Not(Vec<Self>),
}

impl Condition {
    pub fn clause(field: impl Into<String>, op: Op, operand: impl Into<Operand>) -> Self {
        Self::Clause(Clause::new(field, op, Some(operand.into())))
    }

    #[must_use]
    pub const fn and(children: Vec<Self>) -> Self {
        Self::And(children)
    }

    #[must_use]
    pub const fn or(children: Vec<Self>) -> Self {
        Self::Or(children)
    }

    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(child: Self) -> Self {
        Self::Not(vec![child])
    }

    // --- Comparison ---

    pub fn eq(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::clause(field, Op::Eq, operand)
    }

    pub fn ne(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::clause(field, Op::Ne, operand)
    }

    pub fn gt(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::clause(field, Op::Gt, operand)
    }

    pub fn gte(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::clause(field, Op::Gte, operand)
    }

    pub fn lt(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::clause(field, Op::Lt, operand)
    }

    pub fn lte(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::clause(field, Op::Lte, operand)
    }

    // --- Pattern ---

    pub fn like(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::clause(field, Op::Like, operand)
    }

    pub fn not_like(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::clause(field, Op::NotLike, operand)
    }

    pub fn regexp(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::clause(field, Op::Regexp, operand)
    }

    // --- Membership / range ---

    pub fn in_(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::clause(field, Op::In, operand)
    }

    pub fn not_in(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::clause(field, Op::NotIn, operand)
    }

    pub fn between(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::clause(field, Op::Between, operand)
    }

    pub fn not_between(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Self::clause(field, Op::NotBetween, operand)
    }

    // --- Presence ---

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::Clause(Clause::new(field, Op::IsNull, None))
    }

    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::Clause(Clause::new(field, Op::IsNotNull, None))
    }
}

impl BitAnd for Condition {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        // an empty group stays a child so the compiler still rejects it
        match self {
            Self::And(mut children) if !children.is_empty() => {
                children.push(rhs);
                Self::And(children)
            }
            lhs => Self::And(vec![lhs, rhs]),
        }
    }
}

impl BitOr for Condition {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        match self {
            Self::Or(mut children) if !children.is_empty() => {
                children.push(rhs);
                Self::Or(children)
            }
            lhs => Self::Or(vec![lhs, rhs]),
        }
    }
}

impl Not for Condition {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(vec![self])
    }
}

///
/// Clause
///

#[derive(Clone, Debug, PartialEq)]
pub struct Clause {
    pub field: String,
    pub op: Op,
    pub operand: Option<Operand>,
}

impl Clause {
    pub fn new(field: impl Into<String>, op: Op, operand: Option<Operand>) -> Self {
        Self {
            field: field.into(),
            op,
            operand,
        }
    }
}

///
/// Op
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Op {
    #[display("EQ")]
    Eq,
    #[display("NEQ")]
    Ne,
    #[display("GT")]
    Gt,
    #[display("GTE")]
    Gte,
    #[display("LT")]
    Lt,
    #[display("LTE")]
    Lte,
    #[display("LIKE")]
    Like,
    #[display("NOTLIKE")]
    NotLike,
    #[display("REGEXP")]
    Regexp,
    #[display("NOTREGEXP")]
    NotRegexp,
    #[display("IN")]
    In,
    #[display("NOTIN")]
    NotIn,
    #[display("BETWEEN")]
    Between,
    #[display("NOTBETWEEN")]
    NotBetween,
    #[display("ISNULL")]
    IsNull,
    #[display("ISNOTNULL")]
    IsNotNull,
    #[display("EXISTS")]
    Exists,
    #[display("NOTEXISTS")]
    NotExists,
}

impl Op {
    /// Whether the operator needs an operand.
    #[must_use]
    pub const fn takes_operand(self) -> bool {
        !matches!(
            self,
            Self::IsNull | Self::IsNotNull | Self::Exists | Self::NotExists
        )
    }

    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Gt | Self::Gte | Self::Lt | Self::Lte
        )
    }
}
