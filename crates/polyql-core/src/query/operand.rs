use crate::value::Value;

///
/// Operand
///
/// Right-hand side of a clause, an update assignment, or a pagination bound.
/// Exactly one shape is active by construction.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    /// Inlined into the SQL text using the dialect's literal rendering.
    Literal(Value),

    /// Raw column reference or SQL expression. Never quoted, never bound.
    Column(String),

    /// Positional reference into the caller's values array.
    Param(Param),
}

impl Operand {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn column(expr: impl Into<String>) -> Self {
        Self::Column(expr.into())
    }

    /// One placeholder bound to `values[index]`.
    #[must_use]
    pub const fn param(index: usize) -> Self {
        Self::Param(Param::new(index, Arity::One))
    }

    /// Two placeholders bound to `values[index]` and `values[index + 1]`.
    #[must_use]
    pub const fn pair(index: usize) -> Self {
        Self::Param(Param::new(index, Arity::Pair))
    }

    /// `count` placeholders bound to `values[index..index + count]`.
    #[must_use]
    pub const fn params(index: usize, count: usize) -> Self {
        Self::Param(Param::new(index, Arity::Many(count)))
    }

    /// Number of physical placeholders this operand emits.
    #[must_use]
    pub const fn slots(&self) -> usize {
        match self {
            Self::Param(param) => param.arity.slots(),
            Self::Literal(_) | Self::Column(_) => 0,
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl From<Param> for Operand {
    fn from(param: Param) -> Self {
        Self::Param(param)
    }
}

///
/// Param
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Param {
    pub index: usize,
    pub arity: Arity,
}

impl Param {
    #[must_use]
    pub const fn new(index: usize, arity: Arity) -> Self {
        Self { index, arity }
    }

    /// One past the last source index, or `None` when it is not
    /// addressable.
    #[must_use]
    pub const fn end(self) -> Option<usize> {
        self.index.checked_add(self.arity.slots())
    }

    /// Source indices in emission order. The compiler rejects params whose
    /// `end` overflows before allocating them.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        self.index..self.index.saturating_add(self.arity.slots())
    }
}

///
/// Arity
///
/// How many consecutive caller values a param consumes. `Pair` is the
/// explicit two-slot shape used by `BETWEEN`; the operator never widens a
/// one-slot param on its own.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arity {
    One,
    Pair,
    Many(usize),
}

impl Arity {
    #[must_use]
    pub const fn slots(self) -> usize {
        match self {
            Self::One => 1,
            Self::Pair => 2,
            Self::Many(n) => n,
        }
    }
}
