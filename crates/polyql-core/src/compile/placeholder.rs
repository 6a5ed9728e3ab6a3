use crate::{compile::dialect::SqlDialect, query::Param};

///
/// Placeholders
///
/// Monotonic ordinal counter threaded through one compilation. Every
/// allocated placeholder records the caller-side value index it binds, in
/// strict emission order, so `indices[n]` always describes the `n`th
/// placeholder in the text.
///

#[derive(Debug, Default)]
pub struct Placeholders {
    next: usize,
    indices: Vec<usize>,
}

impl Placeholders {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: 0,
            indices: Vec::new(),
        }
    }

    /// Allocate one placeholder per slot of `param`, returning the rendered
    /// tokens in emission order.
    pub fn allocate(&mut self, dialect: &dyn SqlDialect, param: Param) -> Vec<String> {
        param
            .indices()
            .map(|index| {
                self.next += 1;
                self.indices.push(index);

                let mut token = String::new();
                dialect.write_placeholder(&mut token, self.next);
                token
            })
            .collect()
    }

    /// Number of placeholders allocated so far.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.next
    }

    #[must_use]
    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }
}
