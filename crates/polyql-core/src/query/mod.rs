//! Query description: what the caller wants, before any dialect is chosen.

mod condition;
mod filter;
mod operand;
mod table;
mod update;

pub use condition::{Clause, Condition, Op};
pub use filter::{Direction, Filter, SortField};
pub use operand::{Arity, Operand, Param};
pub use table::{Join, JoinKind, Table};
pub use update::{Assignment, Updates};
