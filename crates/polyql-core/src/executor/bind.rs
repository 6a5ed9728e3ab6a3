use crate::{executor::ExecutorError, value::Value};

/// Positional arguments for a compiled statement: `values[i]` for each
/// index in placeholder order.
pub(crate) fn resolve(indices: &[usize], values: &[Value]) -> Result<Vec<Value>, ExecutorError> {
    indices
        .iter()
        .map(|&index| {
            values
                .get(index)
                .cloned()
                .ok_or(ExecutorError::BindIndex {
                    index,
                    len: values.len(),
                })
        })
        .collect()
}
