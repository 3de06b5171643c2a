//! Constant nodes.
//!
//! Constants don't rely on the context — they are constant. There are no
//! user-defined constant kinds: hosts that want a *named* constant bind one
//! of these to a name in a scope.

use crate::nodes::Operation;

impl<C> Operation<C> {
    /// Constant string.
    pub fn string(value: impl Into<String>) -> Self {
        Operation::String(value.into())
    }

    /// Constant number.
    pub fn number(value: f64) -> Self {
        Operation::Number(value)
    }

    /// Constant set. Structurally equal elements collapse into one.
    pub fn set(elements: Vec<Operation<C>>) -> Self {
        let mut unique: Vec<Operation<C>> = Vec::with_capacity(elements.len());
        for element in elements {
            if !unique.iter().any(|existing| *existing == element) {
                unique.push(element);
            }
        }
        Operation::Set(unique)
    }
}
