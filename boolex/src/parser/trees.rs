//! Parse trees.
//!
//! Two flavours share the same AST. An [`EvaluableTree`] is truth-evaluated
//! against a context; a [`ConvertibleTree`] is folded through a
//! [`Converter`] into whatever the host needs (an SQL `WHERE` clause, a
//! rendered string, another tree). Both are immutable and reusable across
//! any number of contexts or converters.

use std::fmt;

use crate::datatype::Datatypes;
use crate::error::{BoolexError, BoolexResult};
use crate::nodes::converters::{Converter, convert_node};
use crate::nodes::Operation;

/// A truth-evaluable parse tree.
pub struct EvaluableTree<C> {
    root: Operation<C>,
}

impl<C> EvaluableTree<C> {
    /// Wrap `root`, which must be readable as a boolean.
    pub fn new(root: Operation<C>) -> BoolexResult<Self> {
        if !root.datatypes().contains(Datatypes::BOOLEAN) {
            return Err(BoolexError::InvalidOperation(format!(
                "{} cannot be the root of an evaluable tree: it has no truth value",
                root
            )));
        }
        Ok(EvaluableTree { root })
    }

    /// Evaluate the tree against `context`.
    pub fn evaluate(&self, context: &C) -> BoolexResult<bool> {
        self.root.boolean_value(context)
    }

    pub fn root(&self) -> &Operation<C> {
        &self.root
    }
}

impl<C> PartialEq for EvaluableTree<C> {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl<C> Clone for EvaluableTree<C> {
    fn clone(&self) -> Self {
        EvaluableTree {
            root: self.root.clone(),
        }
    }
}

impl<C> fmt::Debug for EvaluableTree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<parse tree (evaluable) {}>", self.root)
    }
}

/// A convertible parse tree.
pub struct ConvertibleTree<C> {
    root: Operation<C>,
}

impl<C> ConvertibleTree<C> {
    pub fn new(root: Operation<C>) -> Self {
        ConvertibleTree { root }
    }

    /// Fold the tree through `converter`, children first.
    pub fn convert<V>(&self, converter: &mut V) -> BoolexResult<V::Output>
    where
        V: Converter<C> + ?Sized,
    {
        convert_node(&self.root, converter)
    }

    pub fn root(&self) -> &Operation<C> {
        &self.root
    }
}

impl<C> PartialEq for ConvertibleTree<C> {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl<C> Clone for ConvertibleTree<C> {
    fn clone(&self) -> Self {
        ConvertibleTree {
            root: self.root.clone(),
        }
    }
}

impl<C> fmt::Debug for ConvertibleTree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<parse tree (convertible) {}>", self.root)
    }
}
