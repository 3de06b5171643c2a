//! Placeholder operands.
//!
//! A placeholder carries a name and a namespace path but is never resolved
//! against a scope: convertible trees keep identifiers symbolic and leave
//! their meaning to the converter. Placeholders claim every datatype so
//! that operator construction never rejects them; checking how an instance
//! is used is the converter's job.

use std::fmt;

use crate::nodes::{NamespacePath, Operation};

fn join_path(path: &NamespacePath) -> String {
    path.join(":")
}

/// An unresolved variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderVariable {
    name: String,
    namespace_path: NamespacePath,
}

impl PlaceholderVariable {
    /// Create a placeholder for `name` inside `namespace_path`. Both are
    /// lower-cased.
    pub fn new(name: impl Into<String>, namespace_path: NamespacePath) -> Self {
        PlaceholderVariable {
            name: name.into().to_lowercase(),
            namespace_path: namespace_path
                .into_iter()
                .map(|segment| segment.to_lowercase())
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace_path(&self) -> &NamespacePath {
        &self.namespace_path
    }
}

impl fmt::Display for PlaceholderVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_path.is_empty() {
            write!(f, "placeholder variable \"{}\"", self.name)
        } else {
            write!(
                f,
                "placeholder variable \"{}\" at namespace \"{}\"",
                self.name,
                join_path(&self.namespace_path)
            )
        }
    }
}

/// An unresolved function call. The arguments are real nodes; only the
/// function itself stays symbolic.
pub struct PlaceholderFunction<C> {
    name: String,
    namespace_path: NamespacePath,
    arguments: Vec<Operation<C>>,
}

impl<C> PlaceholderFunction<C> {
    /// Create a placeholder call of `name` with positional `arguments`.
    pub fn new(
        name: impl Into<String>,
        namespace_path: NamespacePath,
        arguments: Vec<Operation<C>>,
    ) -> Self {
        PlaceholderFunction {
            name: name.into().to_lowercase(),
            namespace_path: namespace_path
                .into_iter()
                .map(|segment| segment.to_lowercase())
                .collect(),
            arguments,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace_path(&self) -> &NamespacePath {
        &self.namespace_path
    }

    pub fn arguments(&self) -> &[Operation<C>] {
        &self.arguments
    }
}

impl<C> PartialEq for PlaceholderFunction<C> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.namespace_path == other.namespace_path
            && self.arguments == other.arguments
    }
}

impl<C> Clone for PlaceholderFunction<C> {
    fn clone(&self) -> Self {
        PlaceholderFunction {
            name: self.name.clone(),
            namespace_path: self.namespace_path.clone(),
            arguments: self.arguments.clone(),
        }
    }
}

impl<C> fmt::Display for PlaceholderFunction<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "placeholder function call \"{}\"(", self.name)?;
        for (index, argument) in self.arguments.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", argument)?;
        }
        write!(f, ")")?;
        if !self.namespace_path.is_empty() {
            write!(f, " at namespace \"{}\"", join_path(&self.namespace_path))?;
        }
        Ok(())
    }
}
