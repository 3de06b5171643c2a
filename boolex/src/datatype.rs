//! Datatype capabilities and runtime values.
//!
//! A node advertises the datatypes it can be read as through a [`Datatypes`]
//! capability set; operators validate their operands against it at
//! construction time, never at evaluation time. The runtime counterpart is
//! [`Value`]: the concrete result of reading a node against a context.
//!
//! Sets deserve a note: they are finite, unordered, and collapse duplicates
//! on construction. Nodes are only required to be structurally comparable,
//! not hashable, so [`SetValue`] compares as a multiset instead of relying
//! on hashing.

use bitflags::bitflags;

bitflags! {
    /// The capability set of an operation node.
    ///
    /// A node carrying a tag promises that, given a context, it can produce
    /// a value of that tag's domain. A node may carry several tags at once:
    /// a variable holding a traffic-light state can be read both as a string
    /// and as a boolean.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Datatypes: u8 {
        /// Two-valued truth.
        const BOOLEAN = 1 << 0;
        /// Finite real scalar.
        const NUMBER = 1 << 1;
        /// Sequence of unicode scalar values.
        const STRING = 1 << 2;
        /// Finite unordered collection of operand values.
        const SET = 1 << 3;
    }
}

impl Datatypes {
    /// Human-readable name of a single tag, for error messages.
    pub(crate) fn describe(self) -> &'static str {
        if self == Datatypes::BOOLEAN {
            "boolean"
        } else if self == Datatypes::NUMBER {
            "number"
        } else if self == Datatypes::STRING {
            "string"
        } else if self == Datatypes::SET {
            "set"
        } else {
            "several datatypes"
        }
    }
}

/// A concrete value produced by reading an operation node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    String(String),
    Set(SetValue),
}

impl Value {
    /// The datatype tag this value inhabits.
    pub fn datatype(&self) -> Datatypes {
        match self {
            Value::Boolean(_) => Datatypes::BOOLEAN,
            Value::Number(_) => Datatypes::NUMBER,
            Value::String(_) => Datatypes::STRING,
            Value::Set(_) => Datatypes::SET,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<SetValue> for Value {
    fn from(value: SetValue) -> Self {
        Value::Set(value)
    }
}

/// An unordered, duplicate-free collection of [`Value`]s.
///
/// Backed by a plain vector: values include floats and nested sets, so a
/// hash-based container is out of the question. All operations compare by
/// value equality; construction collapses duplicates.
#[derive(Debug, Clone, Default)]
pub struct SetValue(Vec<Value>);

impl SetValue {
    /// Build a set from `items`, collapsing duplicates.
    pub fn new(items: Vec<Value>) -> Self {
        let mut unique: Vec<Value> = Vec::with_capacity(items.len());
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        SetValue(unique)
    }

    /// Number of distinct elements.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `value` is an element of this set.
    pub fn contains(&self, value: &Value) -> bool {
        self.0.contains(value)
    }

    /// Whether every element of `other` is an element of this set.
    pub fn is_superset_of(&self, other: &SetValue) -> bool {
        other.0.iter().all(|item| self.contains(item))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }
}

impl FromIterator<Value> for SetValue {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        SetValue::new(iter.into_iter().collect())
    }
}

impl PartialEq for SetValue {
    /// Unordered equality. Both sides are duplicate-free, so mutual
    /// inclusion with equal cardinality is enough.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_superset_of(other)
    }
}
