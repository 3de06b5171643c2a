//! Operation nodes.
//!
//! The expression AST is one closed enumeration, [`Operation`]: constants,
//! bound operands, placeholders, and the built-in operators. Nodes are
//! immutable once built; every branch exclusively owns its children. All
//! datatype checking happens when a node is constructed — evaluation only
//! fails on genuine runtime mismatches (a variable producing a value of the
//! wrong kind for the requested reading).
//!
//! The enum is generic over the evaluation context `C`. The crate never
//! looks inside a context; it only routes `&C` into the host hooks declared
//! in [`operands`].

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;
use strum::{EnumDiscriminants, EnumIs};

use crate::datatype::{Datatypes, SetValue, Value};
use crate::error::{BoolexError, BoolexResult};

pub mod constants;
pub mod converters;
pub mod operands;
pub mod operations;
pub mod placeholders;

pub use operands::{Arguments, Function, FunctionCall, Signature, Variable};
pub use operations::{Comparison, Inequality, Operands};
pub use placeholders::{PlaceholderFunction, PlaceholderVariable};

/// Namespace qualification of an identifier, outermost segment first.
///
/// Paths are short in practice (zero to two segments), hence the inline
/// storage.
pub type NamespacePath = SmallVec<[String; 2]>;

/// A node of the expression AST.
#[derive(EnumIs, EnumDiscriminants)]
#[strum_discriminants(name(OperationKind))]
#[strum_discriminants(derive(strum::Display, Hash))]
pub enum Operation<C> {
    /// Constant string.
    String(String),
    /// Constant number.
    Number(f64),
    /// Constant set; each element is itself a node, so this is a branch.
    Set(Vec<Operation<C>>),
    /// A host-defined variable, resolved against a scope.
    Variable(Arc<dyn Variable<C>>),
    /// A call of a host-defined function, with its argument map.
    Function(FunctionCall<C>),
    /// An unresolved variable reference (convertible trees only).
    PlaceholderVariable(PlaceholderVariable),
    /// An unresolved function call (convertible trees only).
    PlaceholderFunction(PlaceholderFunction<C>),

    /// Logical negation.
    Not(Box<Operation<C>>),
    /// Logical conjunction; short-circuits on a false master.
    And(Operands<C>),
    /// Logical inclusive disjunction; short-circuits on a true master.
    Or(Operands<C>),
    /// Logical exclusive disjunction; both sides are always evaluated.
    Xor(Operands<C>),
    /// Equality.
    Equal(Operands<C>),
    /// Negated equality.
    NotEqual(Operands<C>),
    LessThan(Inequality<C>),
    GreaterThan(Inequality<C>),
    LessEqual(Inequality<C>),
    GreaterEqual(Inequality<C>),
    /// Membership of the slave item in the master set.
    BelongsTo(Operands<C>),
    /// Inclusion of the slave set in the master set.
    IsSubset(Operands<C>),
}

impl<C> Operation<C> {
    /// The discriminant of this node, usable as a stable kind name.
    pub fn kind(&self) -> OperationKind {
        self.into()
    }

    /// Leaf nodes contain no other nodes: strings, numbers, bound
    /// variables and placeholder variables. Everything else is a branch.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Operation::String(_)
                | Operation::Number(_)
                | Operation::Variable(_)
                | Operation::PlaceholderVariable(_)
        )
    }

    pub fn is_branch(&self) -> bool {
        !self.is_leaf()
    }

    /// How many immediate children this node has; zero for leaves.
    pub fn arity(&self) -> usize {
        match self {
            Operation::String(_)
            | Operation::Number(_)
            | Operation::Variable(_)
            | Operation::PlaceholderVariable(_) => 0,
            Operation::Set(elements) => elements.len(),
            Operation::Function(call) => call.arguments().len(),
            Operation::PlaceholderFunction(call) => call.arguments().len(),
            Operation::Not(_) => 1,
            _ => 2,
        }
    }

    /// The capability set this node advertises.
    ///
    /// Operators are always boolean; constants carry exactly their own tag;
    /// bound operands answer for themselves; placeholders claim everything,
    /// since checking them is the converter's business.
    pub fn datatypes(&self) -> Datatypes {
        match self {
            Operation::String(_) => Datatypes::STRING,
            Operation::Number(_) => Datatypes::NUMBER,
            Operation::Set(_) => Datatypes::SET,
            Operation::Variable(variable) => variable.datatypes(),
            Operation::Function(call) => call.function().datatypes(),
            Operation::PlaceholderVariable(_) | Operation::PlaceholderFunction(_) => {
                Datatypes::all()
            }
            _ => Datatypes::BOOLEAN,
        }
    }

    /// Read this node as a boolean against `context`.
    pub fn boolean_value(&self, context: &C) -> BoolexResult<bool> {
        match self {
            Operation::Variable(variable) => variable.boolean_value(context),
            Operation::Function(call) => match call.evaluate(context)? {
                Value::Boolean(value) => Ok(value),
                other => Err(call.wrong_result("boolean", &other)),
            },
            Operation::Not(operand) => Ok(!operand.boolean_value(context)?),
            Operation::And(operands) => operands.conjunction(context),
            Operation::Or(operands) => operands.disjunction(context),
            Operation::Xor(operands) => operands.exclusive_disjunction(context),
            Operation::Equal(operands) => operands.equality(context),
            Operation::NotEqual(operands) => Ok(!operands.equality(context)?),
            Operation::LessThan(inequality) | Operation::GreaterThan(inequality) => {
                inequality.compare(context)
            }
            // (x <= y) <=> ~(x > y) and (x >= y) <=> ~(x < y); the stored
            // comparison is already the one being negated.
            Operation::LessEqual(inequality) | Operation::GreaterEqual(inequality) => {
                Ok(!inequality.compare(context)?)
            }
            Operation::BelongsTo(operands) => operands.membership(context),
            Operation::IsSubset(operands) => operands.inclusion(context),
            _ => Err(self.no_reading(Datatypes::BOOLEAN)),
        }
    }

    /// Read this node as a number against `context`.
    pub fn number_value(&self, context: &C) -> BoolexResult<f64> {
        match self {
            Operation::Number(value) => Ok(*value),
            Operation::Variable(variable) => variable.number_value(context),
            Operation::Function(call) => match call.evaluate(context)? {
                Value::Number(value) => Ok(value),
                other => Err(call.wrong_result("number", &other)),
            },
            _ => Err(self.no_reading(Datatypes::NUMBER)),
        }
    }

    /// Read this node as a string against `context`.
    pub fn string_value(&self, context: &C) -> BoolexResult<String> {
        match self {
            Operation::String(value) => Ok(value.clone()),
            Operation::Variable(variable) => variable.string_value(context),
            Operation::Function(call) => match call.evaluate(context)? {
                Value::String(value) => Ok(value),
                other => Err(call.wrong_result("string", &other)),
            },
            _ => Err(self.no_reading(Datatypes::STRING)),
        }
    }

    /// Read this node as a set against `context`.
    pub fn set_value(&self, context: &C) -> BoolexResult<SetValue> {
        match self {
            Operation::Set(elements) => elements
                .iter()
                .map(|element| element.value(context))
                .collect::<BoolexResult<_>>(),
            Operation::Variable(variable) => variable.set_value(context),
            Operation::Function(call) => match call.evaluate(context)? {
                Value::Set(value) => Ok(value),
                other => Err(call.wrong_result("set", &other)),
            },
            _ => Err(self.no_reading(Datatypes::SET)),
        }
    }

    /// Read this node in its preferred datatype.
    ///
    /// This is the reading a slave operand hands to the master's semantic
    /// method: constants yield their own kind, bound operands pick their
    /// natural value, operators yield their truth value.
    pub fn value(&self, context: &C) -> BoolexResult<Value> {
        match self {
            Operation::String(value) => Ok(Value::String(value.clone())),
            Operation::Number(value) => Ok(Value::Number(*value)),
            Operation::Set(_) => Ok(Value::Set(self.set_value(context)?)),
            Operation::Variable(variable) => variable.value(context),
            Operation::Function(call) => call.evaluate(context),
            Operation::PlaceholderVariable(_) | Operation::PlaceholderFunction(_) => {
                Err(BoolexError::InvalidOperation(format!(
                    "{} is a placeholder and cannot be evaluated",
                    self
                )))
            }
            _ => Ok(Value::Boolean(self.boolean_value(context)?)),
        }
    }

    /// Master-side equality: check this node against an already-read slave
    /// value. Bound variables may override the comparison.
    pub(crate) fn equals_value(&self, value: &Value, context: &C) -> BoolexResult<bool> {
        match self {
            Operation::Variable(variable) => variable.equals(value, context),
            _ => Ok(self.value(context)? == *value),
        }
    }

    /// Master-side inequality: is this node less than `value`?
    pub(crate) fn less_than_value(&self, value: f64, context: &C) -> BoolexResult<bool> {
        match self {
            Operation::Variable(variable) => variable.less_than(value, context),
            _ => Ok(self.number_value(context)? < value),
        }
    }

    /// Master-side inequality: is this node greater than `value`?
    pub(crate) fn greater_than_value(&self, value: f64, context: &C) -> BoolexResult<bool> {
        match self {
            Operation::Variable(variable) => variable.greater_than(value, context),
            _ => Ok(self.number_value(context)? > value),
        }
    }

    /// Master-side membership: does this set node contain `value`?
    pub(crate) fn contains_value(&self, value: &Value, context: &C) -> BoolexResult<bool> {
        match self {
            Operation::Variable(variable) => variable.contains(value, context),
            _ => Ok(self.set_value(context)?.contains(value)),
        }
    }

    /// Master-side inclusion: is `value` a subset of this set node?
    pub(crate) fn is_superset_of_value(
        &self,
        value: &SetValue,
        context: &C,
    ) -> BoolexResult<bool> {
        match self {
            Operation::Variable(variable) => variable.is_superset_of(value, context),
            _ => Ok(self.set_value(context)?.is_superset_of(value)),
        }
    }

    /// Whether this node is a constant (its value never depends on the
    /// context). Used when organising the operands of a binary operator.
    pub(crate) fn is_constant(&self) -> bool {
        matches!(
            self,
            Operation::String(_) | Operation::Number(_) | Operation::Set(_)
        )
    }

    /// Whether this node is a variable-like operand: a bound variable or a
    /// bound function call. Placeholders are neither constant nor
    /// variable-like, so convertible trees keep their source order and a
    /// converter that rebuilds the tree reproduces it exactly.
    pub(crate) fn is_variable_like(&self) -> bool {
        matches!(self, Operation::Variable(_) | Operation::Function(_))
    }

    fn no_reading(&self, tag: Datatypes) -> BoolexError {
        BoolexError::InvalidOperation(format!(
            "{} does not support the {} datatype",
            self,
            tag.describe()
        ))
    }
}

/// Unordered equality over node slices. Quadratic, but commutative operands
/// come in pairs and function argument lists are short.
pub(crate) fn multiset_eq<C>(left: &[&Operation<C>], right: &[&Operation<C>]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut used = vec![false; right.len()];
    'outer: for item in left {
        for (index, candidate) in right.iter().enumerate() {
            if !used[index] && *item == *candidate {
                used[index] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

impl<C> PartialEq for Operation<C> {
    /// Structural equality.
    ///
    /// Commutative operators (`And`, `Or`, `Xor`, `Equal`, `NotEqual`)
    /// compare their operand pair unordered; every other branch compares its
    /// children in order. Bound operands compare by identity: two trees
    /// resolved against the same scope share the same host objects.
    fn eq(&self, other: &Self) -> bool {
        use Operation::*;
        match (self, other) {
            (String(left), String(right)) => left == right,
            (Number(left), Number(right)) => left == right,
            (Set(left), Set(right)) => {
                let left: Vec<_> = left.iter().collect();
                let right: Vec<_> = right.iter().collect();
                multiset_eq(&left, &right)
            }
            (Variable(left), Variable(right)) => Arc::ptr_eq(left, right),
            (Function(left), Function(right)) => left == right,
            (PlaceholderVariable(left), PlaceholderVariable(right)) => left == right,
            (PlaceholderFunction(left), PlaceholderFunction(right)) => left == right,
            (Not(left), Not(right)) => left == right,
            (And(left), And(right))
            | (Or(left), Or(right))
            | (Xor(left), Xor(right))
            | (Equal(left), Equal(right))
            | (NotEqual(left), NotEqual(right)) => left.eq_unordered(right),
            (BelongsTo(left), BelongsTo(right)) | (IsSubset(left), IsSubset(right)) => {
                left.eq_ordered(right)
            }
            (LessThan(left), LessThan(right))
            | (GreaterThan(left), GreaterThan(right))
            | (LessEqual(left), LessEqual(right))
            | (GreaterEqual(left), GreaterEqual(right)) => left == right,
            _ => false,
        }
    }
}

impl<C> Clone for Operation<C> {
    fn clone(&self) -> Self {
        use Operation::*;
        match self {
            String(value) => String(value.clone()),
            Number(value) => Number(*value),
            Set(elements) => Set(elements.clone()),
            Variable(variable) => Variable(Arc::clone(variable)),
            Function(call) => Function(call.clone()),
            PlaceholderVariable(placeholder) => PlaceholderVariable(placeholder.clone()),
            PlaceholderFunction(placeholder) => PlaceholderFunction(placeholder.clone()),
            Not(operand) => Not(operand.clone()),
            And(operands) => And(operands.clone()),
            Or(operands) => Or(operands.clone()),
            Xor(operands) => Xor(operands.clone()),
            Equal(operands) => Equal(operands.clone()),
            NotEqual(operands) => NotEqual(operands.clone()),
            LessThan(inequality) => LessThan(inequality.clone()),
            GreaterThan(inequality) => GreaterThan(inequality.clone()),
            LessEqual(inequality) => LessEqual(inequality.clone()),
            GreaterEqual(inequality) => GreaterEqual(inequality.clone()),
            BelongsTo(operands) => BelongsTo(operands.clone()),
            IsSubset(operands) => IsSubset(operands.clone()),
        }
    }
}

impl<C> fmt::Display for Operation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Operation::*;
        match self {
            String(value) => write!(f, "\"{}\"", value),
            Number(value) => write!(f, "{}", value),
            Set(elements) => {
                write!(f, "{{")?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "}}")
            }
            Variable(variable) => write!(f, "variable <{}>", variable.datatypes().describe()),
            Function(call) => write!(f, "{}", call),
            PlaceholderVariable(placeholder) => write!(f, "{}", placeholder),
            PlaceholderFunction(placeholder) => write!(f, "{}", placeholder),
            Not(operand) => write!(f, "Not({})", operand),
            And(operands) => write!(f, "And({})", operands),
            Or(operands) => write!(f, "Or({})", operands),
            Xor(operands) => write!(f, "Xor({})", operands),
            Equal(operands) => write!(f, "Equal({})", operands),
            NotEqual(operands) => write!(f, "NotEqual({})", operands),
            LessThan(inequality) => write!(f, "LessThan({})", inequality),
            GreaterThan(inequality) => write!(f, "GreaterThan({})", inequality),
            LessEqual(inequality) => write!(f, "LessEqual({})", inequality),
            GreaterEqual(inequality) => write!(f, "GreaterEqual({})", inequality),
            BelongsTo(operands) => write!(f, "BelongsTo({})", operands),
            IsSubset(operands) => write!(f, "IsSubset({})", operands),
        }
    }
}

impl<C> fmt::Debug for Operation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self)
    }
}
