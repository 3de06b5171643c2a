//! Built-in operators.
//!
//! Operators are constructed through the associated functions on
//! [`Operation`]; each constructor validates the capabilities of its
//! operands and organises them into master and slave before the node
//! exists. A node that would be invalid is never built.
//!
//! Membership operations aren't supported on strings: a string is an
//! *ordered* collection of characters, a set an unordered one, and treating
//! one as the other answers the wrong question. Hosts wanting substring or
//! character tests should expose a function for it.

use std::fmt;

use crate::datatype::Datatypes;
use crate::error::{BoolexError, BoolexResult};
use crate::nodes::Operation;

/// The operand pair of a binary operator, already organised.
///
/// The *master* operand is the one whose semantic method (`equals`,
/// `less_than`, `contains`, ...) is invoked; the *slave* is read into a
/// plain value and handed to it. Evaluation order is always master first.
pub struct Operands<C> {
    master: Box<Operation<C>>,
    slave: Box<Operation<C>>,
}

impl<C> Operands<C> {
    fn new(master: Operation<C>, slave: Operation<C>) -> Self {
        Operands {
            master: Box::new(master),
            slave: Box::new(slave),
        }
    }

    pub fn master(&self) -> &Operation<C> {
        &self.master
    }

    pub fn slave(&self) -> &Operation<C> {
        &self.slave
    }

    /// `master AND slave`; the slave is only consulted when the master
    /// holds.
    pub(crate) fn conjunction(&self, context: &C) -> BoolexResult<bool> {
        if !self.master.boolean_value(context)? {
            return Ok(false);
        }
        self.slave.boolean_value(context)
    }

    /// `master OR slave`; the slave is only consulted when the master
    /// fails.
    pub(crate) fn disjunction(&self, context: &C) -> BoolexResult<bool> {
        if self.master.boolean_value(context)? {
            return Ok(true);
        }
        self.slave.boolean_value(context)
    }

    /// `master XOR slave`; both sides are always evaluated.
    pub(crate) fn exclusive_disjunction(&self, context: &C) -> BoolexResult<bool> {
        Ok(self.master.boolean_value(context)? ^ self.slave.boolean_value(context)?)
    }

    /// Equality: the slave is read in its preferred datatype and the master
    /// decides.
    pub(crate) fn equality(&self, context: &C) -> BoolexResult<bool> {
        let value = self.slave.value(context)?;
        self.master.equals_value(&value, context)
    }

    /// Membership: does the master set contain the slave item?
    pub(crate) fn membership(&self, context: &C) -> BoolexResult<bool> {
        let value = self.slave.value(context)?;
        self.master.contains_value(&value, context)
    }

    /// Inclusion: is the slave set a subset of the master set?
    pub(crate) fn inclusion(&self, context: &C) -> BoolexResult<bool> {
        let value = self.slave.set_value(context)?;
        self.master.is_superset_of_value(&value, context)
    }

    /// Ordered comparison, for non-commutative operators.
    pub(crate) fn eq_ordered(&self, other: &Self) -> bool {
        self.master == other.master && self.slave == other.slave
    }

    /// Unordered comparison, for commutative operators.
    pub(crate) fn eq_unordered(&self, other: &Self) -> bool {
        self.eq_ordered(other)
            || (*self.master == *other.slave && *self.slave == *other.master)
    }
}

impl<C> Clone for Operands<C> {
    fn clone(&self) -> Self {
        Operands {
            master: self.master.clone(),
            slave: self.slave.clone(),
        }
    }
}

impl<C> fmt::Display for Operands<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.master, self.slave)
    }
}

/// Direction of an inequality, fixed when the node is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessThan,
    GreaterThan,
}

impl Comparison {
    fn inverted(self) -> Self {
        match self {
            Comparison::LessThan => Comparison::GreaterThan,
            Comparison::GreaterThan => Comparison::LessThan,
        }
    }
}

/// The operand pair of an inequality, with the comparison compiled in.
///
/// When organising the operands swaps them, the comparison direction is
/// inverted so the original semantics survive: `3 < x` becomes
/// "`x` greater-than `3`".
pub struct Inequality<C> {
    master: Box<Operation<C>>,
    slave: Box<Operation<C>>,
    comparison: Comparison,
}

impl<C> Inequality<C> {
    fn new(
        left: Operation<C>,
        right: Operation<C>,
        comparison: Comparison,
    ) -> BoolexResult<Self> {
        let (master, slave, swapped) = organize(left, right);
        require(&master, Datatypes::NUMBER)?;
        let comparison = if swapped {
            comparison.inverted()
        } else {
            comparison
        };
        Ok(Inequality {
            master: Box::new(master),
            slave: Box::new(slave),
            comparison,
        })
    }

    pub fn master(&self) -> &Operation<C> {
        &self.master
    }

    pub fn slave(&self) -> &Operation<C> {
        &self.slave
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// Run the compiled comparison: the slave is read as a number and the
    /// master decides.
    pub(crate) fn compare(&self, context: &C) -> BoolexResult<bool> {
        let value = self.slave.number_value(context)?;
        match self.comparison {
            Comparison::LessThan => self.master.less_than_value(value, context),
            Comparison::GreaterThan => self.master.greater_than_value(value, context),
        }
    }
}

impl<C> PartialEq for Inequality<C> {
    fn eq(&self, other: &Self) -> bool {
        self.comparison == other.comparison
            && self.master == other.master
            && self.slave == other.slave
    }
}

impl<C> Clone for Inequality<C> {
    fn clone(&self) -> Self {
        Inequality {
            master: self.master.clone(),
            slave: self.slave.clone(),
            comparison: self.comparison,
        }
    }
}

impl<C> fmt::Display for Inequality<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.master, self.slave)
    }
}

/// Find the master and slave among a left/right operand pair.
///
/// When exactly one side is a constant and the other a variable-like
/// operand, the variable-like side becomes the master; otherwise the
/// left-hand side stays master. Returns whether the sides were swapped.
fn organize<C>(left: Operation<C>, right: Operation<C>) -> (Operation<C>, Operation<C>, bool) {
    if left.is_constant() && right.is_variable_like() {
        (right, left, true)
    } else {
        (left, right, false)
    }
}

/// Check that `operand` implements `tag`.
fn require<C>(operand: &Operation<C>, tag: Datatypes) -> BoolexResult<()> {
    if operand.datatypes().contains(tag) {
        Ok(())
    } else {
        Err(BoolexError::InvalidOperation(format!(
            "{} does not support the {} datatype",
            operand,
            tag.describe()
        )))
    }
}

impl<C> Operation<C> {
    /// Logical negation of a boolean operand.
    pub fn negation(operand: Operation<C>) -> BoolexResult<Self> {
        require(&operand, Datatypes::BOOLEAN)?;
        Ok(Operation::Not(Box::new(operand)))
    }

    /// Logical conjunction of two boolean operands.
    pub fn conjunction(left: Operation<C>, right: Operation<C>) -> BoolexResult<Self> {
        require(&left, Datatypes::BOOLEAN)?;
        require(&right, Datatypes::BOOLEAN)?;
        Ok(Operation::And(Operands::new(left, right)))
    }

    /// Logical inclusive disjunction of two boolean operands.
    pub fn disjunction(left: Operation<C>, right: Operation<C>) -> BoolexResult<Self> {
        require(&left, Datatypes::BOOLEAN)?;
        require(&right, Datatypes::BOOLEAN)?;
        Ok(Operation::Or(Operands::new(left, right)))
    }

    /// Logical exclusive disjunction of two boolean operands.
    pub fn exclusive_disjunction(left: Operation<C>, right: Operation<C>) -> BoolexResult<Self> {
        require(&left, Datatypes::BOOLEAN)?;
        require(&right, Datatypes::BOOLEAN)?;
        Ok(Operation::Xor(Operands::new(left, right)))
    }

    /// Equality between two operands.
    ///
    /// There is no datatype requirement: the master operand defines what
    /// being equal means.
    pub fn equality(left: Operation<C>, right: Operation<C>) -> BoolexResult<Self> {
        let (master, slave, _) = organize(left, right);
        Ok(Operation::Equal(Operands::new(master, slave)))
    }

    /// Negated equality between two operands.
    pub fn inequality(left: Operation<C>, right: Operation<C>) -> BoolexResult<Self> {
        let (master, slave, _) = organize(left, right);
        Ok(Operation::NotEqual(Operands::new(master, slave)))
    }

    /// `left < right`.
    pub fn less_than(left: Operation<C>, right: Operation<C>) -> BoolexResult<Self> {
        Ok(Operation::LessThan(Inequality::new(
            left,
            right,
            Comparison::LessThan,
        )?))
    }

    /// `left > right`.
    pub fn greater_than(left: Operation<C>, right: Operation<C>) -> BoolexResult<Self> {
        Ok(Operation::GreaterThan(Inequality::new(
            left,
            right,
            Comparison::GreaterThan,
        )?))
    }

    /// `left <= right`, stored as the negation of `left > right`.
    pub fn less_equal(left: Operation<C>, right: Operation<C>) -> BoolexResult<Self> {
        Ok(Operation::LessEqual(Inequality::new(
            left,
            right,
            Comparison::GreaterThan,
        )?))
    }

    /// `left >= right`, stored as the negation of `left < right`.
    pub fn greater_equal(left: Operation<C>, right: Operation<C>) -> BoolexResult<Self> {
        Ok(Operation::GreaterEqual(Inequality::new(
            left,
            right,
            Comparison::LessThan,
        )?))
    }

    /// Membership of `element` in `set`.
    ///
    /// The set side is always the master, regardless of which side is
    /// constant.
    pub fn belongs_to(element: Operation<C>, set: Operation<C>) -> BoolexResult<Self> {
        require(&set, Datatypes::SET)?;
        Ok(Operation::BelongsTo(Operands::new(set, element)))
    }

    /// Inclusion of `subset` in `superset`; both sides must be sets.
    pub fn is_subset(subset: Operation<C>, superset: Operation<C>) -> BoolexResult<Self> {
        require(&superset, Datatypes::SET)?;
        require(&subset, Datatypes::SET)?;
        Ok(Operation::IsSubset(Operands::new(superset, subset)))
    }
}
