//! Parse tree converters.
//!
//! A converter turns a convertible tree into an output of the host's
//! choice — an SQL predicate, a rendered string, another AST. It is a
//! visitor with one callback per convertible node variant; the traversal is
//! a post-order fold, so every callback receives the already-converted
//! children. Binary operators hand their children over master first, then
//! slave: the converter observes the organised order, not the source
//! order.
//!
//! Converters may be stateful; every callback takes `&mut self`.

use crate::error::{BoolexError, BoolexResult};
use crate::nodes::Operation;

/// A parse tree converter producing `Output` values.
pub trait Converter<C> {
    type Output;

    fn string(&mut self, text: &str) -> BoolexResult<Self::Output>;

    fn number(&mut self, value: f64) -> BoolexResult<Self::Output>;

    fn set(&mut self, elements: Vec<Self::Output>) -> BoolexResult<Self::Output>;

    fn variable(&mut self, name: &str, namespace_path: &[String])
    -> BoolexResult<Self::Output>;

    fn function(
        &mut self,
        name: &str,
        namespace_path: &[String],
        arguments: Vec<Self::Output>,
    ) -> BoolexResult<Self::Output>;

    fn not(&mut self, operand: Self::Output) -> BoolexResult<Self::Output>;

    fn and(&mut self, master: Self::Output, slave: Self::Output)
    -> BoolexResult<Self::Output>;

    fn or(&mut self, master: Self::Output, slave: Self::Output) -> BoolexResult<Self::Output>;

    fn xor(&mut self, master: Self::Output, slave: Self::Output)
    -> BoolexResult<Self::Output>;

    fn equal(&mut self, master: Self::Output, slave: Self::Output)
    -> BoolexResult<Self::Output>;

    fn not_equal(
        &mut self,
        master: Self::Output,
        slave: Self::Output,
    ) -> BoolexResult<Self::Output>;

    fn less_than(
        &mut self,
        master: Self::Output,
        slave: Self::Output,
    ) -> BoolexResult<Self::Output>;

    fn greater_than(
        &mut self,
        master: Self::Output,
        slave: Self::Output,
    ) -> BoolexResult<Self::Output>;

    fn less_equal(
        &mut self,
        master: Self::Output,
        slave: Self::Output,
    ) -> BoolexResult<Self::Output>;

    fn greater_equal(
        &mut self,
        master: Self::Output,
        slave: Self::Output,
    ) -> BoolexResult<Self::Output>;

    fn belongs_to(
        &mut self,
        master: Self::Output,
        slave: Self::Output,
    ) -> BoolexResult<Self::Output>;

    fn is_subset(
        &mut self,
        master: Self::Output,
        slave: Self::Output,
    ) -> BoolexResult<Self::Output>;
}

/// Fold `node` through `converter`, children first.
pub fn convert_node<C, V>(node: &Operation<C>, converter: &mut V) -> BoolexResult<V::Output>
where
    V: Converter<C> + ?Sized,
{
    match node {
        Operation::String(text) => converter.string(text),
        Operation::Number(value) => converter.number(*value),
        Operation::Set(elements) => {
            let mut converted = Vec::with_capacity(elements.len());
            for element in elements {
                converted.push(convert_node(element, converter)?);
            }
            converter.set(converted)
        }
        Operation::PlaceholderVariable(placeholder) => {
            converter.variable(placeholder.name(), placeholder.namespace_path())
        }
        Operation::PlaceholderFunction(placeholder) => {
            let mut converted = Vec::with_capacity(placeholder.arguments().len());
            for argument in placeholder.arguments() {
                converted.push(convert_node(argument, converter)?);
            }
            converter.function(placeholder.name(), placeholder.namespace_path(), converted)
        }
        // Bound operands belong to evaluable trees; the converter contract
        // has no callback for them.
        Operation::Variable(_) | Operation::Function(_) => Err(BoolexError::Conversion(
            format!("unknown tree node: {}", node),
        )),
        Operation::Not(operand) => {
            let operand = convert_node(operand, converter)?;
            converter.not(operand)
        }
        Operation::And(operands) => {
            let master = convert_node(operands.master(), converter)?;
            let slave = convert_node(operands.slave(), converter)?;
            converter.and(master, slave)
        }
        Operation::Or(operands) => {
            let master = convert_node(operands.master(), converter)?;
            let slave = convert_node(operands.slave(), converter)?;
            converter.or(master, slave)
        }
        Operation::Xor(operands) => {
            let master = convert_node(operands.master(), converter)?;
            let slave = convert_node(operands.slave(), converter)?;
            converter.xor(master, slave)
        }
        Operation::Equal(operands) => {
            let master = convert_node(operands.master(), converter)?;
            let slave = convert_node(operands.slave(), converter)?;
            converter.equal(master, slave)
        }
        Operation::NotEqual(operands) => {
            let master = convert_node(operands.master(), converter)?;
            let slave = convert_node(operands.slave(), converter)?;
            converter.not_equal(master, slave)
        }
        Operation::LessThan(inequality) => {
            let master = convert_node(inequality.master(), converter)?;
            let slave = convert_node(inequality.slave(), converter)?;
            converter.less_than(master, slave)
        }
        Operation::GreaterThan(inequality) => {
            let master = convert_node(inequality.master(), converter)?;
            let slave = convert_node(inequality.slave(), converter)?;
            converter.greater_than(master, slave)
        }
        Operation::LessEqual(inequality) => {
            let master = convert_node(inequality.master(), converter)?;
            let slave = convert_node(inequality.slave(), converter)?;
            converter.less_equal(master, slave)
        }
        Operation::GreaterEqual(inequality) => {
            let master = convert_node(inequality.master(), converter)?;
            let slave = convert_node(inequality.slave(), converter)?;
            converter.greater_equal(master, slave)
        }
        Operation::BelongsTo(operands) => {
            let master = convert_node(operands.master(), converter)?;
            let slave = convert_node(operands.slave(), converter)?;
            converter.belongs_to(master, slave)
        }
        Operation::IsSubset(operands) => {
            let master = convert_node(operands.master(), converter)?;
            let slave = convert_node(operands.slave(), converter)?;
            converter.is_subset(master, slave)
        }
    }
}
