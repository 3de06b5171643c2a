//! Node-level behaviour: construction checks, operand organisation,
//! evaluation semantics and structural equality.

use std::cell::RefCell;
use std::sync::Arc;

use boolex::prelude::*;
use pretty_assertions::assert_eq;

/// A boolean variable with a fixed value, for a `()` context.
struct Flag(bool);

impl Variable<()> for Flag {
    fn datatypes(&self) -> Datatypes {
        Datatypes::BOOLEAN
    }

    fn value(&self, _context: &()) -> BoolexResult<Value> {
        Ok(Value::Boolean(self.0))
    }

    fn boolean_value(&self, _context: &()) -> BoolexResult<bool> {
        Ok(self.0)
    }
}

/// A numeric variable with a fixed value.
struct Fixed(f64);

impl Variable<()> for Fixed {
    fn datatypes(&self) -> Datatypes {
        Datatypes::NUMBER
    }

    fn value(&self, _context: &()) -> BoolexResult<Value> {
        Ok(Value::Number(self.0))
    }

    fn number_value(&self, _context: &()) -> BoolexResult<f64> {
        Ok(self.0)
    }
}

fn flag(value: bool) -> Operation<()> {
    Operation::Variable(Arc::new(Flag(value)))
}

fn fixed(value: f64) -> Operation<()> {
    Operation::Variable(Arc::new(Fixed(value)))
}

#[test]
fn negation_requires_a_boolean_operand() {
    let error = Operation::negation(Operation::<()>::number(3.0)).unwrap_err();
    assert!(error.is_invalid_operation(), "got {:?}", error);
    assert!(Operation::negation(flag(true)).is_ok());
}

#[test]
fn connectives_require_boolean_operands_on_both_sides() {
    let error = Operation::conjunction(flag(true), Operation::string("nope")).unwrap_err();
    assert!(error.is_invalid_operation(), "got {:?}", error);
    let error = Operation::disjunction(Operation::number(1.0), flag(true)).unwrap_err();
    assert!(error.is_invalid_operation(), "got {:?}", error);
}

#[test]
fn double_negation_restores_the_truth_value() {
    for value in [true, false] {
        let once = Operation::negation(flag(value)).unwrap();
        let twice = Operation::negation(once).unwrap();
        assert_eq!(twice.boolean_value(&()).unwrap(), value);
    }
}

#[test]
fn exclusive_disjunction_evaluates_both_sides() {
    let node = Operation::exclusive_disjunction(flag(true), flag(false)).unwrap();
    assert!(node.boolean_value(&()).unwrap());
    let node = Operation::exclusive_disjunction(flag(true), flag(true)).unwrap();
    assert!(!node.boolean_value(&()).unwrap());
}

/// Variables that log their evaluation, to observe short-circuits.
struct Spy {
    name: &'static str,
    value: bool,
}

type SpyLog = RefCell<Vec<&'static str>>;

impl Variable<SpyLog> for Spy {
    fn datatypes(&self) -> Datatypes {
        Datatypes::BOOLEAN
    }

    fn value(&self, context: &SpyLog) -> BoolexResult<Value> {
        Ok(Value::Boolean(self.boolean_value(context)?))
    }

    fn boolean_value(&self, context: &SpyLog) -> BoolexResult<bool> {
        context.borrow_mut().push(self.name);
        Ok(self.value)
    }
}

fn spy(name: &'static str, value: bool) -> Operation<SpyLog> {
    Operation::Variable(Arc::new(Spy { name, value }))
}

#[test]
fn conjunction_short_circuits_on_a_false_master() {
    let node = Operation::conjunction(spy("a", false), spy("b", true)).unwrap();
    let log = SpyLog::default();
    assert!(!node.boolean_value(&log).unwrap());
    assert_eq!(*log.borrow(), vec!["a"], "the slave must not be consulted");
}

#[test]
fn disjunction_short_circuits_on_a_true_master() {
    let node = Operation::disjunction(spy("a", true), spy("b", false)).unwrap();
    let log = SpyLog::default();
    assert!(node.boolean_value(&log).unwrap());
    assert_eq!(*log.borrow(), vec!["a"]);
}

#[test]
fn evaluation_order_is_master_then_slave() {
    let node = Operation::conjunction(spy("a", true), spy("b", true)).unwrap();
    let log = SpyLog::default();
    assert!(node.boolean_value(&log).unwrap());
    assert_eq!(*log.borrow(), vec!["a", "b"]);
}

#[test]
fn equality_between_constants() {
    let node = Operation::<()>::equality(Operation::number(3.0), Operation::number(3.0)).unwrap();
    assert!(node.boolean_value(&()).unwrap());
    let node =
        Operation::<()>::equality(Operation::string("a"), Operation::number(3.0)).unwrap();
    assert!(!node.boolean_value(&()).unwrap());
    let node =
        Operation::<()>::inequality(Operation::number(3.0), Operation::number(2.0)).unwrap();
    assert!(node.boolean_value(&()).unwrap());
}

#[test]
fn a_variable_side_becomes_the_master_of_an_equality() {
    let node = Operation::equality(Operation::string("on"), flag(true)).unwrap();
    match &node {
        Operation::Equal(operands) => {
            assert!(operands.master().is_variable(), "variable must be master");
            assert!(operands.slave().is_string());
        }
        other => panic!("expected an Equal node, got {:?}", other),
    }
}

#[test]
fn inequalities_need_a_numeric_master() {
    let error =
        Operation::<()>::less_than(Operation::string("a"), Operation::number(1.0)).unwrap_err();
    assert!(error.is_invalid_operation(), "got {:?}", error);
}

#[test]
fn swapped_inequalities_invert_their_comparison() {
    // 3 < x with x = 5: the variable becomes the master, so the node must
    // ask "is x greater than 3".
    let node = Operation::less_than(Operation::number(3.0), fixed(5.0)).unwrap();
    assert!(node.boolean_value(&()).unwrap());
    let node = Operation::less_than(Operation::number(3.0), fixed(2.0)).unwrap();
    assert!(!node.boolean_value(&()).unwrap());
    // And the dual: x < 3.
    let node = Operation::greater_than(Operation::number(3.0), fixed(2.0)).unwrap();
    assert!(node.boolean_value(&()).unwrap());
}

#[test]
fn inequality_duality_on_constants() {
    let less = Operation::<()>::less_than(Operation::number(2.0), Operation::number(3.0))
        .unwrap()
        .boolean_value(&())
        .unwrap();
    let greater = Operation::<()>::greater_than(Operation::number(3.0), Operation::number(2.0))
        .unwrap()
        .boolean_value(&())
        .unwrap();
    assert_eq!(less, greater);

    let le = Operation::<()>::less_equal(Operation::number(3.0), Operation::number(3.0))
        .unwrap()
        .boolean_value(&())
        .unwrap();
    assert!(le);
    let ge = Operation::<()>::greater_equal(Operation::number(2.0), Operation::number(3.0))
        .unwrap()
        .boolean_value(&())
        .unwrap();
    assert!(!ge);
}

#[test]
fn membership_requires_a_set_master() {
    let error =
        Operation::<()>::belongs_to(Operation::number(1.0), Operation::string("abc")).unwrap_err();
    assert!(error.is_invalid_operation(), "strings are not sets");

    let error =
        Operation::<()>::is_subset(Operation::number(1.0), Operation::set(vec![])).unwrap_err();
    assert!(error.is_invalid_operation(), "both sides must be sets");
}

#[test]
fn membership_evaluation() {
    let set = Operation::<()>::set(vec![Operation::number(1.0), Operation::number(2.0)]);
    let node = Operation::belongs_to(Operation::number(1.0), set.clone()).unwrap();
    assert!(node.boolean_value(&()).unwrap());
    let node = Operation::belongs_to(Operation::number(9.0), set).unwrap();
    assert!(!node.boolean_value(&()).unwrap());
}

#[test]
fn subset_evaluation() {
    let subset = Operation::<()>::set(vec![Operation::string("carla")]);
    let superset = Operation::<()>::set(vec![
        Operation::string("andreina"),
        Operation::string("carla"),
    ]);
    let node = Operation::is_subset(subset, superset).unwrap();
    assert!(node.boolean_value(&()).unwrap());
}

#[test]
fn sets_collapse_duplicates_on_construction() {
    let node = Operation::<()>::set(vec![
        Operation::number(1.0),
        Operation::number(2.0),
        Operation::number(1.0),
    ]);
    match &node {
        Operation::Set(elements) => assert_eq!(elements.len(), 2),
        other => panic!("expected a Set node, got {:?}", other),
    }
}

#[test]
fn commutative_operators_compare_unordered() {
    let forwards = Operation::conjunction(flag(true), Operation::negation(flag(false)).unwrap())
        .unwrap();
    let backwards = Operation::conjunction(Operation::negation(flag(false)).unwrap(), flag(true))
        .unwrap();
    // The bound variables differ by identity, so these are *not* equal...
    assert_ne!(forwards, backwards);

    // ...but with shared operands they are.
    let shared = Arc::new(Flag(true));
    let left = Operation::Variable(shared.clone() as Arc<dyn Variable<()>>);
    let right = Operation::<()>::negation(Operation::Variable(shared.clone() as _)).unwrap();
    let forwards = Operation::conjunction(left.clone(), right.clone()).unwrap();
    let backwards = Operation::conjunction(right, left).unwrap();
    assert_eq!(forwards, backwards);
}

#[test]
fn equality_is_commutative_and_inequalities_are_not() {
    let one = Operation::<()>::number(1.0);
    let two = Operation::<()>::number(2.0);
    assert_eq!(
        Operation::equality(one.clone(), two.clone()).unwrap(),
        Operation::equality(two.clone(), one.clone()).unwrap(),
    );
    assert_ne!(
        Operation::less_than(one.clone(), two.clone()).unwrap(),
        Operation::less_than(two, one).unwrap(),
    );
}

#[test]
fn set_equality_is_a_multiset_comparison() {
    let left = Operation::<()>::set(vec![Operation::number(1.0), Operation::string("x")]);
    let right = Operation::<()>::set(vec![Operation::string("x"), Operation::number(1.0)]);
    assert_eq!(left, right);
}

// --- function declarations and calls ------------------------------------

struct Clamp {
    signature: Signature<()>,
}

impl Clamp {
    fn new() -> Arc<Self> {
        Arc::new(Clamp {
            signature: Signature::new(["value", "low"])
                .optional("high", Operation::number(10.0)),
        })
    }
}

impl Function<()> for Clamp {
    fn signature(&self) -> &Signature<()> {
        &self.signature
    }

    fn datatypes(&self) -> Datatypes {
        Datatypes::BOOLEAN
    }

    fn call(&self, _arguments: &Arguments<()>, _context: &()) -> BoolexResult<Value> {
        Ok(Value::Boolean(true))
    }
}

struct Pair {
    signature: Signature<()>,
}

impl Pair {
    fn new() -> Arc<Self> {
        Arc::new(Pair {
            signature: Signature::new(["a", "b"])
                .typed("a", Datatypes::NUMBER)
                .typed("b", Datatypes::NUMBER)
                .commutative(),
        })
    }
}

impl Function<()> for Pair {
    fn signature(&self) -> &Signature<()> {
        &self.signature
    }

    fn datatypes(&self) -> Datatypes {
        Datatypes::BOOLEAN
    }

    fn call(&self, _arguments: &Arguments<()>, _context: &()) -> BoolexResult<Value> {
        Ok(Value::Boolean(true))
    }
}

#[test]
fn calls_enforce_arity() {
    let clamp = Clamp::new();
    let error = FunctionCall::new("clamp", clamp.clone() as Arc<dyn Function<()>>, vec![])
        .unwrap_err();
    assert!(error.is_bad_call(), "too few arguments: {:?}", error);

    let error = FunctionCall::new(
        "clamp",
        clamp.clone() as _,
        vec![
            Operation::number(1.0),
            Operation::number(2.0),
            Operation::number(3.0),
            Operation::number(4.0),
        ],
    )
    .unwrap_err();
    assert!(error.is_bad_call(), "too many arguments: {:?}", error);

    assert!(
        FunctionCall::new(
            "clamp",
            clamp as _,
            vec![Operation::number(1.0), Operation::number(2.0)],
        )
        .is_ok()
    );
}

#[test]
fn omitted_optional_arguments_inherit_their_defaults() {
    let clamp = Clamp::new();
    let implicit = FunctionCall::new(
        "clamp",
        clamp.clone() as Arc<dyn Function<()>>,
        vec![Operation::number(5.0), Operation::number(0.0)],
    )
    .unwrap();
    let explicit = FunctionCall::new(
        "clamp",
        clamp as _,
        vec![
            Operation::number(5.0),
            Operation::number(0.0),
            Operation::number(10.0),
        ],
    )
    .unwrap();
    assert_eq!(
        implicit.arguments().get("high"),
        Some(&Operation::number(10.0))
    );
    assert!(implicit == explicit, "defaults must compare like explicits");
}

#[test]
fn typed_arguments_are_checked_at_the_call_site() {
    let pair = Pair::new();
    let error = FunctionCall::new(
        "pair",
        pair as Arc<dyn Function<()>>,
        vec![Operation::string("x"), Operation::number(1.0)],
    )
    .unwrap_err();
    assert!(error.is_bad_call(), "got {:?}", error);
}

#[test]
fn commutative_calls_compare_arguments_as_a_multiset() {
    let pair = Pair::new();
    let forwards = FunctionCall::new(
        "pair",
        pair.clone() as Arc<dyn Function<()>>,
        vec![Operation::number(1.0), Operation::number(2.0)],
    )
    .unwrap();
    let backwards = FunctionCall::new(
        "pair",
        pair as _,
        vec![Operation::number(2.0), Operation::number(1.0)],
    )
    .unwrap();
    assert!(forwards == backwards);
}

#[test]
fn broken_declarations_are_rejected() {
    let duplicated: Signature<()> = Signature::new(["a", "a"]);
    assert!(duplicated.validate("f").unwrap_err().is_bad_function());

    let duplicated: Signature<()> =
        Signature::new(["a"]).optional("a", Operation::number(0.0));
    assert!(duplicated.validate("f").unwrap_err().is_bad_function());

    let unknown: Signature<()> = Signature::new(["a"]).typed("b", Datatypes::NUMBER);
    assert!(unknown.validate("f").unwrap_err().is_bad_function());

    let untyped_commutative: Signature<()> = Signature::new(["a", "b"]).commutative();
    assert!(
        untyped_commutative
            .validate("f")
            .unwrap_err()
            .is_bad_function()
    );

    let heterogeneous: Signature<()> = Signature::new(["a", "b"])
        .typed("a", Datatypes::NUMBER)
        .typed("b", Datatypes::STRING)
        .commutative();
    assert!(heterogeneous.validate("f").unwrap_err().is_bad_function());
}

#[test]
fn leaves_branches_and_arity() {
    let number = Operation::<()>::number(1.0);
    assert!(number.is_leaf());
    assert_eq!(number.arity(), 0);

    let set = Operation::<()>::set(vec![Operation::number(1.0), Operation::number(2.0)]);
    assert!(set.is_branch());
    assert_eq!(set.arity(), 2);

    let not = Operation::negation(flag(true)).unwrap();
    assert_eq!(not.arity(), 1);
    let and = Operation::conjunction(flag(true), flag(false)).unwrap();
    assert!(and.is_branch());
    assert_eq!(and.arity(), 2);
}

#[test]
fn evaluable_trees_refuse_non_boolean_roots() {
    let error = EvaluableTree::new(Operation::<()>::number(3.0)).unwrap_err();
    assert!(error.is_invalid_operation(), "got {:?}", error);
    assert!(EvaluableTree::new(flag(true)).is_ok());
}

#[test]
fn runtime_datatype_mismatches_surface_as_invalid_operation() {
    // A boolean variable asked for its number.
    let node = flag(true);
    let error = node.number_value(&()).unwrap_err();
    assert!(error.is_invalid_operation(), "got {:?}", error);
}
