//! Host-defined operands: variables and functions.
//!
//! A host exposes behaviour to expressions through two traits. [`Variable`]
//! is a leaf that reads something out of the evaluation context;
//! [`Function`] is an n-ary factory whose calls become branch nodes. Both
//! advertise their capabilities through [`Datatypes`] so operators can be
//! checked when the tree is built.
//!
//! Function declarations are described by a plain [`Signature`] value
//! rather than by the function type itself; the signature is validated when
//! the function is bound into a scope, and consulted again at every call
//! site to bind positional arguments to parameter names.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::datatype::{Datatypes, SetValue, Value};
use crate::error::{BoolexError, BoolexResult};
use crate::nodes::{Operation, multiset_eq};

fn unsupported(tag: &str) -> BoolexError {
    BoolexError::InvalidOperation(format!(
        "this operand does not implement the {} datatype",
        tag
    ))
}

/// A developer-defined variable.
///
/// `datatypes` and `value` are mandatory; the per-tag readings default to
/// an [`InvalidOperation`](BoolexError::InvalidOperation) failure, so an
/// implementation only overrides the tags it claims. The comparison hooks
/// have sensible derived defaults and exist so a host can redefine what,
/// say, equality means for its domain (case-insensitive strings, fuzzy
/// numbers).
pub trait Variable<C>: Send + Sync {
    /// The capability set this variable advertises. Must not be empty.
    fn datatypes(&self) -> Datatypes;

    /// The preferred reading of this variable, used when it sits on the
    /// slave side of a binary operator.
    fn value(&self, context: &C) -> BoolexResult<Value>;

    fn boolean_value(&self, context: &C) -> BoolexResult<bool> {
        let _ = context;
        Err(unsupported("boolean"))
    }

    fn number_value(&self, context: &C) -> BoolexResult<f64> {
        let _ = context;
        Err(unsupported("number"))
    }

    fn string_value(&self, context: &C) -> BoolexResult<String> {
        let _ = context;
        Err(unsupported("string"))
    }

    fn set_value(&self, context: &C) -> BoolexResult<SetValue> {
        let _ = context;
        Err(unsupported("set"))
    }

    /// Equality against an already-read slave value.
    fn equals(&self, value: &Value, context: &C) -> BoolexResult<bool> {
        Ok(self.value(context)? == *value)
    }

    /// Whether this variable is less than `value`.
    fn less_than(&self, value: f64, context: &C) -> BoolexResult<bool> {
        Ok(self.number_value(context)? < value)
    }

    /// Whether this variable is greater than `value`.
    fn greater_than(&self, value: f64, context: &C) -> BoolexResult<bool> {
        Ok(self.number_value(context)? > value)
    }

    /// Whether this set-valued variable contains `value`.
    fn contains(&self, value: &Value, context: &C) -> BoolexResult<bool> {
        Ok(self.set_value(context)?.contains(value))
    }

    /// Whether `value` is a subset of this set-valued variable.
    fn is_superset_of(&self, value: &SetValue, context: &C) -> BoolexResult<bool> {
        Ok(self.set_value(context)?.is_superset_of(value))
    }
}

/// A developer-defined, n-ary function.
pub trait Function<C>: Send + Sync {
    /// The declaration this function was registered with.
    fn signature(&self) -> &Signature<C>;

    /// The capability set of the function's result. Must not be empty.
    fn datatypes(&self) -> Datatypes;

    /// Evaluate a call of this function.
    fn call(&self, arguments: &Arguments<C>, context: &C) -> BoolexResult<Value>;
}

/// Declarative descriptor of a function: parameter names, defaults, typing
/// and commutativity.
pub struct Signature<C> {
    required: Vec<String>,
    optional: Vec<(String, Operation<C>)>,
    argument_types: BTreeMap<String, Datatypes>,
    commutative: bool,
}

impl<C> Signature<C> {
    /// Start a signature from the ordered list of required parameter names.
    ///
    /// Names are lower-cased, like every identifier in the system.
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Signature {
            required: required
                .into_iter()
                .map(|name| name.into().to_lowercase())
                .collect(),
            optional: Vec::new(),
            argument_types: BTreeMap::new(),
            commutative: false,
        }
    }

    /// Append an optional parameter with its default node.
    ///
    /// Defaults have value semantics: they are cloned into each call that
    /// omits the parameter, never aliased.
    pub fn optional(mut self, name: impl Into<String>, default: Operation<C>) -> Self {
        self.optional.push((name.into().to_lowercase(), default));
        self
    }

    /// Constrain a parameter to the given capability set.
    pub fn typed(mut self, name: impl Into<String>, datatypes: Datatypes) -> Self {
        self.argument_types
            .insert(name.into().to_lowercase(), datatypes);
        self
    }

    /// Declare the function commutative: its arguments may be reordered
    /// without changing the result, and calls compare them as a multiset.
    pub fn commutative(mut self) -> Self {
        self.commutative = true;
        self
    }

    /// Arity: required plus optional parameter count.
    pub fn arity(&self) -> usize {
        self.required.len() + self.optional.len()
    }

    pub fn is_commutative(&self) -> bool {
        self.commutative
    }

    /// Every parameter name, in declaration order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.required
            .iter()
            .map(String::as_str)
            .chain(self.optional.iter().map(|(name, _)| name.as_str()))
    }

    /// Check the declaration for internal consistency.
    ///
    /// Runs when the function is registered in a scope, so that a broken
    /// declaration never reaches a call site.
    pub fn validate(&self, function_name: &str) -> BoolexResult<()> {
        let mut seen: Vec<&str> = Vec::new();
        for name in self.parameter_names() {
            if seen.contains(&name) {
                return Err(BoolexError::BadFunction(format!(
                    "function \"{}\" has duplicate arguments",
                    function_name
                )));
            }
            seen.push(name);
        }
        for typed in self.argument_types.keys() {
            if !seen.contains(&typed.as_str()) {
                return Err(BoolexError::BadFunction(format!(
                    "function \"{}\" declares a datatype for unknown argument \"{}\"",
                    function_name, typed
                )));
            }
        }
        if self.commutative {
            let mut types = seen.iter().map(|name| self.argument_types.get(*name));
            let first = types.next().flatten();
            if first.is_none() || !types.all(|ty| ty == Some(first.unwrap())) {
                return Err(BoolexError::BadFunction(format!(
                    "function \"{}\" is commutative but its argument types are \
                     heterogeneous or unknown",
                    function_name
                )));
            }
        }
        Ok(())
    }

    /// Bind positional arguments to parameter names.
    ///
    /// Arguments bind in declaration order; omitted optional parameters
    /// inherit a clone of their declared default. Arity and declared
    /// argument datatypes are enforced here, at tree construction.
    pub fn bind(
        &self,
        function_name: &str,
        positional: Vec<Operation<C>>,
    ) -> BoolexResult<Arguments<C>> {
        if positional.len() < self.required.len() {
            return Err(BoolexError::BadCall(format!(
                "too few arguments for \"{}\": expected at least {}, got {}",
                function_name,
                self.required.len(),
                positional.len()
            )));
        }
        if positional.len() > self.arity() {
            return Err(BoolexError::BadCall(format!(
                "too many arguments for \"{}\": expected at most {}, got {}",
                function_name,
                self.arity(),
                positional.len()
            )));
        }

        let mut map: BTreeMap<String, Operation<C>> = self
            .optional
            .iter()
            .map(|(name, default)| (name.clone(), default.clone()))
            .collect();
        let names: Vec<&str> = self.parameter_names().collect();
        for (position, argument) in positional.into_iter().enumerate() {
            map.insert(names[position].to_string(), argument);
        }

        for (name, argument) in &map {
            if let Some(expected) = self.argument_types.get(name) {
                if (argument.datatypes() & *expected).is_empty() {
                    return Err(BoolexError::BadCall(format!(
                        "argument \"{}\" of \"{}\" must support the {} datatype",
                        name,
                        function_name,
                        expected.describe()
                    )));
                }
            }
        }

        Ok(Arguments(map))
    }
}

impl<C> Clone for Signature<C> {
    fn clone(&self) -> Self {
        Signature {
            required: self.required.clone(),
            optional: self.optional.clone(),
            argument_types: self.argument_types.clone(),
            commutative: self.commutative,
        }
    }
}

/// The argument map of a function call: parameter name to bound node.
///
/// After binding, every declared parameter is present — omitted optional
/// parameters carry their default.
pub struct Arguments<C>(BTreeMap<String, Operation<C>>);

impl<C> Arguments<C> {
    pub fn get(&self, name: &str) -> Option<&Operation<C>> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Operation<C>)> {
        self.0.iter().map(|(name, node)| (name.as_str(), node))
    }
}

impl<C> Clone for Arguments<C> {
    fn clone(&self) -> Self {
        Arguments(self.0.clone())
    }
}

/// A call of a host-defined function: the branch node wrapping the bound
/// argument map.
pub struct FunctionCall<C> {
    name: String,
    function: Arc<dyn Function<C>>,
    arguments: Arguments<C>,
}

impl<C> FunctionCall<C> {
    /// Build a call of `function` under `name` with `positional` arguments.
    pub fn new(
        name: impl Into<String>,
        function: Arc<dyn Function<C>>,
        positional: Vec<Operation<C>>,
    ) -> BoolexResult<Self> {
        let name = name.into().to_lowercase();
        let arguments = function.signature().bind(&name, positional)?;
        Ok(FunctionCall {
            name,
            function,
            arguments,
        })
    }

    /// The name this call was built under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function(&self) -> &Arc<dyn Function<C>> {
        &self.function
    }

    pub fn arguments(&self) -> &Arguments<C> {
        &self.arguments
    }

    /// Run the call.
    pub fn evaluate(&self, context: &C) -> BoolexResult<Value> {
        self.function.call(&self.arguments, context)
    }

    pub(crate) fn wrong_result(&self, expected: &str, got: &Value) -> BoolexError {
        BoolexError::InvalidOperation(format!(
            "function \"{}\" was read as a {} but produced a {} value",
            self.name,
            expected,
            got.datatype().describe()
        ))
    }
}

impl<C> PartialEq for FunctionCall<C> {
    /// Two calls are equal iff they call the same declared function and
    /// their argument maps are equal key-wise — as a multiset of values
    /// when the function is commutative.
    fn eq(&self, other: &Self) -> bool {
        if !Arc::ptr_eq(&self.function, &other.function) {
            return false;
        }
        if self.function.signature().is_commutative() {
            let left: Vec<_> = self.arguments.iter().map(|(_, node)| node).collect();
            let right: Vec<_> = other.arguments.iter().map(|(_, node)| node).collect();
            multiset_eq(&left, &right)
        } else {
            self.arguments.len() == other.arguments.len()
                && self
                    .arguments
                    .iter()
                    .all(|(name, node)| other.arguments.get(name) == Some(node))
        }
    }
}

impl<C> Clone for FunctionCall<C> {
    fn clone(&self) -> Self {
        FunctionCall {
            name: self.name.clone(),
            function: Arc::clone(&self.function),
            arguments: self.arguments.clone(),
        }
    }
}

impl<C> fmt::Display for FunctionCall<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (index, (name, node)) in self.arguments.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, node)?;
        }
        write!(f, ")")
    }
}

impl<C> fmt::Debug for FunctionCall<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self)
    }
}
