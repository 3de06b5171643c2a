//! Shared fixtures for the integration tests: a map-backed context, a
//! variable that reads itself out of that map, and a couple of host
//! functions.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use boolex::prelude::*;

/// The evaluation context used across the tests: plain key/value pairs.
pub type Context = HashMap<String, Value>;

pub fn context<const N: usize>(pairs: [(&str, Value); N]) -> Context {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

pub fn string_set<const N: usize>(items: [&str; N]) -> Value {
    Value::Set(items.into_iter().map(Value::from).collect())
}

/// A variable bound to a context key of the same name.
pub struct ContextVariable {
    key: String,
    datatypes: Datatypes,
}

impl ContextVariable {
    pub fn new(key: &str, datatypes: Datatypes) -> Arc<Self> {
        Arc::new(ContextVariable {
            key: key.to_string(),
            datatypes,
        })
    }
}

impl Variable<Context> for ContextVariable {
    fn datatypes(&self) -> Datatypes {
        self.datatypes
    }

    fn value(&self, context: &Context) -> BoolexResult<Value> {
        context.get(&self.key).cloned().ok_or_else(|| {
            BoolexError::InvalidOperation(format!("\"{}\" is not defined", self.key))
        })
    }

    fn boolean_value(&self, context: &Context) -> BoolexResult<bool> {
        match self.value(context)? {
            Value::Boolean(value) => Ok(value),
            other => Err(self.mismatch("boolean", &other)),
        }
    }

    fn number_value(&self, context: &Context) -> BoolexResult<f64> {
        match self.value(context)? {
            Value::Number(value) => Ok(value),
            other => Err(self.mismatch("number", &other)),
        }
    }

    fn string_value(&self, context: &Context) -> BoolexResult<String> {
        match self.value(context)? {
            Value::String(value) => Ok(value),
            other => Err(self.mismatch("string", &other)),
        }
    }

    fn set_value(&self, context: &Context) -> BoolexResult<SetValue> {
        match self.value(context)? {
            Value::Set(value) => Ok(value),
            other => Err(self.mismatch("set", &other)),
        }
    }
}

impl ContextVariable {
    fn mismatch(&self, expected: &str, got: &Value) -> BoolexError {
        BoolexError::InvalidOperation(format!(
            "\"{}\" was read as a {} but holds a {:?}",
            self.key, expected, got
        ))
    }
}

/// `greet()` — a nullary function returning a constant string.
pub struct Greet {
    signature: Signature<Context>,
}

impl Greet {
    pub fn new() -> Arc<Self> {
        Arc::new(Greet {
            signature: Signature::new(Vec::<String>::new()),
        })
    }
}

impl Function<Context> for Greet {
    fn signature(&self) -> &Signature<Context> {
        &self.signature
    }

    fn datatypes(&self) -> Datatypes {
        Datatypes::STRING
    }

    fn call(&self, _arguments: &Arguments<Context>, _context: &Context) -> BoolexResult<Value> {
        Ok(Value::from("hello"))
    }
}

/// `within(value, low, high)` — true when `low <= value <= high`, with
/// `high` defaulting to 100.
pub struct Within {
    signature: Signature<Context>,
}

impl Within {
    pub fn new() -> Arc<Self> {
        Arc::new(Within {
            signature: Signature::new(["value", "low"])
                .optional("high", Operation::number(100.0))
                .typed("value", Datatypes::NUMBER)
                .typed("low", Datatypes::NUMBER)
                .typed("high", Datatypes::NUMBER),
        })
    }
}

impl Function<Context> for Within {
    fn signature(&self) -> &Signature<Context> {
        &self.signature
    }

    fn datatypes(&self) -> Datatypes {
        Datatypes::BOOLEAN
    }

    fn call(&self, arguments: &Arguments<Context>, context: &Context) -> BoolexResult<Value> {
        let value = arguments
            .get("value")
            .expect("bound call always carries \"value\"")
            .number_value(context)?;
        let low = arguments
            .get("low")
            .expect("bound call always carries \"low\"")
            .number_value(context)?;
        let high = arguments
            .get("high")
            .expect("bound call always carries \"high\"")
            .number_value(context)?;
        Ok(Value::Boolean(low <= value && value <= high))
    }
}

/// The scope most parsing tests share.
pub fn traffic_scope() -> Namespace<Context> {
    let mut root = Namespace::new("root");
    root.add_bind(
        Bind::variable(
            "traffic_light",
            ContextVariable::new("traffic_light", Datatypes::STRING),
        )
        .unwrap(),
    )
    .unwrap();
    root.add_bind(
        Bind::variable("count", ContextVariable::new("count", Datatypes::NUMBER)).unwrap(),
    )
    .unwrap();
    root.add_bind(
        Bind::variable("drivers", ContextVariable::new("drivers", Datatypes::SET)).unwrap(),
    )
    .unwrap();
    root.add_bind(
        Bind::variable(
            "pedestrians",
            ContextVariable::new("pedestrians", Datatypes::SET),
        )
        .unwrap(),
    )
    .unwrap();
    root.add_bind(
        Bind::variable(
            "must_stop",
            ContextVariable::new("must_stop", Datatypes::BOOLEAN),
        )
        .unwrap(),
    )
    .unwrap();
    root.add_bind(Bind::function("greet", Greet::new()).unwrap())
        .unwrap();
    root.add_bind(Bind::function("within", Within::new()).unwrap())
        .unwrap();
    root
}

pub fn evaluable_parser() -> EvaluableParser<Context> {
    EvaluableParser::new(Grammar::new(), &traffic_scope(), None)
}

pub fn convertible_parser() -> ConvertibleParser<Context> {
    ConvertibleParser::new(Grammar::new())
}
