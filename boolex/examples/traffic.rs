//! A miniature host: a traffic vocabulary evaluated against contexts, and
//! the same expressions converted into SQL-ish predicates.

use std::collections::HashMap;
use std::sync::Arc;

use boolex::prelude::*;

type Context = HashMap<String, Value>;

struct ContextVariable {
    key: String,
    datatypes: Datatypes,
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

    fn string_value(&self, context: &Context) -> BoolexResult<String> {
        match self.value(context)? {
            Value::String(value) => Ok(value),
            other => Err(BoolexError::InvalidOperation(format!(
                "\"{}\" holds {:?}, not a string",
                self.key, other
            ))),
        }
    }

    fn number_value(&self, context: &Context) -> BoolexResult<f64> {
        match self.value(context)? {
            Value::Number(value) => Ok(value),
            other => Err(BoolexError::InvalidOperation(format!(
                "\"{}\" holds {:?}, not a number",
                self.key, other
            ))),
        }
    }
}

fn bind(name: &str, datatypes: Datatypes) -> Bind<Context> {
    Bind::variable(
        name,
        Arc::new(ContextVariable {
            key: name.to_string(),
            datatypes,
        }),
    )
    .expect("the variable advertises a datatype")
}

/// Renders placeholders and operators into a flat predicate string.
struct Sql;

impl Converter<Context> for Sql {
    type Output = String;

    fn string(&mut self, text: &str) -> BoolexResult<String> {
        Ok(format!("'{}'", text))
    }

    fn number(&mut self, value: f64) -> BoolexResult<String> {
        Ok(value.to_string())
    }

    fn set(&mut self, elements: Vec<String>) -> BoolexResult<String> {
        Ok(format!("({})", elements.join(", ")))
    }

    fn variable(&mut self, name: &str, _path: &[String]) -> BoolexResult<String> {
        Ok(name.to_string())
    }

    fn function(
        &mut self,
        name: &str,
        _path: &[String],
        arguments: Vec<String>,
    ) -> BoolexResult<String> {
        Ok(format!("{}({})", name, arguments.join(", ")))
    }

    fn not(&mut self, operand: String) -> BoolexResult<String> {
        Ok(format!("NOT {}", operand))
    }

    fn and(&mut self, master: String, slave: String) -> BoolexResult<String> {
        Ok(format!("({} AND {})", master, slave))
    }

    fn or(&mut self, master: String, slave: String) -> BoolexResult<String> {
        Ok(format!("({} OR {})", master, slave))
    }

    fn xor(&mut self, master: String, slave: String) -> BoolexResult<String> {
        Ok(format!("({} XOR {})", master, slave))
    }

    fn equal(&mut self, master: String, slave: String) -> BoolexResult<String> {
        Ok(format!("{} = {}", master, slave))
    }

    fn not_equal(&mut self, master: String, slave: String) -> BoolexResult<String> {
        Ok(format!("{} <> {}", master, slave))
    }

    fn less_than(&mut self, master: String, slave: String) -> BoolexResult<String> {
        Ok(format!("{} < {}", master, slave))
    }

    fn greater_than(&mut self, master: String, slave: String) -> BoolexResult<String> {
        Ok(format!("{} > {}", master, slave))
    }

    fn less_equal(&mut self, master: String, slave: String) -> BoolexResult<String> {
        Ok(format!("{} <= {}", master, slave))
    }

    fn greater_equal(&mut self, master: String, slave: String) -> BoolexResult<String> {
        Ok(format!("{} >= {}", master, slave))
    }

    fn belongs_to(&mut self, master: String, slave: String) -> BoolexResult<String> {
        Ok(format!("{} IN {}", slave, master))
    }

    fn is_subset(&mut self, master: String, slave: String) -> BoolexResult<String> {
        Ok(format!("{} CONTAINS {}", master, slave))
    }
}

fn main() -> BoolexResult<()> {
    let mut root = Namespace::new("traffic");
    root.add_bind(bind("traffic_light", Datatypes::STRING))?;
    root.add_bind(bind("speed", Datatypes::NUMBER))?;
    root.validate()?;

    let parser = EvaluableParser::new(Grammar::new(), &root, None);
    let rule = parser.parse("traffic_light == \"red\" | speed > 50")?;

    let mut context = Context::new();
    context.insert("traffic_light".to_string(), Value::from("green"));
    context.insert("speed".to_string(), Value::Number(62.0));
    println!("must stop: {}", rule.evaluate(&context)?);

    let convertible = ConvertibleParser::<Context>::new(Grammar::new());
    let tree = convertible.parse("traffic_light == \"red\" | speed > 50")?;
    println!("predicate: {}", tree.convert(&mut Sql)?);

    Ok(())
}
