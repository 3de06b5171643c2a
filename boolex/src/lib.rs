//! boolex: boolean expressions with a human-friendly, reconfigurable
//! infix syntax.
//!
//! A host application defines a vocabulary of variables and functions,
//! optionally customises the surface tokens, then parses expressions like
//! `traffic_light == "red" & ~must_stop` into one of two tree flavours:
//!
//! - an **evaluable** tree, where every identifier is bound to host
//!   behaviour and the tree yields a truth value for a context;
//! - a **convertible** tree, where identifiers stay symbolic placeholders
//!   and a visitor turns the tree into anything else (an SQL predicate,
//!   for instance).
//!
//! The crate is generic over the evaluation context type `C`: the library
//! routes `&C` into the host's hooks and never looks inside it.
//!
//! Example
//! ```
//! use boolex::prelude::*;
//!
//! let grammar: Grammar<()> = Grammar::new();
//! let parser = ConvertibleParser::new(grammar);
//! let tree = parser.parse("2 < 3").unwrap();
//! assert!(tree.root().is_less_than());
//! ```
//!
//! Everything is immutable after construction: grammars, scopes, parsers
//! and trees can be shared freely across threads for reading. There is no
//! global state; parser memoisation lives and dies with each `parse()`
//! call.

pub mod datatype;
pub mod error;
pub mod nodes;
pub mod parser;

pub use datatype::{Datatypes, SetValue, Value};
pub use error::{BoolexError, BoolexResult};

pub mod prelude {
    pub use crate::datatype::{Datatypes, SetValue, Value};
    pub use crate::error::{BoolexError, BoolexResult};
    pub use crate::nodes::converters::Converter;
    pub use crate::nodes::{
        Arguments, Function, FunctionCall, NamespacePath, Operation, PlaceholderFunction,
        PlaceholderVariable, Signature, Variable,
    };
    pub use crate::parser::{
        Bind, BindTarget, ConvertibleParser, ConvertibleTree, CustomGenerator, EvaluableParser,
        EvaluableTree, Grammar, Namespace, SymbolTable,
    };
}
