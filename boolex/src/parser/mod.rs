//! Parsing: grammar configuration, scope handling and the parsers
//! themselves.
//!
//! The pipeline is: a [`Grammar`] describes the surface syntax, a
//! [`Namespace`](scope::Namespace) describes what names mean, and an
//! [`EvaluableParser`](parsers::EvaluableParser) or
//! [`ConvertibleParser`](parsers::ConvertibleParser) combines the two to
//! turn expression strings into parse trees.

pub mod grammar;
mod lexer;
pub mod parsers;
pub mod scope;
pub mod trees;

pub use grammar::{CustomGenerator, Grammar, SettingKey, TokenKey};
pub use parsers::{ConvertibleParser, EvaluableParser};
pub use scope::{Bind, BindTarget, Namespace, SymbolTable};
pub use trees::{ConvertibleTree, EvaluableTree};
