//! The parsers.
//!
//! Parsing happens in two stages: the [`Lexer`] turns the input into a
//! token stream, and a chumsky precedence cascade over those tokens
//! builds the tree. Precedence runs,
//! loosest to tightest: `or`, `xor`, `and`, prefix `not`, membership,
//! relational, atoms. Membership and relational operators don't chain.
//!
//! Every reduction constructs the corresponding node immediately, so
//! capability checks and master/slave organisation happen during the parse
//! and domain errors surface through the same `Result` as syntax errors.
//! The cascade's operand rule is memoised per parse invocation; the memo
//! table lives and dies with the `parse()` call.
//!
//! The two parser flavours differ in one spot only: how an identifier
//! reduction turns a name into a node. The evaluable parser resolves it
//! against a symbol table; the convertible parser emits a placeholder.

use std::sync::Arc;

use chumsky::{input::ValueInput, prelude::*};
use log::debug;

use crate::error::{BoolexError, BoolexResult};
use crate::nodes::{
    FunctionCall, NamespacePath, Operation, PlaceholderFunction, PlaceholderVariable,
};
use crate::parser::grammar::{Grammar, SettingKey, TokenKey};
use crate::parser::lexer::{Lexer, OpToken, Token};
use crate::parser::scope::{BindTarget, Namespace, SymbolTable};
use crate::parser::trees::{ConvertibleTree, EvaluableTree};

/// How identifier reductions produce nodes; the only seam between the two
/// parser flavours.
trait Reduce<C> {
    fn variable(&self, name: &str, path: &NamespacePath) -> BoolexResult<Operation<C>>;

    fn function(
        &self,
        name: &str,
        path: &NamespacePath,
        arguments: Vec<Operation<C>>,
    ) -> BoolexResult<Operation<C>>;
}

/// The token values and settings the cascade needs, snapshotted from a
/// grammar so the combinators own what they match against.
#[derive(Clone)]
struct CascadeTokens {
    set_start: Token,
    set_end: Token,
    element_sep: Token,
    group_start: Token,
    group_end: Token,
    args_start: Token,
    args_end: Token,
    args_sep: Token,
    set_right_in_contains: bool,
    superset_right_in_is_subset: bool,
}

impl CascadeTokens {
    fn new<C>(grammar: &Grammar<C>) -> Self {
        let punct = |key: TokenKey| Token::Punct(grammar.token(key).to_string());
        CascadeTokens {
            set_start: punct(TokenKey::SetStart),
            set_end: punct(TokenKey::SetEnd),
            element_sep: punct(TokenKey::ElementSeparator),
            group_start: punct(TokenKey::GroupStart),
            group_end: punct(TokenKey::GroupEnd),
            args_start: punct(TokenKey::ArgumentsStart),
            args_end: punct(TokenKey::ArgumentsEnd),
            args_sep: punct(TokenKey::ArgumentsSeparator),
            set_right_in_contains: grammar.setting(SettingKey::SetRightInContains),
            superset_right_in_is_subset: grammar.setting(SettingKey::SupersetRightInIsSubset),
        }
    }
}

fn build_relational<C>(
    op: OpToken,
    left: Operation<C>,
    right: Operation<C>,
) -> BoolexResult<Operation<C>> {
    match op {
        OpToken::Eq => Operation::equality(left, right),
        OpToken::Ne => Operation::inequality(left, right),
        OpToken::Lt => Operation::less_than(left, right),
        OpToken::Gt => Operation::greater_than(left, right),
        OpToken::Le => Operation::less_equal(left, right),
        OpToken::Ge => Operation::greater_equal(left, right),
        _ => unreachable!("relational reduction got a non-relational token"),
    }
}

fn build_membership<C>(
    op: OpToken,
    left: Operation<C>,
    right: Operation<C>,
    tokens: &CascadeTokens,
) -> BoolexResult<Operation<C>> {
    match op {
        OpToken::BelongsTo => {
            let (element, set) = if tokens.set_right_in_contains {
                (left, right)
            } else {
                (right, left)
            };
            Operation::belongs_to(element, set)
        }
        OpToken::IsSubset => {
            let (subset, superset) = if tokens.superset_right_in_is_subset {
                (left, right)
            } else {
                (right, left)
            };
            Operation::is_subset(subset, superset)
        }
        _ => unreachable!("membership reduction got a non-membership token"),
    }
}

/// Build the precedence cascade over a token stream.
fn expression_parser<'src, C, I, R>(
    tokens: CascadeTokens,
    reducer: &'src R,
) -> impl Parser<'src, I, BoolexResult<Operation<C>>, extra::Err<Rich<'src, Token>>> + Clone
where
    C: 'src,
    I: ValueInput<'src, Token = Token, Span = SimpleSpan>,
    R: Reduce<C> + ?Sized,
{
    let mut expression = Recursive::declare();

    // Operands: everything that can appear in a set literal or an argument
    // list. Grouped sub-expressions are deliberately not operands — they
    // only appear at the cascade's atom level, like in the reference
    // grammar.
    let operand = recursive(|operand| {
        let elements = operand
            .clone()
            .separated_by(just(tokens.element_sep.clone()))
            .collect::<Vec<BoolexResult<Operation<C>>>>();
        let set = elements
            .delimited_by(just(tokens.set_start.clone()), just(tokens.set_end.clone()))
            .map(|elements| {
                let elements = elements.into_iter().collect::<BoolexResult<Vec<_>>>()?;
                Ok(Operation::set(elements))
            });

        let literal = select! {
            Token::Number(value) => Ok(Operation::number(value)),
            Token::Str(value) => Ok(Operation::string(value)),
        };

        let identifier = select! {
            Token::Ident { name, path } => (name, path),
        };

        let arguments = operand
            .clone()
            .separated_by(just(tokens.args_sep.clone()))
            .collect::<Vec<BoolexResult<Operation<C>>>>()
            .delimited_by(just(tokens.args_start.clone()), just(tokens.args_end.clone()));

        // Where the grammar cannot tell a call from a variable reference,
        // the argument list decides: try the call first, fall back to the
        // bare identifier.
        let call = identifier.clone().then(arguments).map(
            move |((name, path), arguments)| {
                let arguments = arguments.into_iter().collect::<BoolexResult<Vec<_>>>()?;
                reducer.function(&name, &path, arguments)
            },
        );

        let variable = identifier.map(move |(name, path)| reducer.variable(&name, &path));

        choice((set, literal, call, variable))
    })
    .memoized();

    let atom = choice((
        operand,
        expression.clone().delimited_by(
            just(tokens.group_start.clone()),
            just(tokens.group_end.clone()),
        ),
    ))
    .memoized();

    let relational_op = select! {
        Token::Op(OpToken::Eq) => OpToken::Eq,
        Token::Op(OpToken::Ne) => OpToken::Ne,
        Token::Op(OpToken::Lt) => OpToken::Lt,
        Token::Op(OpToken::Gt) => OpToken::Gt,
        Token::Op(OpToken::Le) => OpToken::Le,
        Token::Op(OpToken::Ge) => OpToken::Ge,
    };

    // Relational and membership operators don't chain: at most one
    // operator at each level.
    let relational = atom
        .clone()
        .then(relational_op.then(atom).or_not())
        .map(|(left, rest)| match rest {
            None => left,
            Some((op, right)) => build_relational(op, left?, right?),
        });

    let membership_op = select! {
        Token::Op(OpToken::BelongsTo) => OpToken::BelongsTo,
        Token::Op(OpToken::IsSubset) => OpToken::IsSubset,
    };

    let membership_tokens = tokens.clone();
    let membership = relational
        .clone()
        .then(membership_op.then(relational).or_not())
        .map(move |(left, rest)| match rest {
            None => left,
            Some((op, right)) => build_membership(op, left?, right?, &membership_tokens),
        });

    let negation = just(Token::Op(OpToken::Not))
        .repeated()
        .foldr(membership, |_, operand| {
            operand.and_then(Operation::negation)
        });

    let conjunction = negation.clone().foldl(
        just(Token::Op(OpToken::And))
            .ignore_then(negation)
            .repeated(),
        |left, right| Operation::conjunction(left?, right?),
    );

    let exclusive = conjunction.clone().foldl(
        just(Token::Op(OpToken::Xor))
            .ignore_then(conjunction)
            .repeated(),
        |left, right| Operation::exclusive_disjunction(left?, right?),
    );

    let disjunction = exclusive.clone().foldl(
        just(Token::Op(OpToken::Or))
            .ignore_then(exclusive)
            .repeated(),
        |left, right| Operation::disjunction(left?, right?),
    );

    expression.define(disjunction);
    expression
}

/// Run the whole pipeline for one expression.
fn parse_root<C, R>(
    grammar: &Grammar<C>,
    reducer: &R,
    expression: &str,
) -> BoolexResult<Operation<C>>
where
    R: Reduce<C> + ?Sized,
{
    if let Some(generator) = grammar.operation_generator() {
        if let Some(result) = generator(expression) {
            return result;
        }
    }

    let tokens = Lexer::new(grammar).tokenize(expression)?;
    let cascade = expression_parser(CascadeTokens::new(grammar), reducer);
    match cascade
        .then_ignore(end())
        .parse(tokens.as_slice())
        .into_result()
    {
        Ok(node) => node,
        Err(errors) => {
            let details: Vec<String> = errors.iter().map(|error| error.to_string()).collect();
            Err(BoolexError::Parsing(details.join("; ")))
        }
    }
}

/// Resolves identifiers against a symbol table.
struct ScopedReducer<'a, C> {
    table: &'a SymbolTable<C>,
    namespace_separator: String,
}

impl<C> ScopedReducer<'_, C> {
    fn qualified(&self, name: &str, path: &NamespacePath) -> String {
        let mut qualified = String::new();
        for segment in path {
            qualified.push_str(segment);
            qualified.push_str(&self.namespace_separator);
        }
        qualified.push_str(name);
        qualified
    }
}

impl<C> Reduce<C> for ScopedReducer<'_, C> {
    fn variable(&self, name: &str, path: &NamespacePath) -> BoolexResult<Operation<C>> {
        match self.table.resolve(path, name)? {
            BindTarget::Variable(variable) => Ok(Operation::Variable(Arc::clone(variable))),
            BindTarget::Function(_) => Err(BoolexError::BadExpression(format!(
                "\"{}\" represents a function, not a variable",
                self.qualified(name, path)
            ))),
        }
    }

    fn function(
        &self,
        name: &str,
        path: &NamespacePath,
        arguments: Vec<Operation<C>>,
    ) -> BoolexResult<Operation<C>> {
        match self.table.resolve(path, name)? {
            BindTarget::Function(function) => Ok(Operation::Function(FunctionCall::new(
                name,
                Arc::clone(function),
                arguments,
            )?)),
            BindTarget::Variable(_) => Err(BoolexError::BadExpression(format!(
                "\"{}\" is not a function",
                self.qualified(name, path)
            ))),
        }
    }
}

/// Emits placeholders without resolving anything.
struct PlaceholderReducer;

impl<C> Reduce<C> for PlaceholderReducer {
    fn variable(&self, name: &str, path: &NamespacePath) -> BoolexResult<Operation<C>> {
        Ok(Operation::PlaceholderVariable(PlaceholderVariable::new(
            name,
            path.clone(),
        )))
    }

    fn function(
        &self,
        name: &str,
        path: &NamespacePath,
        arguments: Vec<Operation<C>>,
    ) -> BoolexResult<Operation<C>> {
        Ok(Operation::PlaceholderFunction(PlaceholderFunction::new(
            name,
            path.clone(),
            arguments,
        )))
    }
}

/// Parser producing truth-evaluable trees.
///
/// Identifiers must resolve against the namespace the parser was built
/// with: an identifier used bare must name a variable, an identifier used
/// as a call must name a function.
pub struct EvaluableParser<C> {
    grammar: Grammar<C>,
    table: Arc<SymbolTable<C>>,
}

impl<C> EvaluableParser<C> {
    /// Create a parser over `grammar` resolving names in `root`, localised
    /// for `locale` (global names when `None`).
    ///
    /// The symbol table is derived here, once; repeated `parse` calls
    /// reuse it.
    pub fn new(grammar: Grammar<C>, root: &Namespace<C>, locale: Option<&str>) -> Self {
        let table = root.symbol_table(locale);
        EvaluableParser { grammar, table }
    }

    /// Parse `expression` into an evaluable tree.
    pub fn parse(&self, expression: &str) -> BoolexResult<EvaluableTree<C>> {
        debug!("parsing evaluable expression {:?}", expression);
        let reducer = ScopedReducer {
            table: &self.table,
            namespace_separator: self
                .grammar
                .token(TokenKey::NamespaceSeparator)
                .to_string(),
        };
        let root = parse_root(&self.grammar, &reducer, expression)?;
        EvaluableTree::new(root)
    }

    pub fn grammar(&self) -> &Grammar<C> {
        &self.grammar
    }
}

/// Parser producing convertible trees.
///
/// No scope is involved: identifiers stay symbolic as placeholders, to be
/// interpreted by a converter.
pub struct ConvertibleParser<C> {
    grammar: Grammar<C>,
}

impl<C> ConvertibleParser<C> {
    pub fn new(grammar: Grammar<C>) -> Self {
        ConvertibleParser { grammar }
    }

    /// Parse `expression` into a convertible tree.
    pub fn parse(&self, expression: &str) -> BoolexResult<ConvertibleTree<C>> {
        debug!("parsing convertible expression {:?}", expression);
        let root = parse_root(&self.grammar, &PlaceholderReducer, expression)?;
        Ok(ConvertibleTree::new(root))
    }

    pub fn grammar(&self) -> &Grammar<C> {
        &self.grammar
    }
}
