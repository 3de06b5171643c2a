//! Lexical analysis.
//!
//! The grammar's token strings are only known at runtime, so the lexer is
//! generated from a [`Grammar`](crate::parser::Grammar) snapshot each time
//! a parser is built. It produces the `Token` stream the precedence
//! cascade in [`parsers`](crate::parser::parsers) consumes.
//!
//! Matching rules, in order of attempt at each position:
//!
//! 1. string literals (custom scanner, or the configured delimiters);
//! 2. number literals (custom scanner, or signed/grouped decimal digits);
//! 3. symbolic operator and punctuation tokens, longest match first,
//!    case-insensitively;
//! 4. words: unicode identifiers — possibly qualified by the namespace
//!    separator — with word-shaped operator tokens recognised on the way.
//!
//! Identifiers and namespace segments are lower-cased here, which is what
//! makes every later comparison case-insensitive.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{BoolexError, BoolexResult};
use crate::nodes::NamespacePath;
use crate::parser::grammar::{
    Grammar, NumberGenerator, SettingKey, StringGenerator, TokenKey,
};

/// Operator roles, resolved by the lexer from the configured strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum OpToken {
    Not,
    And,
    Or,
    Xor,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    BelongsTo,
    IsSubset,
}

impl OpToken {
    const ALL: [(OpToken, TokenKey); 12] = [
        (OpToken::Not, TokenKey::Not),
        (OpToken::And, TokenKey::And),
        (OpToken::Or, TokenKey::Or),
        (OpToken::Xor, TokenKey::Xor),
        (OpToken::Eq, TokenKey::Eq),
        (OpToken::Ne, TokenKey::Ne),
        (OpToken::Le, TokenKey::Le),
        (OpToken::Ge, TokenKey::Ge),
        (OpToken::Lt, TokenKey::Lt),
        (OpToken::Gt, TokenKey::Gt),
        (OpToken::BelongsTo, TokenKey::BelongsTo),
        (OpToken::IsSubset, TokenKey::IsSubset),
    ];
}

/// A lexical token.
///
/// Punctuation carries the configured string it matched: token roles that
/// share a string (by default `group_start` and `arguments_start` are both
/// `(`) become one token value, and the cascade sorts the ambiguity out by
/// context, exactly like the reference grammar did.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Ident { name: String, path: NamespacePath },
    Number(f64),
    Str(String),
    Op(OpToken),
    Punct(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident { name, path } => {
                for segment in path {
                    write!(f, "{}:", segment)?;
                }
                write!(f, "{}", name)
            }
            Token::Number(value) => write!(f, "{}", value),
            Token::Str(value) => write!(f, "\"{}\"", value),
            Token::Op(op) => write!(f, "{:?}", op),
            Token::Punct(value) => write!(f, "{}", value),
        }
    }
}

/// Everything the lexer needs, extracted from a grammar.
pub(crate) struct Lexer {
    /// Symbolic operator/punctuation strings, longest first.
    symbols: Vec<(String, Symbol)>,
    /// Word-shaped operator strings, lower-cased.
    word_ops: Vec<(String, OpToken)>,
    string_start: String,
    string_end: String,
    positive_sign: String,
    negative_sign: String,
    decimal_separator: String,
    thousands_separator: String,
    identifier_spacing: String,
    namespace_separator: String,
    optional_positive_sign: bool,
    custom_string: Option<Arc<StringGenerator>>,
    custom_number: Option<Arc<NumberGenerator>>,
}

#[derive(Debug, Clone, PartialEq)]
enum Symbol {
    Op(OpToken),
    Punct(String),
}

const PUNCT_KEYS: [TokenKey; 8] = [
    TokenKey::SetStart,
    TokenKey::SetEnd,
    TokenKey::ElementSeparator,
    TokenKey::GroupStart,
    TokenKey::GroupEnd,
    TokenKey::ArgumentsStart,
    TokenKey::ArgumentsEnd,
    TokenKey::ArgumentsSeparator,
];

impl Lexer {
    pub(crate) fn new<C>(grammar: &Grammar<C>) -> Self {
        let identifier_spacing = grammar.token(TokenKey::IdentifierSpacing).to_string();

        let word_shaped = |token: &str| {
            token
                .chars()
                .all(|c| c.is_alphanumeric() || identifier_spacing.contains(c))
        };

        let mut symbols: Vec<(String, Symbol)> = Vec::new();
        let mut word_ops: Vec<(String, OpToken)> = Vec::new();
        for (op, key) in OpToken::ALL {
            let token = grammar.token(key).to_string();
            if word_shaped(&token) {
                word_ops.push((token.to_lowercase(), op));
            } else {
                symbols.push((token, Symbol::Op(op)));
            }
        }
        for key in PUNCT_KEYS {
            let token = grammar.token(key).to_string();
            // Roles sharing one string collapse into a single entry.
            if !symbols.iter().any(|(existing, _)| *existing == token) {
                symbols.push((token.clone(), Symbol::Punct(token)));
            }
        }
        // Longest first, operators before punctuation on equal length.
        symbols.sort_by(|(left, a), (right, b)| {
            right
                .chars()
                .count()
                .cmp(&left.chars().count())
                .then_with(|| match (a, b) {
                    (Symbol::Op(_), Symbol::Punct(_)) => std::cmp::Ordering::Less,
                    (Symbol::Punct(_), Symbol::Op(_)) => std::cmp::Ordering::Greater,
                    _ => std::cmp::Ordering::Equal,
                })
        });

        Lexer {
            symbols,
            word_ops,
            string_start: grammar.token(TokenKey::StringStart).to_string(),
            string_end: grammar.token(TokenKey::StringEnd).to_string(),
            positive_sign: grammar.token(TokenKey::PositiveSign).to_string(),
            negative_sign: grammar.token(TokenKey::NegativeSign).to_string(),
            decimal_separator: grammar.token(TokenKey::DecimalSeparator).to_string(),
            thousands_separator: grammar.token(TokenKey::ThousandsSeparator).to_string(),
            identifier_spacing,
            namespace_separator: grammar.token(TokenKey::NamespaceSeparator).to_string(),
            optional_positive_sign: grammar.setting(SettingKey::OptionalPositiveSign),
            custom_string: grammar.string_generator().cloned(),
            custom_number: grammar.number_generator().cloned(),
        }
    }

    /// Turn `input` into a token stream.
    pub(crate) fn tokenize(&self, input: &str) -> BoolexResult<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut index = 0;
        while index < input.len() {
            let rest = &input[index..];
            let first = rest.chars().next().expect("index is a char boundary");
            if first.is_whitespace() {
                index += first.len_utf8();
                continue;
            }

            if let Some((token, consumed)) = self.lex_string(rest, index)? {
                tokens.push(token);
                index += consumed;
                continue;
            }
            if let Some((token, consumed)) = self.lex_number(rest) {
                tokens.push(token);
                index += consumed;
                continue;
            }
            if let Some((token, consumed)) = self.lex_symbol(rest) {
                tokens.push(token);
                index += consumed;
                continue;
            }
            if let Some((token, consumed)) = self.lex_word(rest) {
                tokens.push(token);
                index += consumed;
                continue;
            }

            return Err(BoolexError::Parsing(format!(
                "unexpected character {:?} at offset {}",
                first, index
            )));
        }
        Ok(tokens)
    }

    fn lex_string(&self, rest: &str, offset: usize) -> BoolexResult<Option<(Token, usize)>> {
        if let Some(scanner) = &self.custom_string {
            return Ok(match scanner(rest) {
                Some((value, consumed)) if consumed > 0 => {
                    Some((Token::Str(value), consumed))
                }
                _ => None,
            });
        }
        if !rest.starts_with(&self.string_start) {
            return Ok(None);
        }
        let contents = &rest[self.string_start.len()..];
        match contents.find(&self.string_end) {
            Some(position) => {
                let consumed = self.string_start.len() + position + self.string_end.len();
                Ok(Some((Token::Str(contents[..position].to_string()), consumed)))
            }
            None => Err(BoolexError::Parsing(format!(
                "unclosed string literal starting at offset {}",
                offset
            ))),
        }
    }

    fn lex_number(&self, rest: &str) -> Option<(Token, usize)> {
        if let Some(scanner) = &self.custom_number {
            return match scanner(rest) {
                Some((value, consumed)) if consumed > 0 => {
                    Some((Token::Number(value), consumed))
                }
                _ => None,
            };
        }

        let digit_at = |at: usize| {
            rest[at..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit())
        };

        let mut index = 0;
        let mut negative = false;
        if rest.starts_with(&self.negative_sign) && digit_at(self.negative_sign.len()) {
            negative = true;
            index = self.negative_sign.len();
        } else if rest.starts_with(&self.positive_sign) && digit_at(self.positive_sign.len()) {
            index = self.positive_sign.len();
        } else if !self.optional_positive_sign || !digit_at(0) {
            return None;
        }

        let (mut digits, integer_len) = self.lex_integer_part(&rest[index..]);
        index += integer_len;

        if rest[index..].starts_with(&self.decimal_separator) {
            let after = index + self.decimal_separator.len();
            let fraction: String = rest[after..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if !fraction.is_empty() {
                digits.push('.');
                digits.push_str(&fraction);
                index = after + fraction.len();
            }
        }

        let value: f64 = digits.parse().ok()?;
        Some((Token::Number(if negative { -value } else { value }), index))
    }

    /// Plain digits, or groups of exactly three digits separated by the
    /// thousands separator with a leading group of one to three.
    fn lex_integer_part(&self, rest: &str) -> (String, usize) {
        let lead: String = rest
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();

        if !lead.is_empty() && lead.len() <= 3 {
            let mut digits = lead.clone();
            let mut index = lead.len();
            let mut grouped = false;
            loop {
                let after_sep = &rest[index..];
                if !after_sep.starts_with(&self.thousands_separator) {
                    break;
                }
                let group_start = index + self.thousands_separator.len();
                let group: String = rest[group_start..]
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                if group.len() != 3 {
                    break;
                }
                digits.push_str(&group);
                index = group_start + group.len();
                grouped = true;
            }
            if grouped {
                return (digits, index);
            }
        }
        let consumed = lead.len();
        (lead, consumed)
    }

    fn lex_symbol(&self, rest: &str) -> Option<(Token, usize)> {
        for (token, symbol) in &self.symbols {
            if let Some(consumed) = caseless_prefix(rest, token) {
                let token = match symbol {
                    Symbol::Op(op) => Token::Op(*op),
                    Symbol::Punct(value) => Token::Punct(value.clone()),
                };
                return Some((token, consumed));
            }
        }
        None
    }

    fn is_word_start(&self, c: char) -> bool {
        c.is_alphabetic() || self.identifier_spacing.contains(c)
    }

    fn is_word_char(&self, c: char) -> bool {
        c.is_alphanumeric() || self.identifier_spacing.contains(c)
    }

    fn lex_word(&self, rest: &str) -> Option<(Token, usize)> {
        let first = rest.chars().next()?;
        if !self.is_word_start(first) {
            return None;
        }
        let (segment, mut index) = self.lex_segment(rest);

        if let Some((_, op)) = self
            .word_ops
            .iter()
            .find(|(token, _)| *token == segment.to_lowercase())
        {
            return Some((Token::Op(*op), index));
        }

        // A qualified identifier: contiguous segments joined by the
        // namespace separator, last segment being the name itself.
        let mut segments: SmallVec<[String; 2]> = SmallVec::new();
        segments.push(segment.to_lowercase());
        loop {
            let after = &rest[index..];
            if !after.starts_with(&self.namespace_separator) {
                break;
            }
            let next = &after[self.namespace_separator.len()..];
            match next.chars().next() {
                Some(c) if self.is_word_start(c) => {
                    let (segment, consumed) = self.lex_segment(next);
                    segments.push(segment.to_lowercase());
                    index += self.namespace_separator.len() + consumed;
                }
                _ => break,
            }
        }

        let name = segments.pop().expect("at least one segment");
        Some((
            Token::Ident {
                name,
                path: segments,
            },
            index,
        ))
    }

    fn lex_segment(&self, rest: &str) -> (String, usize) {
        let segment: String = rest.chars().take_while(|c| self.is_word_char(*c)).collect();
        let consumed = segment.len();
        (segment, consumed)
    }
}

/// Case-insensitive prefix match; returns the byte length of the matched
/// prefix of `rest`.
fn caseless_prefix(rest: &str, token: &str) -> Option<usize> {
    let mut rest_chars = rest.chars();
    let mut consumed = 0;
    for expected in token.chars() {
        let actual = rest_chars.next()?;
        if actual != expected && !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
        consumed += actual.len_utf8();
    }
    Some(consumed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::grammar::Grammar;

    fn lex(input: &str) -> Vec<Token> {
        let grammar: Grammar<()> = Grammar::new();
        Lexer::new(&grammar)
            .tokenize(input)
            .expect("input should tokenize")
    }

    #[test]
    fn numbers_with_groups_and_decimals() {
        assert_eq!(lex("1,234.5"), vec![Token::Number(1234.5)]);
        assert_eq!(lex("-2"), vec![Token::Number(-2.0)]);
        assert_eq!(lex("+0.5"), vec![Token::Number(0.5)]);
        // Not a valid group: falls back to a plain number and punctuation.
        assert_eq!(
            lex("{1,22}"),
            vec![
                Token::Punct("{".to_string()),
                Token::Number(1.0),
                Token::Punct(",".to_string()),
                Token::Number(22.0),
                Token::Punct("}".to_string()),
            ]
        );
    }

    #[test]
    fn qualified_identifiers_are_lowercased() {
        assert_eq!(
            lex("NS:Sub:Var"),
            vec![Token::Ident {
                name: "var".to_string(),
                path: ["ns".to_string(), "sub".to_string()].into_iter().collect(),
            }]
        );
    }

    #[test]
    fn qualified_names_must_be_contiguous() {
        // A detached separator doesn't bind to the identifier, and has no
        // meaning of its own.
        let grammar: Grammar<()> = Grammar::new();
        let error = Lexer::new(&grammar).tokenize("ns :x").unwrap_err();
        assert!(error.is_parsing(), "got {:?}", error);
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(
            lex("a <= b"),
            vec![
                Token::Ident {
                    name: "a".to_string(),
                    path: NamespacePath::new()
                },
                Token::Op(OpToken::Le),
                Token::Ident {
                    name: "b".to_string(),
                    path: NamespacePath::new()
                },
            ]
        );
    }

    #[test]
    fn unicode_identifiers() {
        assert_eq!(
            lex("vélocité"),
            vec![Token::Ident {
                name: "vélocité".to_string(),
                path: NamespacePath::new()
            }]
        );
    }

    #[test]
    fn word_operators_match_caselessly() {
        let mut grammar: Grammar<()> = Grammar::new();
        grammar.set_token("and", "and").unwrap();
        let tokens = Lexer::new(&grammar).tokenize("x AND y").unwrap();
        assert_eq!(tokens[1], Token::Op(OpToken::And));
    }

    #[test]
    fn unterminated_string_fails() {
        let grammar: Grammar<()> = Grammar::new();
        let error = Lexer::new(&grammar).tokenize("\"oops").unwrap_err();
        assert!(error.is_parsing());
    }
}
