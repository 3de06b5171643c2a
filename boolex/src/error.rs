//! Error taxonomy shared by every component of the crate.
//!
//! There is one root enumeration with disjoint kinds; nothing is recovered
//! internally, every failure propagates to the API caller and any partially
//! built tree is dropped with it.

use strum::EnumIs;
use thiserror::Error;

/// Unified error enumeration for boolex.
#[derive(Debug, Clone, PartialEq, EnumIs, Error)]
pub enum BoolexError {
    /// An operation was applied to an operand that doesn't support it.
    ///
    /// This covers static misuses (a relational operator over a non-numeric
    /// master, set membership built on a non-set master, an evaluable tree
    /// rooted at a non-boolean node) as well as runtime datatype mismatches
    /// while reading a variable.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A function was called with the wrong arguments.
    #[error("bad function call: {0}")]
    BadCall(String),

    /// A function *declaration* is inconsistent.
    ///
    /// Aimed at the developer registering the function, not at the end user
    /// writing expressions.
    #[error("bad function declaration: {0}")]
    BadFunction(String),

    /// A custom operand declaration is inconsistent.
    #[error("bad operand declaration: {0}")]
    BadOperand(String),

    /// The expression is lexically or syntactically malformed.
    #[error("could not parse the expression: {0}")]
    Parsing(String),

    /// A grammar was configured or queried incorrectly.
    #[error("grammar error: {0}")]
    Grammar(String),

    /// The expression parsed, but an identifier is used as the wrong kind of
    /// thing (e.g. a function name used as a variable).
    #[error("bad expression: {0}")]
    BadExpression(String),

    /// A scope-related item is defined, attached or resolved incorrectly.
    #[error("scope error: {0}")]
    Scope(String),

    /// A parse tree converter received a node it has no callback for.
    #[error("conversion error: {0}")]
    Conversion(String),
}

impl BoolexError {
    /// Whether this error belongs to the parsing family.
    ///
    /// [`Grammar`](Self::Grammar), [`BadExpression`](Self::BadExpression) and
    /// [`Scope`](Self::Scope) are sub-kinds of [`Parsing`](Self::Parsing):
    /// they share the family even though they are distinct kinds.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            BoolexError::Parsing(_)
                | BoolexError::Grammar(_)
                | BoolexError::BadExpression(_)
                | BoolexError::Scope(_)
        )
    }
}

/// Convenience alias for fallible operations returning [`BoolexError`].
pub type BoolexResult<T> = Result<T, BoolexError>;
