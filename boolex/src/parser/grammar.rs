//! Adaptive grammar definition.
//!
//! A [`Grammar`] holds the properties of the surface syntax — token
//! strings, boolean settings, optional custom sub-parsers — but cannot
//! parse anything by itself; generating a parser out of it is the job of
//! the types in [`parsers`](crate::parser::parsers).
//!
//! Every key set is fixed. Accessing an unknown token, setting or
//! generator name fails with a [`Grammar`](BoolexError::Grammar) error
//! instead of silently inventing a key.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use strum::{Display, EnumIter, EnumString};

use crate::error::{BoolexError, BoolexResult};
use crate::nodes::Operation;

/// The fixed set of configurable tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum TokenKey {
    // Logical connectives.
    Not,
    And,
    Or,
    Xor,
    // Relational operators.
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    // Set operators and delimiters.
    BelongsTo,
    IsSubset,
    SetStart,
    SetEnd,
    ElementSeparator,
    // Grouping marks.
    StringStart,
    StringEnd,
    GroupStart,
    GroupEnd,
    // Function arguments.
    ArgumentsStart,
    ArgumentsEnd,
    ArgumentsSeparator,
    // Numeric tokens.
    PositiveSign,
    NegativeSign,
    DecimalSeparator,
    ThousandsSeparator,
    // Miscellaneous.
    IdentifierSpacing,
    NamespaceSeparator,
}

impl TokenKey {
    /// The default string for this token.
    pub fn default_token(self) -> &'static str {
        match self {
            TokenKey::Not => "~",
            TokenKey::And => "&",
            TokenKey::Or => "|",
            TokenKey::Xor => "^",
            TokenKey::Eq => "==",
            TokenKey::Ne => "!=",
            TokenKey::Lt => "<",
            TokenKey::Gt => ">",
            TokenKey::Le => "<=",
            TokenKey::Ge => ">=",
            TokenKey::BelongsTo => "∈",
            TokenKey::IsSubset => "⊂",
            TokenKey::SetStart => "{",
            TokenKey::SetEnd => "}",
            TokenKey::ElementSeparator => ",",
            TokenKey::StringStart => "\"",
            TokenKey::StringEnd => "\"",
            TokenKey::GroupStart => "(",
            TokenKey::GroupEnd => ")",
            TokenKey::ArgumentsStart => "(",
            TokenKey::ArgumentsEnd => ")",
            TokenKey::ArgumentsSeparator => ",",
            TokenKey::PositiveSign => "+",
            TokenKey::NegativeSign => "-",
            TokenKey::DecimalSeparator => ".",
            TokenKey::ThousandsSeparator => ",",
            TokenKey::IdentifierSpacing => "_",
            TokenKey::NamespaceSeparator => ":",
        }
    }
}

/// The fixed set of boolean grammar settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SettingKey {
    /// In an `is_subset` operation, the right-hand operand is the superset.
    SupersetRightInIsSubset,
    /// In a `belongs_to` operation, the right-hand operand is the set.
    SetRightInContains,
    /// Numbers may omit the positive sign; when `false` every number must
    /// be explicitly signed.
    OptionalPositiveSign,
}

impl SettingKey {
    pub fn default_setting(self) -> bool {
        // All of them default to true.
        true
    }
}

/// The fixed set of overridable sub-parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum GeneratorKey {
    Operation,
    String,
    Number,
}

/// Custom scanner for string literals: given the remaining input, return
/// the string contents and the number of bytes consumed.
pub type StringGenerator = dyn Fn(&str) -> Option<(String, usize)> + Send + Sync;

/// Custom scanner for number literals: given the remaining input, return
/// the numeric value and the number of bytes consumed.
pub type NumberGenerator = dyn Fn(&str) -> Option<(f64, usize)> + Send + Sync;

/// Custom parser for whole operations: given the complete expression,
/// either decline (`None`) or produce the root node for it.
pub type OperationGenerator<C> =
    dyn Fn(&str) -> Option<BoolexResult<Operation<C>>> + Send + Sync;

/// A custom sub-parser, tagged with the sub-parser it overrides.
pub enum CustomGenerator<C> {
    Operation(Arc<OperationGenerator<C>>),
    String(Arc<StringGenerator>),
    Number(Arc<NumberGenerator>),
}

impl<C> CustomGenerator<C> {
    fn key(&self) -> GeneratorKey {
        match self {
            CustomGenerator::Operation(_) => GeneratorKey::Operation,
            CustomGenerator::String(_) => GeneratorKey::String,
            CustomGenerator::Number(_) => GeneratorKey::Number,
        }
    }
}

/// An adaptive grammar.
///
/// Values start out with the default symbolic tokens (`~ & | ^ == != < >
/// <= >= ∈ ⊂ ...`) and can be reconfigured token by token before a parser
/// is generated from them.
pub struct Grammar<C> {
    custom_tokens: BTreeMap<TokenKey, String>,
    custom_settings: BTreeMap<SettingKey, bool>,
    operation_generator: Option<Arc<OperationGenerator<C>>>,
    string_generator: Option<Arc<StringGenerator>>,
    number_generator: Option<Arc<NumberGenerator>>,
}

impl<C> Grammar<C> {
    /// A grammar with every token and setting at its default.
    pub fn new() -> Self {
        Grammar {
            custom_tokens: BTreeMap::new(),
            custom_settings: BTreeMap::new(),
            operation_generator: None,
            string_generator: None,
            number_generator: None,
        }
    }

    /// A grammar with `settings` and `tokens` overridden in one go.
    pub fn with_overrides(
        settings: &[(&str, bool)],
        tokens: &[(&str, &str)],
    ) -> BoolexResult<Self> {
        let mut grammar = Grammar::new();
        for (name, value) in settings {
            grammar.set_setting(name, *value)?;
        }
        for (name, value) in tokens {
            grammar.set_token(name, *value)?;
        }
        Ok(grammar)
    }

    fn token_key(token_name: &str) -> BoolexResult<TokenKey> {
        TokenKey::from_str(token_name)
            .map_err(|_| BoolexError::Grammar(format!("unknown token \"{}\"", token_name)))
    }

    fn setting_key(setting_name: &str) -> BoolexResult<SettingKey> {
        SettingKey::from_str(setting_name)
            .map_err(|_| BoolexError::Grammar(format!("unknown setting \"{}\"", setting_name)))
    }

    /// Return the token called `token_name`, falling back to its default
    /// when it has no custom value.
    pub fn get_token(&self, token_name: &str) -> BoolexResult<&str> {
        Ok(self.token(Self::token_key(token_name)?))
    }

    /// Set the token called `token_name` to `token`.
    pub fn set_token(
        &mut self,
        token_name: &str,
        token: impl Into<String>,
    ) -> BoolexResult<()> {
        let key = Self::token_key(token_name)?;
        let token = token.into();
        if token.is_empty() {
            return Err(BoolexError::Grammar(format!(
                "token \"{}\" cannot be empty",
                token_name
            )));
        }
        self.custom_tokens.insert(key, token);
        Ok(())
    }

    /// Typed token accessor, for parser generation.
    pub fn token(&self, key: TokenKey) -> &str {
        self.custom_tokens
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_token())
    }

    /// Return the value of the setting called `setting_name`.
    pub fn get_setting(&self, setting_name: &str) -> BoolexResult<bool> {
        Ok(self.setting(Self::setting_key(setting_name)?))
    }

    /// Set the setting called `setting_name` to `setting`.
    pub fn set_setting(&mut self, setting_name: &str, setting: bool) -> BoolexResult<()> {
        let key = Self::setting_key(setting_name)?;
        self.custom_settings.insert(key, setting);
        Ok(())
    }

    /// Typed setting accessor, for parser generation.
    pub fn setting(&self, key: SettingKey) -> bool {
        self.custom_settings
            .get(&key)
            .copied()
            .unwrap_or_else(|| key.default_setting())
    }

    /// Install a custom sub-parser; which one is overridden is carried by
    /// the [`CustomGenerator`] variant.
    pub fn set_custom_generator(&mut self, generator: CustomGenerator<C>) {
        match generator {
            CustomGenerator::Operation(generator) => {
                self.operation_generator = Some(generator);
            }
            CustomGenerator::String(generator) => self.string_generator = Some(generator),
            CustomGenerator::Number(generator) => self.number_generator = Some(generator),
        }
    }

    /// Whether the generator called `generator_name` has been overridden.
    pub fn has_custom_generator(&self, generator_name: &str) -> BoolexResult<bool> {
        let key = GeneratorKey::from_str(generator_name).map_err(|_| {
            BoolexError::Grammar(format!("unknown generator \"{}\"", generator_name))
        })?;
        Ok(match key {
            GeneratorKey::Operation => self.operation_generator.is_some(),
            GeneratorKey::String => self.string_generator.is_some(),
            GeneratorKey::Number => self.number_generator.is_some(),
        })
    }

    pub(crate) fn operation_generator(&self) -> Option<&Arc<OperationGenerator<C>>> {
        self.operation_generator.as_ref()
    }

    pub(crate) fn string_generator(&self) -> Option<&Arc<StringGenerator>> {
        self.string_generator.as_ref()
    }

    pub(crate) fn number_generator(&self) -> Option<&Arc<NumberGenerator>> {
        self.number_generator.as_ref()
    }
}

impl<C> Default for Grammar<C> {
    fn default() -> Self {
        Grammar::new()
    }
}

impl<C> Clone for Grammar<C> {
    fn clone(&self) -> Self {
        Grammar {
            custom_tokens: self.custom_tokens.clone(),
            custom_settings: self.custom_settings.clone(),
            operation_generator: self.operation_generator.clone(),
            string_generator: self.string_generator.clone(),
            number_generator: self.number_generator.clone(),
        }
    }
}

impl<C> std::fmt::Debug for Grammar<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("custom_tokens", &self.custom_tokens)
            .field("custom_settings", &self.custom_settings)
            .finish_non_exhaustive()
    }
}
