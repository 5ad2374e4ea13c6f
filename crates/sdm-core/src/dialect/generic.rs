use crate::dialect::{Dialect, DialectError, DialectParams};
use derive_more::Display;

///
/// QuoteStyle
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum QuoteStyle {
    #[default]
    #[display("bare")]
    Bare,
    #[display("double")]
    DoubleQuote,
    #[display("backtick")]
    Backtick,
    #[display("bracket")]
    Bracket,
}

impl QuoteStyle {
    pub const ALL: [Self; 4] = [Self::Bare, Self::DoubleQuote, Self::Backtick, Self::Bracket];

    /// Quote `ident`, doubling any embedded closing character.
    #[must_use]
    pub fn apply(self, ident: &str) -> String {
        let (open, close) = match self {
            Self::Bare => return ident.to_string(),
            Self::DoubleQuote => ('"', '"'),
            Self::Backtick => ('`', '`'),
            Self::Bracket => ('[', ']'),
        };

        let mut quoted = String::with_capacity(ident.len() + 2);
        quoted.push(open);
        for c in ident.chars() {
            if c == close {
                quoted.push(close);
            }
            quoted.push(c);
        }
        quoted.push(close);

        quoted
    }
}

///
/// GenericDialect
///
/// Quoting plus the trait defaults: bare columns in every position, `?`
/// placeholders, no adapters, no DDL.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GenericDialect {
    name: String,
    style: QuoteStyle,
}

impl GenericDialect {
    #[must_use]
    pub fn new(style: QuoteStyle) -> Self {
        Self::named("generic", style)
    }

    pub fn named(name: impl Into<String>, style: QuoteStyle) -> Self {
        Self {
            name: name.into(),
            style,
        }
    }

    /// Build from catalog parameters; `quote` selects the style.
    pub fn from_params(
        name: &str,
        default: QuoteStyle,
        params: &DialectParams,
    ) -> Result<Self, DialectError> {
        let style = match params.get("quote") {
            None => default,
            Some(value) => QuoteStyle::ALL
                .into_iter()
                .find(|s| s.to_string() == *value)
                .ok_or_else(|| DialectError::InvalidParam {
                    dialect: name.to_string(),
                    name: "quote".to_string(),
                    value: value.clone(),
                })?,
        };

        Ok(Self::named(name, style))
    }

    #[must_use]
    pub const fn style(&self) -> QuoteStyle {
        self.style
    }
}

impl Default for GenericDialect {
    fn default() -> Self {
        Self::new(QuoteStyle::Bare)
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &str {
        &self.name
    }

    fn quote(&self, ident: &str) -> String {
        self.style.apply(ident)
    }
}

///
/// TESTS
///
