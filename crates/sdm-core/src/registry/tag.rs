use crate::model::IndexKind;
use thiserror::Error as ThisError;

///
/// TagError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TagError {
    #[error("column name is empty")]
    EmptyColumn,

    #[error("empty modifier at position {0}")]
    EmptyModifier(usize),

    #[error("index name is empty in '{0}'")]
    EmptyIndexName(String),

    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),
}

///
/// FieldTag
///
/// Parsed form of `"<column>[,ai][,<kind>_<index>]*"`.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldTag {
    pub column: String,
    pub auto_increment: bool,
    pub indexes: Vec<(IndexKind, String)>,
}

impl FieldTag {
    pub fn parse(tag: &str) -> Result<Self, TagError> {
        let mut tokens = tag.split(',').map(str::trim);

        let column = tokens.next().unwrap_or_default();
        if column.is_empty() {
            return Err(TagError::EmptyColumn);
        }

        let mut parsed = Self {
            column: column.to_string(),
            ..Self::default()
        };

        for (pos, token) in tokens.enumerate() {
            if token.is_empty() {
                return Err(TagError::EmptyModifier(pos + 1));
            }
            if token == "ai" {
                parsed.auto_increment = true;
                continue;
            }

            let (kind, name) = split_index(token)?;
            parsed.indexes.push((kind, name.to_string()));
        }

        Ok(parsed)
    }
}

// split_index
// prefixes are tried in IndexKind::ALL order; the first match wins
fn split_index(token: &str) -> Result<(IndexKind, &str), TagError> {
    for kind in IndexKind::ALL {
        let Some(rest) = token.strip_prefix(kind.tag_prefix()) else {
            continue;
        };
        let Some(name) = rest.strip_prefix('_') else {
            continue;
        };
        if name.is_empty() {
            return Err(TagError::EmptyIndexName(token.to_string()));
        }

        return Ok((kind, name));
    }

    Err(TagError::UnknownModifier(token.to_string()))
}

///
/// TESTS
///
