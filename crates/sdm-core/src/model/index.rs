use derive_more::FromStr;
use std::fmt::{self, Display};

///
/// IndexKind
///
/// Tag prefixes: `pri_`, `uniq_`, `idx_`.
///

#[derive(Clone, Copy, Debug, Eq, FromStr, Hash, PartialEq)]
pub enum IndexKind {
    Primary,
    Unique,
    Index,
}

impl IndexKind {
    /// Kinds in the order the tag parser tries their prefixes.
    pub const ALL: [Self; 3] = [Self::Index, Self::Primary, Self::Unique];

    /// Tag prefix (without the trailing underscore).
    #[must_use]
    pub const fn tag_prefix(self) -> &'static str {
        match self {
            Self::Primary => "pri",
            Self::Unique => "uniq",
            Self::Index => "idx",
        }
    }
}

impl Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_prefix())
    }
}

///
/// IndexDef
///
/// Named group of columns. Column order is the order fields were declared,
/// not alphabetical.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexDef {
    pub kind: IndexKind,
    pub name: String,
    pub columns: Vec<String>,
}

impl IndexDef {
    pub fn new(kind: IndexKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    #[must_use]
    pub const fn is_primary(&self) -> bool {
        matches!(self.kind, IndexKind::Primary)
    }
}

impl Display for IndexDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}({})", self.kind, self.name, self.columns.join(", "))
    }
}
