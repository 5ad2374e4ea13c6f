use crate::value::FieldKind;

///
/// ColumnDef
///
/// One mapped column. Immutable once the registry has built it, and owned
/// by exactly one `TableInfo`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnDef {
    /// Ordinal of the struct field backing this column.
    pub field_id: usize,
    pub name: String,
    pub auto_increment: bool,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl ColumnDef {
    pub fn new(field_id: usize, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            field_id,
            name: name.into(),
            auto_increment: false,
            kind,
            nullable: false,
        }
    }

    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}
