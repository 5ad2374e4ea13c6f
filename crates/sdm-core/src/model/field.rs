use crate::value::FieldKind;

///
/// FieldModel
/// Macro-generated description of one struct field, in declaration order.
///
/// Untagged and private fields are listed too; the registry decides which
/// ones participate in the mapping.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldModel {
    /// Declaration ordinal; also the key for `Record::get_value`/`set_value`.
    pub id: usize,
    /// Rust field identifier.
    pub ident: &'static str,
    /// Raw `#[sdm("...")]` tag text, if any.
    pub tag: Option<&'static str>,
    /// Whether the field is `pub` (only exported fields are mapped).
    pub exported: bool,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl FieldModel {
    #[must_use]
    pub const fn new(
        id: usize,
        ident: &'static str,
        tag: Option<&'static str>,
        exported: bool,
        kind: FieldKind,
        nullable: bool,
    ) -> Self {
        Self {
            id,
            ident,
            tag,
            exported,
            kind,
            nullable,
        }
    }

    /// Field takes part in the column mapping.
    #[must_use]
    pub const fn is_mapped(&self) -> bool {
        self.exported && self.tag.is_some()
    }
}
