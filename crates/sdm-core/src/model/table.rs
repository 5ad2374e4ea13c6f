use crate::{
    SYNTHESIZED_PK_SUFFIX,
    model::{ColumnDef, FieldModel, IndexDef, IndexKind},
    registry::{RegistryError, tag::FieldTag},
};
use std::collections::HashMap;

///
/// TableInfo
///
/// Registry entry for one record type: table name, ordered columns and
/// derived indexes. Built once and shared read-only afterwards.
///

#[derive(Clone, Debug)]
pub struct TableInfo {
    type_name: &'static str,
    table_name: String,
    columns: Vec<ColumnDef>,
    indexes: Vec<IndexDef>,
    column_lookup: HashMap<String, usize>,
    primary_index: Option<usize>,
}

impl TableInfo {
    /// Assemble an entry from already-parsed parts. No primary key is
    /// synthesized here; see `from_fields` for the tag-driven path.
    pub fn new(
        type_name: &'static str,
        table_name: impl Into<String>,
        columns: Vec<ColumnDef>,
        indexes: Vec<IndexDef>,
    ) -> Self {
        let column_lookup = columns
            .iter()
            .enumerate()
            .map(|(pos, col)| (col.name.clone(), pos))
            .collect();
        let primary_index = indexes.iter().position(IndexDef::is_primary);

        Self {
            type_name,
            table_name: table_name.into(),
            columns,
            indexes,
            column_lookup,
            primary_index,
        }
    }

    /// Parse field tags into columns and indexes.
    ///
    /// Fields without a tag or that are not exported are skipped. A lone
    /// auto-increment column gets a synthesized `<table>_pk` primary index
    /// when no primary index was declared.
    pub(crate) fn from_fields(
        type_name: &'static str,
        table_name: &str,
        fields: &[FieldModel],
    ) -> Result<Self, RegistryError> {
        let mut columns = Vec::with_capacity(fields.len());
        let mut indexes: Vec<IndexDef> = Vec::new();
        let mut auto_increment: Vec<usize> = Vec::new();

        for field in fields {
            let Some(tag) = field.tag else {
                continue;
            };
            if !field.exported {
                continue;
            }

            let parsed = FieldTag::parse(tag).map_err(|source| RegistryError::MalformedTag {
                type_name,
                field: field.ident,
                tag: tag.to_string(),
                source,
            })?;

            let mut column = ColumnDef::new(field.id, parsed.column.clone(), field.kind);
            column.nullable = field.nullable;
            if parsed.auto_increment {
                column.auto_increment = true;
                auto_increment.push(columns.len());
            }

            for (kind, name) in parsed.indexes {
                let pos = match indexes.iter().position(|i| i.name == name) {
                    Some(pos) => pos,
                    None => {
                        indexes.push(IndexDef::new(kind, name));
                        indexes.len() - 1
                    }
                };
                indexes[pos].columns.push(parsed.column.clone());
            }

            columns.push(column);
        }

        let has_primary = indexes.iter().any(IndexDef::is_primary);
        if let [ai] = auto_increment.as_slice()
            && !has_primary
        {
            let name = format!("{table_name}{SYNTHESIZED_PK_SUFFIX}");
            let column = columns[*ai].name.clone();
            indexes.push(IndexDef::new(IndexKind::Primary, name).with_columns([column]));
        }

        Ok(Self::new(type_name, table_name, columns, indexes))
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// All mapped columns in field declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Columns that take a value on INSERT (auto-increment excluded).
    pub fn insert_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| !c.auto_increment)
    }

    #[must_use]
    pub fn indexes(&self) -> &[IndexDef] {
        &self.indexes
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.column_lookup.get(name).map(|pos| &self.columns[*pos])
    }

    #[must_use]
    pub fn primary_index(&self) -> Option<&IndexDef> {
        self.primary_index.map(|pos| &self.indexes[pos])
    }

    /// Column to write the generated identifier into after an insert.
    ///
    /// Requires exactly one primary index, over exactly one column, and
    /// that column must be auto-increment.
    #[must_use]
    pub fn backfill_column(&self) -> Option<&ColumnDef> {
        let mut primaries = self.indexes.iter().filter(|i| i.is_primary());
        let primary = primaries.next()?;
        if primaries.next().is_some() {
            return None;
        }

        let [name] = primary.columns.as_slice() else {
            return None;
        };

        self.column(name).filter(|c| c.auto_increment)
    }

    /// Field ordinal to column name, for extensions.
    #[must_use]
    pub fn field_columns(&self) -> HashMap<usize, String> {
        self.columns
            .iter()
            .map(|c| (c.field_id, c.name.clone()))
            .collect()
    }
}

///
/// TESTS
///
