use crate::{
    dialect::{
        Dialect, DialectError, DialectParams, QuoteStyle, TimestampLenient, Usage, ValueAdapter,
        auto_increment_key, is_indexed,
    },
    model::{ColumnDef, IndexDef, IndexKind},
    value::FieldKind,
};

///
/// MysqlDialect
///
/// Backtick identifiers, table-qualified columns in SELECT and WHERE,
/// bounded VARCHAR / BLOB key prefixes for indexed string columns.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MysqlDialect {
    charset: String,
    collate: String,
    string_size: u16,
    blob_size: u32,
}

impl MysqlDialect {
    pub const NAME: &'static str = "mysql";
    pub const MAX_STRING_SIZE: u16 = 256;
    pub const DEFAULT_BLOB_SIZE: u32 = 2048;

    #[must_use]
    pub fn new() -> Self {
        Self {
            charset: "utf8".to_string(),
            collate: "utf8_general_ci".to_string(),
            string_size: Self::MAX_STRING_SIZE,
            blob_size: Self::DEFAULT_BLOB_SIZE,
        }
    }

    /// Parameters: `charset`, `collate`, `stringSize` (1..=256) and
    /// `blobSize`.
    pub fn from_params(params: &DialectParams) -> Result<Self, DialectError> {
        let mut dialect = Self::new();

        if let Some(charset) = params.get("charset") {
            dialect.charset.clone_from(charset);
        }
        if let Some(collate) = params.get("collate") {
            dialect.collate.clone_from(collate);
        }
        if let Some(size) = params.get("stringSize") {
            dialect.string_size = size
                .parse::<u16>()
                .ok()
                .filter(|s| (1..=Self::MAX_STRING_SIZE).contains(s))
                .ok_or_else(|| invalid("stringSize", size))?;
        }
        if let Some(size) = params.get("blobSize") {
            dialect.blob_size = size
                .parse::<u32>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| invalid("blobSize", size))?;
        }

        Ok(dialect)
    }

    fn column_type(&self, column: &ColumnDef, indexes: &[IndexDef]) -> String {
        let base = match column.kind {
            FieldKind::Bool => "TINYINT(1)",
            FieldKind::Int8 => "TINYINT",
            FieldKind::Int16 => "SMALLINT",
            FieldKind::Int32 => "INT",
            FieldKind::Int64 => "BIGINT",
            FieldKind::Uint8 => "TINYINT UNSIGNED",
            FieldKind::Uint16 => "SMALLINT UNSIGNED",
            FieldKind::Uint32 => "INT UNSIGNED",
            FieldKind::Uint64 => "BIGINT UNSIGNED",
            FieldKind::Float32 => "FLOAT",
            FieldKind::Float64 => "DOUBLE",
            FieldKind::Blob => "BLOB",
            FieldKind::Timestamp => "TIMESTAMP",
            FieldKind::Text => {
                let text = if is_indexed(&column.name, indexes) {
                    format!("VARCHAR({})", self.string_size)
                } else {
                    "TEXT".to_string()
                };
                return format!(
                    "{text} CHARACTER SET {} COLLATE {}",
                    self.charset, self.collate
                );
            }
        };

        base.to_string()
    }

    // index column list; blobs need an explicit key prefix length
    fn key_columns(&self, index: &IndexDef, columns: &[ColumnDef]) -> String {
        index
            .columns
            .iter()
            .map(|name| {
                let quoted = self.quote(name);
                match columns.iter().find(|c| c.name == *name) {
                    Some(c) if c.kind == FieldKind::Blob => format!("{quoted}({})", self.blob_size),
                    _ => quoted,
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for MysqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(name: &str, value: &str) -> DialectError {
    DialectError::InvalidParam {
        dialect: MysqlDialect::NAME.to_string(),
        name: name.to_string(),
        value: value.to_string(),
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn quote(&self, ident: &str) -> String {
        QuoteStyle::Backtick.apply(ident)
    }

    fn column_expr(&self, table: &str, column: &str, usage: Usage) -> String {
        match usage {
            Usage::Select | Usage::Where => {
                format!("{}.{}", self.quote(table), self.quote(column))
            }
            Usage::Insert | Usage::Update => self.quote(column),
        }
    }

    fn scan_adapter(&self, column: &ColumnDef) -> Option<&dyn ValueAdapter> {
        (column.kind == FieldKind::Timestamp).then_some(&TimestampLenient as &dyn ValueAdapter)
    }

    fn create_table(
        &self,
        table: &str,
        columns: &[ColumnDef],
        indexes: &[IndexDef],
        if_not_exists: bool,
    ) -> Result<String, DialectError> {
        let ai = auto_increment_key(table, columns, indexes)?;
        let mut defs = Vec::with_capacity(columns.len() + indexes.len() + 1);

        for column in columns {
            let mut def = format!(
                "{} {}",
                self.quote(&column.name),
                self.column_type(column, indexes)
            );
            if !column.nullable {
                def.push_str(" NOT NULL");
            }
            if column.auto_increment {
                def.push_str(" AUTO_INCREMENT");
            }
            defs.push(def);
        }

        if let Some(key) = &ai {
            defs.push(format!(
                "CONSTRAINT {} PRIMARY KEY ({})",
                self.quote(&key.name),
                self.quote(&key.column.name)
            ));
        }

        for index in indexes {
            let cols = self.key_columns(index, columns);
            let name = self.quote(&index.name);
            let def = match index.kind {
                IndexKind::Primary if ai.is_some() => continue,
                IndexKind::Primary => format!("CONSTRAINT {name} PRIMARY KEY ({cols})"),
                IndexKind::Unique => format!("CONSTRAINT {name} UNIQUE KEY ({cols})"),
                IndexKind::Index => format!("INDEX {name} ({cols})"),
            };
            defs.push(def);
        }

        let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };

        Ok(format!(
            "CREATE TABLE {guard}{} ({}) DEFAULT CHARACTER SET {},DEFAULT COLLATE {}",
            self.quote(table),
            defs.join(","),
            self.charset,
            self.collate
        ))
    }
}

///
/// TESTS
///
