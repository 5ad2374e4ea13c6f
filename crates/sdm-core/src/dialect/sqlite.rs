use crate::{
    dialect::{
        Dialect, DialectError, DialectParams, QuoteStyle, TimestampSeconds, TimestampText,
        ValueAdapter, auto_increment_key, quote_list,
    },
    model::{ColumnDef, IndexDef, IndexKind},
    value::FieldKind,
};

///
/// TimeMode
///
/// Storage encoding for timestamp columns.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TimeMode {
    /// Formatted string (see `TimestampText`).
    #[default]
    Text,
    /// Integer unix seconds.
    Unix,
    /// Left to the driver.
    Native,
}

///
/// SqliteDialect
///

#[derive(Clone, Debug, Default)]
pub struct SqliteDialect {
    time_mode: TimeMode,
    text: TimestampText,
}

impl SqliteDialect {
    pub const NAME: &'static str = "sqlite3";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_time_mode(mut self, mode: TimeMode) -> Self {
        self.time_mode = mode;
        self
    }

    #[must_use]
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.text = TimestampText::new(format);
        self
    }

    /// Parameters: `time` (`text`, `unix`, `native`) and `timeFormat`.
    pub fn from_params(params: &DialectParams) -> Result<Self, DialectError> {
        let mut dialect = Self::new();

        if let Some(mode) = params.get("time") {
            dialect.time_mode = match mode.as_str() {
                "text" => TimeMode::Text,
                "unix" => TimeMode::Unix,
                "native" => TimeMode::Native,
                _ => {
                    return Err(DialectError::InvalidParam {
                        dialect: Self::NAME.to_string(),
                        name: "time".to_string(),
                        value: mode.clone(),
                    });
                }
            };
        }
        if let Some(format) = params.get("timeFormat") {
            dialect.text = TimestampText::new(format.as_str());
        }

        Ok(dialect)
    }

    #[must_use]
    pub const fn time_mode(&self) -> TimeMode {
        self.time_mode
    }

    const fn column_type(kind: FieldKind) -> &'static str {
        match kind {
            FieldKind::Bool
            | FieldKind::Int8
            | FieldKind::Int16
            | FieldKind::Int32
            | FieldKind::Int64
            | FieldKind::Uint8
            | FieldKind::Uint16
            | FieldKind::Uint32
            | FieldKind::Uint64 => "INTEGER",
            FieldKind::Float32 | FieldKind::Float64 => "REAL",
            FieldKind::Text => "TEXT",
            FieldKind::Blob => "BLOB",
            FieldKind::Timestamp => "DATETIME",
        }
    }

    fn timestamp_adapter(&self, column: &ColumnDef) -> Option<&dyn ValueAdapter> {
        if column.kind != FieldKind::Timestamp {
            return None;
        }

        match self.time_mode {
            TimeMode::Text => Some(&self.text),
            TimeMode::Unix => Some(&TimestampSeconds),
            TimeMode::Native => None,
        }
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn quote(&self, ident: &str) -> String {
        QuoteStyle::DoubleQuote.apply(ident)
    }

    fn scan_adapter(&self, column: &ColumnDef) -> Option<&dyn ValueAdapter> {
        self.timestamp_adapter(column)
    }

    fn produce_adapter(&self, column: &ColumnDef) -> Option<&dyn ValueAdapter> {
        self.timestamp_adapter(column)
    }

    fn create_table(
        &self,
        table: &str,
        columns: &[ColumnDef],
        indexes: &[IndexDef],
        if_not_exists: bool,
    ) -> Result<String, DialectError> {
        let ai = auto_increment_key(table, columns, indexes)?;
        let mut defs = Vec::with_capacity(columns.len() + indexes.len());

        for column in columns {
            let mut def = format!("{} {}", self.quote(&column.name), Self::column_type(column.kind));
            if !column.nullable {
                def.push_str(" NOT NULL");
            }
            if let Some(key) = ai.as_ref().filter(|k| k.column.name == column.name) {
                // AUTOINCREMENT is only legal on an inline INTEGER PRIMARY KEY
                def.push_str(&format!(
                    " CONSTRAINT {} PRIMARY KEY AUTOINCREMENT",
                    self.quote(&key.name)
                ));
            }
            defs.push(def);
        }

        for index in indexes {
            let clause = match index.kind {
                IndexKind::Primary if ai.is_some() => continue,
                IndexKind::Primary => "PRIMARY KEY",
                IndexKind::Unique => "UNIQUE",
                IndexKind::Index => continue,
            };
            defs.push(format!(
                "CONSTRAINT {} {clause} ({})",
                self.quote(&index.name),
                quote_list(self, &index.columns)
            ));
        }

        let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };

        Ok(format!(
            "CREATE TABLE {guard}{} ({})",
            self.quote(table),
            defs.join(",")
        ))
    }

    /// Secondary indexes become `CREATE INDEX "<table>_<name>"`; SQLite
    /// index names share one namespace per database.
    fn create_indexes(
        &self,
        table: &str,
        indexes: &[IndexDef],
        if_not_exists: bool,
    ) -> Result<Vec<String>, DialectError> {
        let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };

        Ok(indexes
            .iter()
            .filter(|i| i.kind == IndexKind::Index)
            .map(|i| {
                format!(
                    "CREATE INDEX {guard}{} ON {} ({})",
                    self.quote(&format!("{table}_{}", i.name)),
                    self.quote(table),
                    quote_list(self, &i.columns)
                )
            })
            .collect())
    }
}

///
/// TESTS
///
