use crate::{
    traits::Record,
    value::{FieldKind, Value},
};
use chrono::{DateTime, Utc};
use std::{collections::HashMap, fmt};
use thiserror::Error as ThisError;

///
/// Extension
///
/// Reads data into records through the column mapping kept by the
/// registry. `Executable::ext` calls `init` before first use.
///

pub trait Extension {
    fn init(&mut self, type_name: &'static str, columns: HashMap<usize, String>);
}

///
/// ExtensionError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{ext_name}: error reading into {struct_name}.{field_name}: {reason}")]
pub struct ExtensionError {
    pub ext_name: &'static str,
    pub struct_name: &'static str,
    pub field_name: String,
    pub reason: String,
}

type TimeParser = Box<dyn Fn(&str) -> Result<DateTime<Utc>, String> + Send + Sync>;

///
/// FormReader
///
/// Fills a record from string lookups keyed by column name, e.g. HTTP form
/// values. Booleans are always written (`""`, `false`, `f`, `0`, `0.0`
/// read as false); other fields only when the lookup yields a non-empty
/// string. Timestamps need a parser and are left alone without one.
///

#[derive(Default)]
pub struct FormReader {
    parse_time: Option<TimeParser>,
    type_name: Option<&'static str>,
    columns: HashMap<usize, String>,
}

impl FormReader {
    pub const NAME: &'static str = "FormReader";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_time_parser<F>(mut self, parse: F) -> Self
    where
        F: Fn(&str) -> Result<DateTime<Utc>, String> + Send + Sync + 'static,
    {
        self.parse_time = Some(Box::new(parse));
        self
    }

    /// Read mapped fields of `record` from `lookup`.
    pub fn read_to<T, F>(&self, record: &mut T, mut lookup: F) -> Result<(), ExtensionError>
    where
        T: Record,
        F: FnMut(&str) -> Option<String>,
    {
        let Some(type_name) = self.type_name else {
            return Err(Self::error("", "*", "extension must be initialized before using"));
        };
        if type_name != T::TYPE_NAME {
            return Err(Self::error(
                type_name,
                "*",
                format!("type mismatch, need {type_name} but got {}", T::TYPE_NAME),
            ));
        }

        for field in T::FIELDS {
            let Some(column) = self.columns.get(&field.id) else {
                continue;
            };
            let input = lookup(column.as_str()).unwrap_or_default();

            let value = match field.kind {
                FieldKind::Bool => Value::Bool(!is_false(&input)),
                _ if input.is_empty() => continue,
                kind => match self.parse(kind, &input) {
                    Ok(Some(value)) => value,
                    Ok(None) => continue,
                    Err(reason) => return Err(Self::error(type_name, field.ident, reason)),
                },
            };

            record
                .set_value(field.id, value)
                .map_err(|err| Self::error(type_name, field.ident, err.to_string()))?;
        }

        Ok(())
    }

    // parse
    // None means the field is skipped
    fn parse(&self, kind: FieldKind, input: &str) -> Result<Option<Value>, String> {
        let value = match kind {
            k if k.is_signed() => Value::Int(input.parse::<i64>().map_err(|e| e.to_string())?),
            k if k.is_unsigned() => Value::Uint(input.parse::<u64>().map_err(|e| e.to_string())?),
            k if k.is_float() => Value::Float(input.parse::<f64>().map_err(|e| e.to_string())?),
            FieldKind::Text => Value::Text(input.to_string()),
            FieldKind::Blob => Value::Blob(input.as_bytes().to_vec()),
            FieldKind::Timestamp => match &self.parse_time {
                Some(parse) => Value::Timestamp(parse(input)?),
                None => return Ok(None),
            },
            _ => return Ok(None),
        };

        Ok(Some(value))
    }

    fn error(
        struct_name: &'static str,
        field_name: &str,
        reason: impl Into<String>,
    ) -> ExtensionError {
        ExtensionError {
            ext_name: Self::NAME,
            struct_name,
            field_name: field_name.to_string(),
            reason: reason.into(),
        }
    }
}

impl Extension for FormReader {
    fn init(&mut self, type_name: &'static str, columns: HashMap<usize, String>) {
        self.type_name = Some(type_name);
        self.columns = columns;
    }
}

impl fmt::Debug for FormReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormReader")
            .field("type_name", &self.type_name)
            .field("columns", &self.columns)
            .field("parse_time", &self.parse_time.is_some())
            .finish()
    }
}

fn is_false(input: &str) -> bool {
    matches!(
        input.to_ascii_lowercase().as_str(),
        "" | "false" | "f" | "0" | "0.0"
    )
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        registry::Registry,
        test_support::{Event, Group, Member},
    };
    use chrono::TimeZone;

    fn reader_for<T: Record>() -> FormReader {
        let table = Registry::new().register::<T>(T::TABLE_NAME).unwrap();
        let mut reader = FormReader::new()
            .with_time_parser(|s| {
                DateTime::parse_from_rfc3339(s)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| e.to_string())
            });
        reader.init(T::TYPE_NAME, table.field_columns());

        reader
    }

    fn form(pairs: &[(&str, &str)]) -> impl FnMut(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();

        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn fills_only_present_fields() {
        let reader = reader_for::<Member>();
        let mut member = Member {
            id: 5,
            name: "keep".to_string(),
            ..Member::default()
        };

        reader
            .read_to(&mut member, form(&[("group_id", "12"), ("name", "")]))
            .unwrap();

        assert_eq!(member.id, 5);
        assert_eq!(member.group_id, 12);
        assert_eq!(member.name, "keep");
    }

    #[test]
    fn booleans_are_always_written() {
        let reader = reader_for::<Member>();
        let mut member = Member {
            active: true,
            ..Member::default()
        };

        reader.read_to(&mut member, form(&[])).unwrap();
        assert!(!member.active);

        for truthy in ["on", "yes", "TRUE", "1"] {
            reader.read_to(&mut member, form(&[("active", truthy)])).unwrap();
            assert!(member.active, "{truthy}");
        }
        for falsy in ["F", "False", "0", "0.0"] {
            reader.read_to(&mut member, form(&[("active", falsy)])).unwrap();
            assert!(!member.active, "{falsy}");
        }
    }

    #[test]
    fn parse_failures_name_the_field() {
        let reader = reader_for::<Member>();
        let mut member = Member::default();

        let err = reader
            .read_to(&mut member, form(&[("group_id", "twelve")]))
            .unwrap_err();

        assert_eq!(err.struct_name, "Member");
        assert_eq!(err.field_name, "group_id");
        assert!(
            err.to_string()
                .starts_with("FormReader: error reading into Member.group_id:")
        );
    }

    #[test]
    fn timestamps_use_the_parser() {
        let reader = reader_for::<Event>();
        let mut event = Event::default();

        reader
            .read_to(
                &mut event,
                form(&[("at", "2017-06-13T05:18:23Z"), ("note", "hi")]),
            )
            .unwrap();

        assert_eq!(event.at, Utc.with_ymd_and_hms(2017, 6, 13, 5, 18, 23).unwrap());
        assert_eq!(event.note.as_deref(), Some("hi"));
    }

    #[test]
    fn uninitialized_and_mismatched_readers_fail() {
        let mut group = Group::default();

        let err = FormReader::new().read_to(&mut group, form(&[])).unwrap_err();
        assert_eq!(err.reason, "extension must be initialized before using");

        let err = reader_for::<Member>()
            .read_to(&mut group, form(&[]))
            .unwrap_err();
        assert_eq!(err.reason, "type mismatch, need Member but got Group");
    }
}
