use crate::value::{ConvertError, FieldKind, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

///
/// ValueAdapter
///
/// Bidirectional converter for field kinds the wire protocol cannot carry
/// natively. `scan` runs on values read from a row; `produce` runs on
/// values about to be bound as arguments.
///

pub trait ValueAdapter: Send + Sync {
    fn scan(&self, wire: Value, nullable: bool) -> Result<Value, ConvertError>;

    fn produce(&self, value: Value) -> Result<Value, ConvertError>;
}

// zero time for non-nullable fields that received an empty value
const fn zero_time() -> Value {
    Value::Timestamp(DateTime::<Utc>::UNIX_EPOCH)
}

fn invalid(input: &str, reason: impl ToString) -> ConvertError {
    ConvertError::InvalidTimestamp {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

fn into_text(wire: Value) -> Result<String, ConvertError> {
    match wire {
        Value::Text(s) => Ok(s),
        Value::Blob(b) => String::from_utf8(b).map_err(|_| ConvertError::InvalidUtf8),
        other => Err(ConvertError::mismatch(FieldKind::Timestamp, &other)),
    }
}

///
/// TimestampText
///
/// Timestamps stored as formatted strings (chrono `strftime` syntax).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimestampText {
    format: String,
}

impl TimestampText {
    pub const DEFAULT_FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S%z";

    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }

    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    fn parse(&self, input: &str) -> Result<DateTime<Utc>, ConvertError> {
        match DateTime::parse_from_str(input, &self.format) {
            Ok(at) => Ok(at.with_timezone(&Utc)),
            // formats without an offset are read as UTC
            Err(_) => NaiveDateTime::parse_from_str(input, &self.format)
                .map(|naive| naive.and_utc())
                .map_err(|err| invalid(input, err)),
        }
    }
}

impl Default for TimestampText {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FORMAT)
    }
}

impl ValueAdapter for TimestampText {
    fn scan(&self, wire: Value, nullable: bool) -> Result<Value, ConvertError> {
        match wire {
            Value::Null if nullable => Ok(Value::Null),
            Value::Null => Ok(zero_time()),
            Value::Timestamp(at) => Ok(Value::Timestamp(at)),
            other => {
                let text = into_text(other)?;
                if text.is_empty() {
                    return Ok(if nullable { Value::Null } else { zero_time() });
                }

                self.parse(&text).map(Value::Timestamp)
            }
        }
    }

    fn produce(&self, value: Value) -> Result<Value, ConvertError> {
        match value {
            Value::Timestamp(at) => Ok(Value::Text(at.format(&self.format).to_string())),
            other => Ok(other),
        }
    }
}

///
/// TimestampSeconds
///
/// Timestamps stored as integer unix seconds. Sub-second precision is
/// dropped on write.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TimestampSeconds;

impl ValueAdapter for TimestampSeconds {
    fn scan(&self, wire: Value, nullable: bool) -> Result<Value, ConvertError> {
        let secs = match wire {
            Value::Null if nullable => return Ok(Value::Null),
            Value::Null => return Ok(zero_time()),
            Value::Timestamp(at) => return Ok(Value::Timestamp(at)),
            Value::Int(secs) => secs,
            Value::Uint(secs) => i64::try_from(secs)
                .map_err(|_| ConvertError::out_of_range(FieldKind::Timestamp, secs))?,
            other => return Err(ConvertError::mismatch(FieldKind::Timestamp, &other)),
        };

        DateTime::from_timestamp(secs, 0)
            .map(Value::Timestamp)
            .ok_or_else(|| ConvertError::out_of_range(FieldKind::Timestamp, secs))
    }

    fn produce(&self, value: Value) -> Result<Value, ConvertError> {
        match value {
            Value::Timestamp(at) => Ok(Value::Int(at.timestamp())),
            other => Ok(other),
        }
    }
}

///
/// TimestampLenient
///
/// Accepts native timestamps plus the textual DATETIME, DATE and YEAR
/// forms some drivers return. Values are written natively.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TimestampLenient;

impl TimestampLenient {
    const DATETIME_FORMATS: [&'static str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

    fn parse(input: &str) -> Result<DateTime<Utc>, ConvertError> {
        for format in Self::DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
                return Ok(naive.and_utc());
            }
        }

        let date = NaiveDate::parse_from_str(input, "%Y-%m-%d").ok().or_else(|| {
            if input.len() != 4 {
                return None;
            }
            input
                .parse::<i32>()
                .ok()
                .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
        });

        date.and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| invalid(input, "incorrect time string"))
    }
}

impl ValueAdapter for TimestampLenient {
    fn scan(&self, wire: Value, _nullable: bool) -> Result<Value, ConvertError> {
        match wire {
            Value::Null => Ok(Value::Null),
            Value::Timestamp(at) => Ok(Value::Timestamp(at)),
            other => Self::parse(&into_text(other)?).map(Value::Timestamp),
        }
    }

    fn produce(&self, value: Value) -> Result<Value, ConvertError> {
        Ok(value)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
    }

    #[test]
    fn text_timestamps_honour_offsets() {
        let adapter = TimestampText::default();

        let scanned = adapter
            .scan(Value::from("2017-06-13T05:18:23+0800"), false)
            .unwrap();

        assert_eq!(scanned, Value::Timestamp(at(2017, 6, 12, 21, 18, 23)));
    }

    #[test]
    fn text_timestamps_write_in_configured_format() {
        let adapter = TimestampText::default();

        let produced = adapter
            .produce(Value::Timestamp(at(2016, 7, 5, 1, 2, 3)))
            .unwrap();

        assert_eq!(produced, Value::from("2016-07-05T01:02:03+0000"));
        assert_eq!(adapter.produce(Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn empty_text_depends_on_nullability() {
        let adapter = TimestampText::default();

        assert_eq!(adapter.scan(Value::from(""), true).unwrap(), Value::Null);
        assert_eq!(
            adapter.scan(Value::from(""), false).unwrap(),
            Value::Timestamp(DateTime::<Utc>::UNIX_EPOCH)
        );
    }

    #[test]
    fn offsetless_formats_read_as_utc() {
        let adapter = TimestampText::new("%Y-%m-%d %H:%M:%S");

        assert_eq!(
            adapter.scan(Value::from("2020-01-02 03:04:05"), false).unwrap(),
            Value::Timestamp(at(2020, 1, 2, 3, 4, 5))
        );
        assert!(matches!(
            adapter.scan(Value::from("not a time"), false),
            Err(ConvertError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn seconds_truncate_fractions() {
        let adapter = TimestampSeconds;
        let precise = at(2016, 7, 5, 0, 0, 0) + chrono::Duration::milliseconds(750);

        assert_eq!(
            adapter.produce(Value::Timestamp(precise)).unwrap(),
            Value::Int(1_467_676_800)
        );
        assert_eq!(
            adapter.scan(Value::Int(1_467_676_800), false).unwrap(),
            Value::Timestamp(at(2016, 7, 5, 0, 0, 0))
        );
        assert_eq!(adapter.scan(Value::Null, true).unwrap(), Value::Null);
    }

    #[test]
    fn lenient_accepts_mysql_text_forms() {
        let adapter = TimestampLenient;

        assert_eq!(
            adapter
                .scan(Value::Blob(b"2017-01-02 03:04:05.000000".to_vec()), false)
                .unwrap(),
            Value::Timestamp(at(2017, 1, 2, 3, 4, 5))
        );
        assert_eq!(
            adapter.scan(Value::from("2017-01-02"), false).unwrap(),
            Value::Timestamp(at(2017, 1, 2, 0, 0, 0))
        );
        assert_eq!(
            adapter.scan(Value::from("2017"), false).unwrap(),
            Value::Timestamp(at(2017, 1, 1, 0, 0, 0))
        );
        assert!(adapter.scan(Value::from("yesterday"), false).is_err());
    }
}
