use super::*;
use chrono::TimeZone;

#[test]
fn integer_conversion_is_range_checked() {
    assert_eq!(i8::from_value(Value::Int(127)), Ok(127));
    assert_eq!(
        i8::from_value(Value::Int(128)),
        Err(ConvertError::OutOfRange {
            kind: FieldKind::Int8,
            value: "128".to_string(),
        })
    );
    assert_eq!(u16::from_value(Value::Int(-1)).unwrap_err().to_string(), "value -1 out of range for Uint16");
    assert_eq!(u64::from_value(Value::Uint(u64::MAX)), Ok(u64::MAX));
    assert_eq!(i64::from_value(Value::Uint(7)), Ok(7));
}

#[test]
fn booleans_accept_integer_encodings() {
    assert_eq!(bool::from_value(Value::Int(0)), Ok(false));
    assert_eq!(bool::from_value(Value::Int(1)), Ok(true));
    assert_eq!(bool::from_value(Value::Bool(true)), Ok(true));
    assert_eq!(i32::from_value(Value::Bool(true)), Ok(1));
}

#[test]
fn null_only_binds_into_optional_fields() {
    assert_eq!(Option::<i32>::from_value(Value::Null), Ok(None));
    assert_eq!(Option::<i32>::from_value(Value::Int(4)), Ok(Some(4)));
    assert_eq!(
        i32::from_value(Value::Null),
        Err(ConvertError::UnexpectedNull {
            kind: FieldKind::Int32
        })
    );
    assert_eq!(None::<String>.to_value(), Value::Null);
}

#[test]
fn text_and_blob_are_interchangeable() {
    assert_eq!(
        String::from_value(Value::Blob(b"star".to_vec())),
        Ok("star".to_string())
    );
    assert_eq!(
        String::from_value(Value::Blob(vec![0xff, 0xfe])),
        Err(ConvertError::InvalidUtf8)
    );
    assert_eq!(
        Vec::<u8>::from_value(Value::Text("ab".to_string())),
        Ok(vec![b'a', b'b'])
    );
}

#[test]
fn floats_widen_from_integers() {
    assert_eq!(f64::from_value(Value::Int(3)), Ok(3.0));
    assert_eq!(f32::from_value(Value::Float(1.5)), Ok(1.5));
    assert_eq!(
        f32::from_value(Value::Text("x".to_string())),
        Err(ConvertError::TypeMismatch {
            expected: FieldKind::Float32,
            found: "TEXT",
        })
    );
}

#[test]
fn timestamps_require_native_values_on_the_generic_path() {
    let at = Utc.with_ymd_and_hms(2016, 7, 5, 0, 0, 0).unwrap();

    assert_eq!(DateTime::<Utc>::from_value(Value::Timestamp(at)), Ok(at));
    assert!(DateTime::<Utc>::from_value(Value::Int(1_467_676_800)).is_err());
}

#[test]
fn field_kind_metadata_matches_rust_types() {
    assert_eq!(<Option<u32> as FieldValue>::KIND, FieldKind::Uint32);
    assert!(<Option<u32> as FieldValue>::NULLABLE);
    assert!(!<u32 as FieldValue>::NULLABLE);
    assert!(FieldKind::Blob.is_string_like());
    assert!(FieldKind::Uint8.is_integer());
    assert!(!FieldKind::Float64.is_integer());
}

#[test]
fn values_serialize_for_diagnostics() {
    let json = serde_json::to_string(&vec![Value::Int(1), Value::from("a"), Value::Null]).unwrap();

    assert_eq!(json, r#"[{"Int":1},{"Text":"a"},"Null"]"#);
}
