use crate::{
    model::FieldModel,
    value::{ConvertError, Value},
};

///
/// Record
///
/// A struct whose tagged fields map onto table columns.
/// Implemented by `#[derive(Record)]`; hand-written impls must keep
/// `FIELDS[i].id == i`.
///

pub trait Record: 'static {
    /// Rust type name, used in error messages.
    const TYPE_NAME: &'static str;

    /// Table used by `Manager::reg` and auto-registration.
    const TABLE_NAME: &'static str;

    /// Every named field in declaration order, mapped or not.
    const FIELDS: &'static [FieldModel];

    /// Wire value of the field with ordinal `field_id`.
    fn get_value(&self, field_id: usize) -> Option<Value>;

    /// Assign the field with ordinal `field_id` from a wire value.
    fn set_value(&mut self, field_id: usize, value: Value) -> Result<(), ConvertError>;
}
