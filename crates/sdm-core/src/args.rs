//! Argument helpers for hand-written SQL.

use crate::{
    dialect::Dialect,
    value::{FieldKind, FieldValue, Value},
};

/// Convert every element into a positional argument.
pub fn as_args<I>(items: I) -> Vec<Value>
where
    I: IntoIterator,
    I::Item: FieldValue,
{
    items.into_iter().map(|item| item.to_value()).collect()
}

/// Convert the keys of a map into positional arguments.
///
/// Iteration order is the map's; pair with `sql_in` over the same length.
pub fn key_as_args<'a, K, V, M>(map: M) -> Vec<Value>
where
    M: IntoIterator<Item = (&'a K, &'a V)>,
    K: FieldValue + 'a,
    V: 'a,
{
    map.into_iter().map(|(key, _)| key.to_value()).collect()
}

/// `(?,?,?)` with `len` placeholders of the dialect's token for `kind`.
///
/// An empty list renders `()`, which most engines reject; callers should
/// short-circuit empty IN lists themselves.
#[must_use]
pub fn sql_in(dialect: &dyn Dialect, kind: FieldKind, len: usize) -> String {
    let holders = vec![dialect.placeholder(kind); len];

    format!("({})", holders.join(","))
}

///
/// TESTS
///
