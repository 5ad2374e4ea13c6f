use proc_macro::TokenStream;

mod record;

/// Implements `sdm::traits::Record` for a struct with named fields.
///
/// ```ignore
/// #[derive(Record)]
/// #[sdm(table = "groups")]
/// pub struct Group {
///     #[sdm("id,ai")]
///     pub id: i64,
///     #[sdm("name,uniq_group_name")]
///     pub name: String,
/// }
/// ```
#[proc_macro_derive(Record, attributes(sdm))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input.into()).into()
}
