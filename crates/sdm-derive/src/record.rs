use darling::{FromDeriveInput, ast::Data, util::Ignored};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Error, Field, Generics, Ident, LitStr, Visibility};

///
/// RecordInput
///
/// Struct-level view; `supports(struct_named)` rejects enums, unions and
/// tuple structs at compile time.
///

#[derive(FromDeriveInput)]
#[darling(attributes(sdm), supports(struct_named))]
struct RecordInput {
    ident: Ident,
    generics: Generics,
    data: Data<Ignored, Field>,

    #[darling(default)]
    table: Option<String>,
}

///
/// FieldInput
///

struct FieldInput<'a> {
    id: usize,
    ident: &'a Ident,
    ty: &'a syn::Type,
    tag: Option<LitStr>,
    exported: bool,
}

impl<'a> FieldInput<'a> {
    fn parse(id: usize, field: &'a Field) -> Result<Self, Error> {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new_spanned(field, "Record fields must be named"))?;

        let mut tag = None;
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("sdm")) {
            if tag.is_some() {
                return Err(Error::new_spanned(attr, "duplicate sdm tag"));
            }
            tag = Some(attr.parse_args::<LitStr>().map_err(|err| {
                Error::new(err.span(), "sdm field tags are written #[sdm(\"column,...\")]")
            })?);
        }

        Ok(Self {
            id,
            ident,
            ty: &field.ty,
            tag,
            exported: matches!(field.vis, Visibility::Public(_)),
        })
    }

    fn model(&self) -> TokenStream {
        let Self {
            id, ident, ty, exported, ..
        } = self;
        let name = ident.to_string();
        let tag = match &self.tag {
            Some(lit) => quote!(Some(#lit)),
            None => quote!(None),
        };

        quote! {
            ::sdm::model::FieldModel::new(
                #id,
                #name,
                #tag,
                #exported,
                <#ty as ::sdm::value::FieldValue>::KIND,
                <#ty as ::sdm::value::FieldValue>::NULLABLE,
            )
        }
    }
}

// derive_record
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };
    let record = match RecordInput::from_derive_input(&input) {
        Ok(record) => record,
        Err(err) => return err.write_errors(),
    };

    let Data::Struct(data) = &record.data else {
        let err = Error::new_spanned(&record.ident, "Record can only be derived for structs");
        return err.to_compile_error();
    };

    let fields: Vec<_> = match data
        .fields
        .iter()
        .enumerate()
        .map(|(id, field)| FieldInput::parse(id, field))
        .collect()
    {
        Ok(fields) => fields,
        Err(err) => return err.to_compile_error(),
    };

    let ident = &record.ident;
    let type_name = ident.to_string();
    let table_name = record
        .table
        .clone()
        .unwrap_or_else(|| type_name.to_lowercase());
    let (impl_generics, ty_generics, where_clause) = record.generics.split_for_impl();

    let models = fields.iter().map(FieldInput::model);

    let get_arms = fields.iter().map(|f| {
        let (id, field_ident) = (f.id, f.ident);
        quote! {
            #id => Some(::sdm::value::FieldValue::to_value(&self.#field_ident)),
        }
    });

    let set_arms = fields.iter().map(|f| {
        let (id, field_ident) = (f.id, f.ident);
        quote! {
            #id => {
                self.#field_ident = ::sdm::value::FieldValue::from_value(value)?;
                Ok(())
            }
        }
    });

    quote! {
        impl #impl_generics ::sdm::traits::Record for #ident #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;
            const TABLE_NAME: &'static str = #table_name;
            const FIELDS: &'static [::sdm::model::FieldModel] = &[
                #(#models),*
            ];

            fn get_value(&self, field_id: usize) -> Option<::sdm::value::Value> {
                match field_id {
                    #(#get_arms)*
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn set_value(
                &mut self,
                field_id: usize,
                value: ::sdm::value::Value,
            ) -> Result<(), ::sdm::value::ConvertError> {
                match field_id {
                    #(#set_arms)*
                    _ => Err(::sdm::value::ConvertError::UnknownField(field_id)),
                }
            }
        }
    }
}

///
/// TESTS
///
