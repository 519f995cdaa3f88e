//! `#[derive(Record)]` for the `i2s` crate.

#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input, parse_quote, spanned::Spanned};

/// Implement `i2s::Record` and `i2s::Target` for a struct with named fields.
///
/// Each field is exposed under its identifier, with any `r#` prefix removed.
/// Every field type must implement `i2s::Target`.
#[proc_macro_derive(Record)]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(mut input: DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            Fields::Unnamed(_) | Fields::Unit => {
                return Err(syn::Error::new(
                    data.struct_token.span(),
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span(),
                "Record cannot be derived for enums",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span(),
                "Record cannot be derived for unions",
            ));
        }
    };

    let idents: Vec<_> = fields.iter().filter_map(|f| f.ident.clone()).collect();
    let names: Vec<String> = idents
        .iter()
        .map(|ident| {
            let name = ident.to_string();
            name.strip_prefix("r#").map(str::to_owned).unwrap_or(name)
        })
        .collect();

    let type_params: Vec<_> = input
        .generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect();
    let where_clause = input.generics.make_where_clause();
    for param in &type_params {
        where_clause
            .predicates
            .push(parse_quote!(#param: ::i2s::Target));
    }

    let name = &input.ident;
    let name_str = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::i2s::Record for #name #ty_generics #where_clause {
            fn record_name(&self) -> &'static str {
                #name_str
            }

            fn field_names(&self) -> &'static [&'static str] {
                &[#(#names),*]
            }

            fn fields_mut(&mut self) -> ::std::vec::Vec<(&'static str, &mut dyn ::i2s::Target)> {
                ::std::vec![#((#names, &mut self.#idents as &mut dyn ::i2s::Target)),*]
            }
        }

        impl #impl_generics ::i2s::Target for #name #ty_generics #where_clause {
            fn slot(&mut self) -> ::i2s::Slot<'_> {
                ::i2s::Slot::Record(self)
            }

            fn type_name(&self) -> &'static str {
                #name_str
            }
        }
    })
}
