//! `#[derive(AutoSerializable)]` for structs with named fields.
//!
//! Generates `CustomSerializable`, `AutoSerializable`, `Serializable` and
//! `FromValue` impls. Recognized attributes:
//!
//! - `#[superserial(type_name = "...")]` on the struct overrides the
//!   registered name (defaults to the struct's identifier).
//! - `#[superserial(rename = "...")]` on a field overrides its key.
//! - `#[superserial(skip)]` on a field leaves it out of the payload; it is
//!   filled from `Default::default()` on decode.
//!
//! `Option<_>` fields are omitted while `None` and read as `None` when absent.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Type, parse_macro_input};

mod attributes;

use attributes::{FieldAttributes, StructAttributes};

#[proc_macro_derive(AutoSerializable, attributes(superserial))]
pub fn derive_auto_serializable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct FieldSpec<'a> {
    ident: &'a Ident,
    key: LitStr,
    skip: bool,
    optional: bool,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "AutoSerializable cannot be derived for generic types",
        ));
    }

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "AutoSerializable requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "AutoSerializable can only be derived for structs",
            ));
        }
    };

    let struct_attrs = StructAttributes::parse(&input.attrs)?;
    let type_name = struct_attrs
        .type_name
        .unwrap_or_else(|| LitStr::new(&name.unraw().to_string(), name.span()));

    let mut specs = Vec::with_capacity(named.len());
    for field in named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = FieldAttributes::parse(&field.attrs)?;
        specs.push(FieldSpec {
            ident,
            key: attrs
                .rename
                .unwrap_or_else(|| LitStr::new(&ident.unraw().to_string(), ident.span())),
            skip: attrs.skip,
            optional: is_option(&field.ty),
        });
    }

    let writes = specs.iter().filter(|spec| !spec.skip).map(|spec| {
        let FieldSpec { ident, key, .. } = spec;
        if spec.optional {
            quote! { fields.optional(#key, &self.#ident); }
        } else {
            quote! { fields.field(#key, &self.#ident); }
        }
    });

    let reads = specs.iter().map(|spec| {
        let FieldSpec { ident, key, .. } = spec;
        if spec.skip {
            quote! { #ident: ::core::default::Default::default() }
        } else {
            quote! { #ident: fields.get(#key)? }
        }
    });

    Ok(quote! {
        impl ::superserial::CustomSerializable for #name {
            const TYPE_NAME: &'static str = #type_name;
        }

        impl ::superserial::AutoSerializable for #name {
            #[allow(unused_variables)]
            fn write_fields(&self, fields: &mut ::superserial::FieldWriter) {
                #(#writes)*
            }

            #[allow(unused_variables)]
            fn from_fields(
                fields: &::superserial::Fields,
            ) -> ::core::result::Result<Self, ::superserial::DecodeError> {
                ::core::result::Result::Ok(Self {
                    #(#reads,)*
                })
            }
        }

        impl ::superserial::Serializable for #name {
            fn serialize(&self) -> ::superserial::Serialized {
                ::superserial::encode::serialize_auto(self)
            }

            fn from_serialized(
                serialized: &::superserial::Serialized,
                registry: &::superserial::TypeRegistry,
            ) -> ::core::result::Result<Self, ::superserial::DecodeError> {
                ::superserial::encode::deserialize_auto(serialized, registry)
            }
        }

        impl ::superserial::FromValue for #name {
            fn from_value(
                value: &::superserial::Value,
            ) -> ::core::result::Result<Self, ::superserial::DecodeError> {
                ::superserial::value::auto_from_value(value)
            }
        }
    })
}

/// `Option<T>`, `std::option::Option<T>` and friends, matched by last segment.
fn is_option(ty: &Type) -> bool {
    match ty {
        Type::Path(path) if path.qself.is_none() => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Option"),
        Type::Group(group) => is_option(&group.elem),
        Type::Paren(paren) => is_option(&paren.elem),
        _ => false,
    }
}
