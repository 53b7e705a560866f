//! Implementation of #[derive(Expandable)]

use proc_macro2::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Data, DeriveInput, Field, Fields, GenericParam, Generics, LitStr, Token, parse_quote};

pub fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let generics = add_bounds(input.generics.clone());
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => describe_fields(&data.fields)?,
        Data::Enum(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Expandable cannot be derived for enums; implement it by hand",
            ));
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Expandable cannot be derived for unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::rest_expander::Expandable for #name #ty_generics #where_clause {
            fn describe(&self) -> ::rest_expander::Shape {
                #body
            }
        }
    })
}

fn describe_fields(fields: &Fields) -> syn::Result<TokenStream> {
    match fields {
        Fields::Named(named) => {
            let mut entries = Vec::new();
            for field in &named.named {
                let options = FieldOptions::from_field(field)?;
                if options.skip {
                    continue;
                }

                let ident = field.ident.as_ref().ok_or_else(|| {
                    syn::Error::new_spanned(field, "expected a named field")
                })?;
                let key = options
                    .rename
                    .unwrap_or_else(|| ident.to_string().trim_start_matches("r#").to_string());

                entries.push(quote! {
                    (
                        ::std::string::String::from(#key),
                        ::rest_expander::Expandable::describe(&self.#ident),
                    )
                });
            }

            Ok(quote! {
                ::rest_expander::Shape::Object(::std::vec![#(#entries),*])
            })
        }
        Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => Ok(quote! {
            ::rest_expander::Expandable::describe(&self.0)
        }),
        Fields::Unnamed(unnamed) => {
            let mut items = Vec::new();
            for (i, field) in unnamed.unnamed.iter().enumerate() {
                if FieldOptions::from_field(field)?.skip {
                    continue;
                }
                let index = syn::Index::from(i);
                items.push(quote! { ::rest_expander::Expandable::describe(&self.#index) });
            }

            Ok(quote! {
                ::rest_expander::Shape::Sequence(::std::vec![#(#items),*])
            })
        }
        Fields::Unit => Ok(quote! { ::rest_expander::Shape::Null }),
    }
}

/// Every type parameter must itself be expandable
fn add_bounds(mut generics: Generics) -> Generics {
    for param in &mut generics.params {
        if let GenericParam::Type(type_param) = param {
            type_param
                .bounds
                .push(parse_quote!(::rest_expander::Expandable));
        }
    }
    generics
}

#[derive(Default)]
struct FieldOptions {
    rename: Option<String>,
    skip: bool,
}

impl FieldOptions {
    fn from_field(field: &Field) -> syn::Result<Self> {
        let mut serde_rename = None;
        let mut own_rename = None;
        let mut skip = false;

        for attr in &field.attrs {
            if attr.path().is_ident("serde") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                        let value: LitStr = meta.value()?.parse()?;
                        serde_rename = Some(value.value());
                    } else if meta.path.is_ident("rename") {
                        // rename(serialize = "..", deserialize = "..")
                        meta.parse_nested_meta(|inner| {
                            if inner.path.is_ident("serialize") {
                                let value: LitStr = inner.value()?.parse()?;
                                serde_rename = Some(value.value());
                                Ok(())
                            } else {
                                ignore(inner)
                            }
                        })?;
                    } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                        skip = true;
                    } else {
                        ignore(meta)?;
                    }
                    Ok(())
                })?;
            } else if attr.path().is_ident("expandable") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("rename") {
                        let value: LitStr = meta.value()?.parse()?;
                        own_rename = Some(value.value());
                        Ok(())
                    } else if meta.path.is_ident("skip") {
                        skip = true;
                        Ok(())
                    } else {
                        Err(meta.error("unsupported expandable attribute, expected `rename` or `skip`"))
                    }
                })?;
            }
        }

        Ok(Self {
            rename: own_rename.or(serde_rename),
            skip,
        })
    }
}

/// Consume a serde option this macro has no use for
fn ignore(meta: ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(ignore)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(input: DeriveInput) -> String {
        expand(input).unwrap().to_string()
    }

    #[test]
    fn test_named_fields_with_renames() {
        let input: DeriveInput = parse_quote! {
            struct Member {
                #[serde(rename = "Name", default)]
                name: String,
                #[serde(rename = "ignored")]
                #[expandable(rename = "L")]
                link: Link,
                #[serde(skip_serializing_if = "Option::is_none")]
                note: Option<String>,
            }
        };

        let output = expand_str(input);
        assert!(output.contains("\"Name\""));
        assert!(output.contains("\"L\""));
        assert!(!output.contains("\"ignored\""));
        assert!(output.contains("\"note\""));
    }

    #[test]
    fn test_skipped_fields() {
        let input: DeriveInput = parse_quote! {
            struct Secret {
                visible: u32,
                #[serde(skip)]
                hidden: u32,
                #[expandable(skip)]
                also_hidden: u32,
            }
        };

        let output = expand_str(input);
        assert!(output.contains("visible"));
        assert!(!output.contains("also_hidden"));
        assert!(!output.contains("self . hidden"));
    }

    #[test]
    fn test_serialize_rename_pair() {
        let input: DeriveInput = parse_quote! {
            struct Pair {
                #[serde(rename(serialize = "Out", deserialize = "In"))]
                value: u32,
            }
        };
        assert!(expand_str(input).contains("\"Out\""));
    }

    #[test]
    fn test_enum_rejected() {
        let input: DeriveInput = parse_quote! {
            enum Choice { A, B }
        };
        let err = expand(input).unwrap_err();
        assert!(err.to_string().contains("enums"));
    }

    #[test]
    fn test_unknown_expandable_option_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Bad {
                #[expandable(flatten)]
                inner: u32,
            }
        };
        assert!(expand(input).is_err());
    }

    #[test]
    fn test_generic_params_get_bound() {
        let input: DeriveInput = parse_quote! {
            struct Page<T> {
                items: Vec<T>,
            }
        };
        let output = expand_str(input);
        assert!(output.contains("T : :: rest_expander :: Expandable"));
    }

    #[test]
    fn test_newtype_delegates() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper(Link);
        };
        let output = expand_str(input);
        assert!(output.contains("self . 0"));
        assert!(!output.contains("Object"));
    }
}
