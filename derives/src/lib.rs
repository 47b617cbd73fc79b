//! Derive macros for tioc
//!
//! `#[derive(Injectable)]` turns a struct's fields into constructor
//! parameters. Every field must be an `Arc<T>`; the field is filled with the
//! instance registered for `T`. Mark a field `#[inject(default)]` to fall back
//! to `T::default()` when no `T` is registered.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, Data, DeriveInput, Field, Fields, GenericArgument, GenericParam,
    PathArguments, Type, TypeParam,
};

/// Generates the `tioc::Injectable` implementation for a struct.
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct Param {
    /// Field name, or the positional index for tuple structs.
    name: String,
    member: Option<syn::Ident>,
    dependency: Type,
    default: bool,
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = input.ident;

    let data = match input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new(
                Span::call_site(),
                "Injectable can only be derived for structs",
            ))
        }
    };

    let params = match &data.fields {
        Fields::Named(fields) => fields
            .named
            .iter()
            .map(|field| {
                let ident = field.ident.clone();
                let name = ident.as_ref().map(|i| i.to_string()).unwrap_or_default();
                param(field, name, ident)
            })
            .collect::<syn::Result<Vec<_>>>()?,
        Fields::Unnamed(fields) => fields
            .unnamed
            .iter()
            .enumerate()
            .map(|(index, field)| param(field, index.to_string(), None))
            .collect::<syn::Result<Vec<_>>>()?,
        Fields::Unit => Vec::new(),
    };

    // Dependencies are shared across threads by the registry.
    let mut generics = input.generics;
    let bounded: Vec<_> = generics
        .params
        .iter()
        .filter_map(|param| match param {
            GenericParam::Type(TypeParam { ident, .. }) => Some(ident.clone()),
            _ => None,
        })
        .collect();
    let where_clause = generics.make_where_clause();
    for ident in bounded {
        where_clause
            .predicates
            .push(syn::parse_quote!(#ident: ::std::marker::Send + ::std::marker::Sync + 'static));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let descriptors = params.iter().map(|p| {
        let dependency = &p.dependency;
        let param_name = &p.name;
        if p.default {
            quote! { ::tioc::ParamDescriptor::optional::<#dependency>(#param_name) }
        } else {
            quote! { ::tioc::ParamDescriptor::required::<#dependency>(#param_name) }
        }
    });

    let values: Vec<_> = params
        .iter()
        .map(|p| {
            let dependency = &p.dependency;
            let param_name = &p.name;
            if p.default {
                quote! { args.take_or_default::<#dependency>(#param_name)? }
            } else {
                quote! { args.take::<#dependency>(#param_name)? }
            }
        })
        .collect();

    let body = match &data.fields {
        Fields::Named(_) => {
            let members = params.iter().map(|p| &p.member);
            quote! { Self { #(#members: #values),* } }
        }
        Fields::Unnamed(_) => quote! { Self(#(#values),*) },
        Fields::Unit => quote! { Self },
    };

    let args = if params.is_empty() {
        format_ident!("_args")
    } else {
        format_ident!("args")
    };

    Ok(quote! {
        impl #impl_generics ::tioc::Injectable for #name #ty_generics #where_clause {
            fn descriptor() -> ::tioc::TypeDescriptor {
                ::tioc::TypeDescriptor::new::<Self>(::std::vec![#(#descriptors),*])
            }

            fn construct(
                #args: &mut ::tioc::Arguments,
            ) -> ::std::result::Result<Self, ::tioc::ResolutionError> {
                ::std::result::Result::Ok(#body)
            }
        }
    })
}

fn param(field: &Field, name: String, member: Option<syn::Ident>) -> syn::Result<Param> {
    let mut default = false;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("inject")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                default = true;
                Ok(())
            } else {
                Err(meta.error("unsupported inject option, expected `default`"))
            }
        })?;
    }

    Ok(Param {
        name,
        member,
        dependency: arc_inner(&field.ty)?.clone(),
        default,
    })
}

/// `Arc<T>` -> `T`
fn arc_inner(ty: &Type) -> syn::Result<&Type> {
    if let Type::Path(path) = ty {
        if let Some(segment) = path.path.segments.last() {
            if segment.ident == "Arc" {
                if let PathArguments::AngleBracketed(generic) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = generic.args.first() {
                        if generic.args.len() == 1 {
                            return Ok(inner);
                        }
                    }
                }
            }
        }
    }
    Err(syn::Error::new_spanned(
        ty,
        "injected fields must be `Arc<T>`, where `T` is the registered dependency type",
    ))
}
