//! Implementation of `#[derive(NativeType)]`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input, spanned::Spanned};

use crate::attrs::{FieldAttrs, TypeAttrs};

pub fn derive_native_type_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_native_type_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_native_type_inner(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "#[derive(NativeType)] does not support generic types",
        ));
    }

    let name = &input.ident;
    let attrs = TypeAttrs::from_attrs(&input.attrs)?;
    let registered_name = attrs.name.unwrap_or_else(|| name.to_string());
    let fields = collect_fields(input)?;

    Ok(quote! {
        impl ::fastreflect_core::NativeType for #name {
            const NAME: &'static str = #registered_name;
        }

        ::fastreflect_core::native_value_traits!(#name);

        impl ::fastreflect_host::DeriveFields for #name {
            fn derive_fields(
                builder: ::fastreflect_host::TypeBuilder<'_, Self>,
            ) -> ::fastreflect_host::TypeBuilder<'_, Self> {
                builder #(#fields)*
            }
        }
    })
}

/// One builder call per exposed field.
fn collect_fields(input: &DeriveInput) -> syn::Result<Vec<TokenStream2>> {
    let mut calls = Vec::new();

    let Data::Struct(data) = &input.data else {
        return Ok(calls);
    };
    let Fields::Named(fields) = &data.fields else {
        for field in data.fields.iter() {
            if FieldAttrs::from_attrs(&field.attrs)?.is_exposed() {
                return Err(syn::Error::new(
                    field.span(),
                    "reflected fields must be named",
                ));
            }
        }
        return Ok(calls);
    };

    for field in &fields.named {
        let field_attrs = FieldAttrs::from_attrs(&field.attrs)?;
        if !field_attrs.is_exposed() {
            continue;
        }
        if field_attrs.set && !field_attrs.get {
            return Err(syn::Error::new(
                field.span(),
                "#[reflect(set)] requires #[reflect(get)]",
            ));
        }

        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = field_attrs.name.clone().unwrap_or_else(|| ident.to_string());
        let ty = &field.ty;

        let call = if field_attrs.set {
            quote! {
                .field_mut(
                    #field_name,
                    |this: &Self| -> #ty { ::core::clone::Clone::clone(&this.#ident) },
                    |this: &mut Self, value: #ty| this.#ident = value,
                )
            }
        } else {
            quote! {
                .field(
                    #field_name,
                    |this: &Self| -> #ty { ::core::clone::Clone::clone(&this.#ident) },
                )
            }
        };
        calls.push(call);
        if field_attrs.private {
            calls.push(quote! { .private() });
        }
    }

    Ok(calls)
}
