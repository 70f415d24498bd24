//! Procedural macros for the nav-nexus routing engine.
//!
//! This library provides the `#[destination]` attribute, which turns a plain
//! comparable value type into a navigation destination.

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput};

/// Attribute macro for implementing the `Destination` trait.
///
/// # Usage
///
/// ```ignore
/// #[destination]
/// #[derive(Debug, Clone, PartialEq)]
/// enum Place {
///     Home,
///     Album(u32),
/// }
/// ```
///
/// The macro generates `impl ::nav_nexus::Destination for Place`. Two
/// destinations are equal when they have the same concrete type and compare
/// equal with `PartialEq`, so the annotated type must implement `PartialEq`
/// and `Debug`.
#[proc_macro_attribute]
pub fn destination(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let attr = proc_macro2::TokenStream::from(attr);
        return syn::Error::new_spanned(attr, "#[destination] takes no arguments")
            .to_compile_error()
            .into();
    }

    let input = parse_macro_input!(item as DeriveInput);
    if let Data::Union(_) = &input.data {
        return syn::Error::new_spanned(&input.ident, "#[destination] is not supported on unions")
            .to_compile_error()
            .into();
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        #input

        impl #impl_generics ::nav_nexus::Destination for #name #ty_generics #where_clause {
            fn is_equal_to(&self, other: &dyn ::nav_nexus::Destination) -> bool {
                other
                    .as_any()
                    .downcast_ref::<Self>()
                    .map_or(false, |other| other == self)
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    };

    TokenStream::from(expanded)
}
