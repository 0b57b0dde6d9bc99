//! Derive macro for error types.
//!
//! Generates `std::fmt::Display` and `std::error::Error` implementations.
//! Replacement for the `thiserror` crate.
//!
//! # Usage
//!
//! ```ignore
//! use replivm_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum MyError {
//!     #[error("not found: {0}")]
//!     NotFound(String),
//!
//!     #[error("code {code} exceeds table size {table_len}")]
//!     CodeOutOfRange { code: u8, table_len: usize },
//!
//!     #[error("unknown error")]
//!     Unknown,
//! }
//! ```
//!
//! Messages may interpolate tuple fields by position (`{0}`, `{1}`) and named
//! fields by name (`{field}`); a bare `{}` takes the next positional field.
//! Fields not referenced by the message are ignored rather than required.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Lit, Meta, parse_macro_input};

/// Derives `Display` and `Error` for an enum or struct.
///
/// Every variant (or the struct itself) must carry an `#[error("...")]`
/// attribute with the display message.
pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Enum(data) => {
            let arms = data
                .variants
                .iter()
                .map(|variant| {
                    let message = error_attribute(&variant.attrs, variant)?;
                    let ident = &variant.ident;
                    let (pattern, format_str, args) = render(&variant.fields, &message);
                    Ok(quote! { Self::#ident #pattern => write!(f, #format_str #args), })
                })
                .collect::<syn::Result<Vec<_>>>()?;

            quote! { match self { #(#arms)* } }
        }
        Data::Struct(data) => {
            let message = error_attribute(&input.attrs, input)?;
            let (pattern, format_str, args) = render(&data.fields, &message);
            quote! {
                let Self #pattern = self;
                write!(f, #format_str #args)
            }
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Error derive does not support unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                #body
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    })
}

/// Builds the binding pattern, rewritten format string, and argument list for
/// one set of fields. Only fields the message references are bound; the rest
/// are matched with placeholders so no unused-binding warnings fire.
fn render(
    fields: &Fields,
    message: &str,
) -> (
    proc_macro2::TokenStream,
    String,
    proc_macro2::TokenStream,
) {
    let (format_str, used) = rewrite_message(message);

    match fields {
        Fields::Unit => (quote! {}, format_str, quote! {}),
        Fields::Unnamed(inner) => {
            let bindings: Vec<_> = (0..inner.unnamed.len())
                .map(|i| {
                    let ident = format_ident!("f{}", i);
                    if used.iter().any(|u| u == &ident.to_string()) {
                        quote! { #ident }
                    } else {
                        quote! { _ }
                    }
                })
                .collect();
            let args: Vec<_> = used
                .iter()
                .map(|u| {
                    let ident = format_ident!("{}", u);
                    quote! { , #ident = #ident }
                })
                .collect();
            (quote! { ( #(#bindings),* ) }, format_str, quote! { #(#args)* })
        }
        Fields::Named(inner) => {
            let bindings: Vec<_> = inner
                .named
                .iter()
                .filter_map(|field| field.ident.as_ref())
                .filter(|ident| used.iter().any(|u| u == &ident.to_string()))
                .collect();
            let args: Vec<_> = bindings
                .iter()
                .map(|ident| quote! { , #ident = #ident })
                .collect();
            (
                quote! { { #(#bindings,)* .. } },
                format_str,
                quote! { #(#args)* },
            )
        }
    }
}

/// Rewrites positional references (`{0}`, `{}`) to named ones (`{f0}`) and
/// collects the set of argument names the message uses. Handles `{{` escapes
/// and format specs (`{0:x}` becomes `{f0:x}`).
fn rewrite_message(message: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(message.len() + 4);
    let mut used = Vec::new();
    let mut implicit = 0usize;
    let mut chars = message.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'{') {
            chars.next();
            out.push_str("{{");
            continue;
        }

        let mut name = String::new();
        let mut rest = String::new();
        let mut in_spec = false;
        for c in chars.by_ref() {
            if c == '}' {
                break;
            }
            if in_spec {
                rest.push(c);
            } else if c == ':' {
                in_spec = true;
                rest.push(c);
            } else {
                name.push(c);
            }
        }

        let name = if name.is_empty() {
            let n = format!("f{}", implicit);
            implicit += 1;
            n
        } else if name.chars().all(|c| c.is_ascii_digit()) {
            format!("f{}", name)
        } else {
            name
        };

        if !used.contains(&name) {
            used.push(name.clone());
        }
        out.push('{');
        out.push_str(&name);
        out.push_str(&rest);
        out.push('}');
    }

    (out, used)
}

/// Pulls the string out of an `#[error("...")]` attribute, with spanned
/// diagnostics for every way the attribute can be malformed or missing.
fn error_attribute<T: quote::ToTokens>(
    attrs: &[syn::Attribute],
    target: &T,
) -> syn::Result<String> {
    for attr in attrs {
        if !attr.path().is_ident("error") {
            continue;
        }
        let Meta::List(list) = &attr.meta else {
            return Err(syn::Error::new_spanned(
                &attr.meta,
                "invalid #[error] attribute; use #[error(\"message\")] to describe the error",
            ));
        };
        let lit = syn::parse2::<Lit>(list.tokens.clone()).map_err(|_| {
            syn::Error::new_spanned(
                &attr.meta,
                "failed to parse #[error] attribute; expected a string literal like #[error(\"invalid code: {0}\")]",
            )
        })?;
        let Lit::Str(s) = lit else {
            return Err(syn::Error::new_spanned(
                &attr.meta,
                "invalid #[error] attribute: message must be a string literal",
            ));
        };
        return Ok(s.value());
    }

    Err(syn::Error::new_spanned(
        target,
        "missing #[error(\"...\")] attribute; every error variant must declare a display message",
    ))
}
