//! Code synthesizers
//!
//! One submodule per directive kind. Each turns a scanned declaration into a
//! `proc_macro2::TokenStream` holding the items of one generated unit; the
//! emission controller formats and writes it.
//!
//! Generated items refer to the annotated declaration by its bare name and are
//! meant to be `include!`d into the declaring module.

pub mod curried;
pub mod matcher;
pub mod optional;
pub mod pipeline;
pub mod record;

use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::{Path, Type};

use crate::directive::{DirectiveKind, Job};
use crate::error::{Error, Result};
use crate::model::{Declaration, Visibility};
use crate::scanner::{UNKNOWN_TYPE, VARIADIC_PREFIX};

/// Default path of the runtime crate as seen from generated code
pub const DEFAULT_RUNTIME_PATH: &str = "::rsfn_runtime";

/// Settings shared by every synthesizer
#[derive(Debug, Clone)]
pub struct SynthContext {
    /// Path generated code uses to reach the runtime crate
    pub runtime: Path,
}

impl SynthContext {
    pub fn new(runtime_path: &str) -> Result<Self> {
        let runtime = syn::parse_str::<Path>(runtime_path)
            .map_err(|e| Error::Config(format!("invalid runtime path `{}`: {}", runtime_path, e)))?;
        Ok(Self { runtime })
    }
}

impl Default for SynthContext {
    fn default() -> Self {
        let runtime = syn::parse_quote!(::rsfn_runtime);
        Self { runtime }
    }
}

/// Synthesize the unit for one classified job.
///
/// Returns `None` when the job's kind does not apply to its declaration; the
/// classifier never produces such jobs.
pub fn synthesize(job: &Job, ctx: &SynthContext) -> Option<TokenStream> {
    let tokens = match (&job.kind, &job.declaration) {
        (DirectiveKind::Record, Declaration::Struct(info)) => record::synthesize(info),
        (DirectiveKind::Optional, Declaration::Struct(info)) => optional::synthesize(info),
        (DirectiveKind::Pipeline, Declaration::Struct(info)) => pipeline::synthesize(info, ctx),
        (DirectiveKind::Match, Declaration::Struct(info)) => matcher::synthesize(info, ctx),
        (DirectiveKind::Curried, Declaration::Func(func)) => curried::synthesize(func),
        _ => return None,
    };
    Some(tokens)
}

/// Convert a type or function name to snake_case.
///
/// `OrderFlow` becomes `order_flow`, `HTTPServer` becomes `http_server`;
/// names already in snake_case are unchanged.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            out.push('_');
            continue;
        }
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Identifier for generated code, escaping keywords as raw identifiers
pub(crate) fn ident(name: &str) -> Ident {
    let name = name.strip_prefix("r#").unwrap_or(name);
    if syn::parse_str::<Ident>(name).is_ok() {
        return Ident::new(name, Span::call_site());
    }
    match name {
        "self" | "Self" | "super" | "crate" | "_" => Ident::new(&format!("{}_", name), Span::call_site()),
        _ => Ident::new_raw(name, Span::call_site()),
    }
}

/// True when the rendered type is the variadic form `...T`
pub(crate) fn is_variadic(rendered: &str) -> bool {
    rendered.starts_with(VARIADIC_PREFIX)
}

/// Parse a rendered type back into tokens.
///
/// The variadic form `...T` parses as `Vec<T>` (the owned aggregate used in
/// closure position). Unparsable text becomes the `_` placeholder and is left
/// for the compiler to reject.
pub(crate) fn parse_type(rendered: &str) -> Type {
    if let Some(item) = rendered.strip_prefix(VARIADIC_PREFIX) {
        let item = parse_type(item);
        return syn::parse_quote!(Vec<#item>);
    }
    if rendered == UNKNOWN_TYPE {
        return syn::parse_quote!(_);
    }
    match syn::parse_str::<Type>(rendered) {
        Ok(ty) => ty,
        Err(e) => {
            log::debug!("unparsable type `{}` ({}), using `_`", rendered, e);
            syn::parse_quote!(_)
        }
    }
}

/// Visibility tokens for generated items that mirror a declaration
pub(crate) fn visibility(vis: &Visibility) -> TokenStream {
    match vis {
        Visibility::Private => TokenStream::new(),
        Visibility::Public => quote!(pub),
        Visibility::Restricted(text) => match syn::parse_str::<syn::Visibility>(text) {
            Ok(v) => quote!(#v),
            Err(_) => TokenStream::new(),
        },
    }
}

/// Format a unit for tests
#[cfg(test)]
pub(crate) fn render(tokens: TokenStream) -> String {
    let file: syn::File = syn::parse2(tokens).expect("generated tokens parse as a file");
    prettyplease::unparse(&file)
}

/// Collapse whitespace and line-breaking commas so assertions ignore formatting
#[cfg(test)]
pub(crate) fn squash(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("( ", "(")
        .replace(", )", ")")
        .replace(" )", ")")
        .replace(", }", " }")
        .replace("< ", "<")
        .replace(", >", ">")
        .replace(" >", ">")
}
