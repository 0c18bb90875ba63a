//! Match synthesizer
//!
//! Structural matching over every field of a struct. A clause supplies one
//! `Pattern` per field in declaration order; the clause applies when all of
//! them match. The first applying clause wins and later clauses are inert.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::{Index, Member};

use super::{ident, parse_type, visibility, SynthContext};
use crate::model::StructInfo;

/// Clause parameter names the generated methods use themselves
const RESERVED: &[&str] = &["action", "guard", "value", "f", "target"];

pub fn synthesize(info: &StructInfo, ctx: &SynthContext) -> TokenStream {
    if info.fields.is_empty() {
        return TokenStream::new();
    }

    let rt = &ctx.runtime;
    let name = ident(&info.name);
    let vis = visibility(&info.visibility);
    let matcher = format_ident!("{}Matcher", info.name);
    let value_matcher = format_ident!("{}ValueMatcher", info.name);

    let members: Vec<Member> = info
        .fields
        .iter()
        .enumerate()
        .map(|(i, f)| {
            if f.name.is_empty() {
                Member::Unnamed(Index::from(i))
            } else {
                Member::Named(ident(&f.name))
            }
        })
        .collect();
    let patterns: Vec<Ident> = info.fields.iter().enumerate().map(|(i, f)| pattern_name(i, &f.name)).collect();
    let pattern_types: Vec<TokenStream> = info
        .fields
        .iter()
        .map(|f| {
            let ty = parse_type(&f.ty);
            quote!(#rt::Pattern<#ty>)
        })
        .collect();

    let clause = quote!(#( #patterns: #pattern_types ),*);
    let pattern_refs = quote!(#( &#patterns ),*);
    let check = quote! {
        fn fields_match(&self, #( #patterns: &#pattern_types ),*) -> bool {
            #( #patterns.matches(&self.target.#members) )&&*
        }
    };

    let matcher_doc = format!(" Side-effecting structural matcher over [`{}`].", info.name);
    let value_doc = format!(" Value-producing structural matcher over [`{}`].", info.name);

    quote! {
        #[doc = #matcher_doc]
        #vis struct #matcher<'a> {
            target: &'a #name,
            matched: bool,
        }

        impl<'a> #matcher<'a> {
            #vis fn new(target: &'a #name) -> Self {
                Self { target, matched: false }
            }

            #check

            /// Runs `action` if no earlier clause matched and every pattern matches.
            #vis fn when(mut self, #clause, action: impl FnOnce(&#name)) -> Self {
                if !self.matched && self.fields_match(#pattern_refs) {
                    self.matched = true;
                    action(self.target);
                }
                self
            }

            /// Like `when`, but the clause also requires `guard` to hold.
            #vis fn when_guard(
                mut self,
                #clause,
                guard: impl FnOnce(&#name) -> bool,
                action: impl FnOnce(&#name),
            ) -> Self {
                if !self.matched && self.fields_match(#pattern_refs) && guard(self.target) {
                    self.matched = true;
                    action(self.target);
                }
                self
            }

            /// Runs `action` when no clause matched.
            #vis fn default(self, action: impl FnOnce(&#name)) {
                if !self.matched {
                    action(self.target);
                }
            }

            #vis fn is_matched(&self) -> bool {
                self.matched
            }
        }

        #[doc = #value_doc]
        #vis struct #value_matcher<'a, R> {
            target: &'a #name,
            result: Option<R>,
        }

        impl<'a, R> #value_matcher<'a, R> {
            #vis fn new(target: &'a #name) -> Self {
                Self { target, result: None }
            }

            #check

            #vis fn when(mut self, #clause, value: R) -> Self {
                if self.result.is_none() && self.fields_match(#pattern_refs) {
                    self.result = Some(value);
                }
                self
            }

            #vis fn when_with(mut self, #clause, f: impl FnOnce(&#name) -> R) -> Self {
                if self.result.is_none() && self.fields_match(#pattern_refs) {
                    self.result = Some(f(self.target));
                }
                self
            }

            #vis fn when_guard(
                mut self,
                #clause,
                guard: impl FnOnce(&#name) -> bool,
                value: R,
            ) -> Self {
                if self.result.is_none() && self.fields_match(#pattern_refs) && guard(self.target) {
                    self.result = Some(value);
                }
                self
            }

            /// The matched value, or `value` when no clause matched.
            #vis fn default(self, value: R) -> R {
                match self.result {
                    Some(result) => result,
                    None => value,
                }
            }

            #vis fn default_with(self, f: impl FnOnce(&#name) -> R) -> R {
                match self.result {
                    Some(result) => result,
                    None => f(self.target),
                }
            }

            #vis fn result(self) -> Option<R> {
                self.result
            }
        }
    }
}

fn pattern_name(index: usize, field: &str) -> Ident {
    let bare = field.strip_prefix("r#").unwrap_or(field);
    if bare.is_empty() {
        format_ident!("field{}", index)
    } else if RESERVED.contains(&bare) {
        format_ident!("{}_pattern", bare)
    } else {
        ident(bare)
    }
}
