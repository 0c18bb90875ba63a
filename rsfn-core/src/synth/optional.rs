//! Optional synthesizer
//!
//! Functional options: each `with_<field>` builds a boxed closure that sets
//! one field, and `with_options` applies a sequence of them to a zero value.

use std::collections::HashSet;

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::{Index, Member};

use super::{ident, parse_type, visibility};
use crate::model::StructInfo;

const AGGREGATE: &str = "with_options";

pub fn synthesize(info: &StructInfo) -> TokenStream {
    let name = ident(&info.name);
    let option = format_ident!("{}Option", info.name);
    let vis = visibility(&info.visibility);

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

    let names = setter_names(info);
    let aggregate = format_ident!("{}", AGGREGATE);

    let setters = info.fields.iter().zip(&members).zip(&names).map(|((field, member), setter)| {
        let ty = parse_type(&field.ty);
        quote! {
            #vis fn #setter(value: #ty) -> #option {
                Box::new(move |target: &mut #name| target.#member = value)
            }
        }
    });

    let alias_doc = format!(" Deferred assignment of one [`{}`] field.", info.name);

    quote! {
        #[doc = #alias_doc]
        #vis type #option = Box<dyn FnOnce(&mut #name)>;

        impl #name {
            #( #setters )*

            /// Applies `options` in order to a value whose fields all start at their defaults.
            #vis fn #aggregate(options: impl IntoIterator<Item = #option>) -> #name {
                let mut target = #name { #( #members: Default::default() ),* };
                for option in options {
                    option(&mut target);
                }
                target
            }
        }
    }
}

/// `with_<field>`, or `with_field<i>` for tuple fields. A name already taken
/// by the aggregate constructor or an earlier setter gets `_field` appended.
fn setter_names(info: &StructInfo) -> Vec<Ident> {
    let mut taken = HashSet::from([AGGREGATE.to_string()]);
    info.fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let bare = field.name.strip_prefix("r#").unwrap_or(&field.name);
            let mut name = if bare.is_empty() { format!("with_field{}", i) } else { format!("with_{}", bare) };
            while !taken.insert(name.clone()) {
                name.push_str("_field");
            }
            format_ident!("{}", name)
        })
        .collect()
}
