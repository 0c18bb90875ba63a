//! Record synthesizer
//!
//! Gives a private struct with private fields a public read-only face: an
//! accessor trait, a positional constructor returning `impl <Name>Record`
//! and the accessor impl.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::{ident, parse_type, to_snake_case};
use crate::model::StructInfo;

pub fn synthesize(info: &StructInfo) -> TokenStream {
    let name = ident(&info.name);
    let record = format_ident!("{}Record", info.name);
    let constructor = format_ident!("new_{}", to_snake_case(&info.name));

    let names: Vec<_> = info.fields.iter().map(|f| ident(&f.name)).collect();
    let types: Vec<_> = info.fields.iter().map(|f| parse_type(&f.ty)).collect();

    let trait_doc = format!(" Read-only access to [`{}`].", info.name);
    let constructor_doc = format!(" Builds a [`{}`] from every field, in declaration order.", info.name);

    quote! {
        #[doc = #trait_doc]
        pub trait #record {
            #( fn #names(&self) -> &#types; )*
        }

        #[doc = #constructor_doc]
        pub fn #constructor(#( #names: #types ),*) -> impl #record {
            #name { #( #names ),* }
        }

        impl #record for #name {
            #( fn #names(&self) -> &#types { &self.#names } )*
        }
    }
}
