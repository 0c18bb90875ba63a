//! Pipeline synthesizer
//!
//! Field types of the annotated struct are the stage boundaries: a struct
//! with fields `T1, T2, T3` yields a composer of two stages `T1 -> T2` and
//! `T2 -> T3`. Stage failures are runtime `StageError`s.

use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};
use syn::Type;

use super::{parse_type, to_snake_case, visibility, SynthContext};
use crate::model::StructInfo;

pub fn synthesize(info: &StructInfo, ctx: &SynthContext) -> TokenStream {
    let rt = &ctx.runtime;
    let vis = visibility(&info.visibility);
    let snake = to_snake_case(&info.name);

    let composer = format_ident!("{}_composer", snake);
    let with_handler = format_ident!("{}_composer_with_handler", snake);
    let fallback = format_ident!("{}_fallback", snake);
    let log_and_propagate = format_ident!("{}_log_and_propagate", snake);

    let types: Vec<Type> = info.fields.iter().map(|f| parse_type(&f.ty)).collect();
    let (input, output) = match (types.first(), types.last()) {
        (Some(first), Some(last)) if types.len() >= 2 => (first, last),
        _ => return TokenStream::new(),
    };

    let stages: Vec<_> = (1..types.len()).map(|i| format_ident!("stage{}", i)).collect();
    let stage_params: Vec<TokenStream> = stages
        .iter()
        .zip(types.windows(2))
        .map(|(stage, pair)| {
            let (from, to) = (&pair[0], &pair[1]);
            quote!(#stage: impl Fn(#from) -> #rt::StageResult<#to>)
        })
        .collect();

    let (leading, last) = stages.split_at(stages.len() - 1);
    let last = &last[0];

    let handled: Vec<TokenStream> = leading
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            let index = Literal::usize_unsuffixed(i + 1);
            quote! {
                let value = match #stage(value) {
                    Ok(value) => value,
                    Err(error) => return handler(#index, error),
                };
            }
        })
        .collect();
    let last_index = Literal::usize_unsuffixed(stages.len());

    let composer_doc = format!(
        " Runs the {} stage(s) of [`{}`] in order, stopping at the first failure.",
        stages.len(),
        info.name
    );
    let handler_doc = format!(
        " Like [`{}`], but a failure at stage `i` (1-based) yields `handler(i, error)`.",
        composer
    );

    quote! {
        #[doc = #composer_doc]
        #vis fn #composer(#( #stage_params ),*) -> impl Fn(#input) -> #rt::StageResult<#output> {
            move |value: #input| -> #rt::StageResult<#output> {
                #( let value = #leading(value)?; )*
                #last(value)
            }
        }

        #[doc = #handler_doc]
        #vis fn #with_handler(
            #( #stage_params, )*
            handler: impl Fn(usize, #rt::StageError) -> #rt::StageResult<#output>,
        ) -> impl Fn(#input) -> #rt::StageResult<#output> {
            move |value: #input| -> #rt::StageResult<#output> {
                #( #handled )*
                match #last(value) {
                    Ok(value) => Ok(value),
                    Err(error) => handler(#last_index, error),
                }
            }
        }

        /// Handler that recovers from any stage failure with `value`.
        #vis fn #fallback(value: #output) -> impl Fn(usize, #rt::StageError) -> #rt::StageResult<#output> {
            #rt::pipeline::fallback_to(value)
        }

        /// Handler that logs the failing stage and passes the error on.
        #vis fn #log_and_propagate() -> impl Fn(usize, #rt::StageError) -> #rt::StageResult<#output> {
            #rt::pipeline::log_and_propagate()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldInfo;
    use crate::synth::{render, squash};

    fn flow(types: &[&str]) -> StructInfo {
        StructInfo {
            name: "OrderFlow".into(),
            fields: types
                .iter()
                .enumerate()
                .map(|(i, t)| FieldInfo { name: format!("step{}", i), ty: t.to_string(), ..Default::default() })
                .collect(),
            directive: "pipeline".into(),
            ..Default::default()
        }
    }

    #[test]
    fn composer_chains_adjacent_field_types() {
        let out = squash(&render(synthesize(&flow(&["String", "u32", "bool"]), &SynthContext::default())));
        assert!(out.contains("fn order_flow_composer(stage1: impl Fn(String) -> ::rsfn_runtime::StageResult<u32>, stage2: impl Fn(u32) -> ::rsfn_runtime::StageResult<bool>) -> impl Fn(String) -> ::rsfn_runtime::StageResult<bool> {"));
        assert!(out.contains("let value = stage1(value)?; stage2(value)"));
    }

    #[test]
    fn handler_variant_reports_one_based_stage() {
        let out = squash(&render(synthesize(&flow(&["String", "u32", "bool"]), &SynthContext::default())));
        assert!(out.contains("handler: impl Fn(usize, ::rsfn_runtime::StageError) -> ::rsfn_runtime::StageResult<bool>"));
        assert!(out.contains("Err(error) => return handler(1, error)"));
        assert!(out.contains("Err(error) => handler(2, error)"));
    }

    #[test]
    fn canned_handlers_delegate_to_runtime() {
        let out = squash(&render(synthesize(&flow(&["i32", "i32"]), &SynthContext::default())));
        assert!(out.contains("fn order_flow_fallback(value: i32)"));
        assert!(out.contains("::rsfn_runtime::pipeline::fallback_to(value)"));
        assert!(out.contains("fn order_flow_log_and_propagate()"));
        assert!(out.contains("::rsfn_runtime::pipeline::log_and_propagate()"));
    }

    #[test]
    fn two_fields_make_a_single_stage() {
        let out = squash(&render(synthesize(&flow(&["i32", "String"]), &SynthContext::default())));
        assert!(out.contains("-> ::rsfn_runtime::StageResult<String> { stage1(value) }"));
        assert!(!out.contains("stage2"));
    }

    #[test]
    fn runtime_path_is_configurable() {
        let ctx = SynthContext::new("crate::rt").unwrap();
        let out = squash(&render(synthesize(&flow(&["i32", "i32"]), &ctx)));
        assert!(out.contains("crate::rt::StageResult<i32>"));
        assert!(!out.contains("rsfn_runtime"));
    }

    #[test]
    fn fewer_than_two_fields_emit_nothing() {
        assert!(synthesize(&flow(&["i32"]), &SynthContext::default()).is_empty());
    }
}
