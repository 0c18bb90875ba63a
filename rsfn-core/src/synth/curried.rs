//! Curried synthesizer
//!
//! Turns `fn f(a: A, b: B) -> R` into
//!
//! ```text
//! pub fn f_curried() -> Box<dyn Fn(A) -> Box<dyn Fn(B) -> R>>
//! ```
//!
//! Every level is a reusable `Fn`: owned arguments captured by outer levels
//! are cloned before they move into the next level and again at the final
//! call, borrowed ones are copied. A variadic parameter
//! (`impl IntoIterator<Item = T>`) is taken as `Vec<T>` and forwarded through
//! `into_iter()`.
//!
//! Elided lifetimes (`&T`, `Cow<'_, T>`) are tied to one wrapper lifetime
//! `'a`, which then bounds every boxed level:
//!
//! ```text
//! pub fn greet_curried<'a>() -> Box<dyn Fn(&'a str) -> Box<dyn Fn(usize) -> String + 'a> + 'a>
//! ```

use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};
use syn::visit_mut::{self, VisitMut};
use syn::{Lifetime, Type};

use super::{ident, is_variadic, parse_type, to_snake_case};
use crate::model::FuncInfo;

struct Param {
    name: Ident,
    ty: Type,
    variadic: bool,
}

impl Param {
    fn borrowed(&self) -> bool {
        matches!(self.ty, Type::Reference(_))
    }

    /// Argument expression at the final call
    fn forward(&self, captured: bool) -> TokenStream {
        let name = &self.name;
        let value = if captured && !self.borrowed() { quote!(#name.clone()) } else { quote!(#name) };
        if self.variadic {
            quote!(#value.into_iter())
        } else {
            value
        }
    }
}

/// Names every elided lifetime after the wrapper lifetime
struct ElidedLifetimes {
    lifetime: Lifetime,
    found: bool,
}

impl VisitMut for ElidedLifetimes {
    fn visit_type_reference_mut(&mut self, reference: &mut syn::TypeReference) {
        if reference.lifetime.is_none() {
            reference.lifetime = Some(self.lifetime.clone());
            self.found = true;
        }
        visit_mut::visit_type_reference_mut(self, reference);
    }

    fn visit_lifetime_mut(&mut self, lifetime: &mut Lifetime) {
        if lifetime.ident == "_" {
            *lifetime = self.lifetime.clone();
            self.found = true;
        }
    }

    // fn pointers and Fn-trait sugar bind their own lifetimes
    fn visit_type_bare_fn_mut(&mut self, _: &mut syn::TypeBareFn) {}

    fn visit_parenthesized_generic_arguments_mut(&mut self, _: &mut syn::ParenthesizedGenericArguments) {}
}

pub fn synthesize(func: &FuncInfo) -> TokenStream {
    let target = ident(&func.name);
    let wrapper = format_ident!("{}_curried", to_snake_case(func.name.strip_prefix("r#").unwrap_or(&func.name)));

    let mut elided = ElidedLifetimes { lifetime: Lifetime::new("'a", Span::call_site()), found: false };

    let mut params: Vec<Param> = func
        .params
        .iter()
        .enumerate()
        .map(|(i, p)| Param {
            name: if p.name.is_empty() { format_ident!("argument{}", i) } else { ident(&p.name) },
            ty: parse_type(&p.ty),
            variadic: is_variadic(&p.ty),
        })
        .collect();
    let mut results: Vec<Type> = func.results.iter().map(|r| parse_type(&r.ty)).collect();

    for ty in params.iter_mut().map(|p| &mut p.ty).chain(results.iter_mut()) {
        elided.visit_type_mut(ty);
    }
    let lifetime = elided.found.then_some(elided.lifetime);
    let generics = lifetime.as_ref().map(|lt| quote!(<#lt>));

    let result = result_type(&results);
    let doc = format!(" Curried form of [`{}`], one argument per call.", func.name);

    // `self::` keeps parameters named like the function from shadowing it
    if params.is_empty() {
        let ret = result.as_ref().map(|ty| quote!(-> #ty));
        return quote! {
            #[doc = #doc]
            pub fn #wrapper #generics() #ret {
                self::#target()
            }
        };
    }

    let chain = Chain { target: &target, params: &params, result: result.as_ref(), lifetime: lifetime.as_ref() };
    let outer = chain.remaining_type(0);
    let body = chain.closure(0);

    quote! {
        #[doc = #doc]
        pub fn #wrapper #generics() -> #outer {
            #body
        }
    }
}

/// `()` for no results, the type itself for one, a tuple for several
fn result_type(types: &[Type]) -> Option<TokenStream> {
    match types {
        [] => None,
        [single] => Some(quote!(#single)),
        many => Some(quote!((#( #many ),*))),
    }
}

struct Chain<'s> {
    target: &'s Ident,
    params: &'s [Param],
    result: Option<&'s TokenStream>,
    lifetime: Option<&'s Lifetime>,
}

impl Chain<'_> {
    /// Type of the closure chain starting at `params[level]`
    fn remaining_type(&self, level: usize) -> TokenStream {
        let Some(param) = self.params.get(level) else {
            return match self.result {
                Some(ty) => ty.clone(),
                None => quote!(()),
            };
        };
        let ty = &param.ty;
        let bound = self.lifetime.map(|lt| quote!(+ #lt));
        if level + 1 == self.params.len() {
            let ret = self.result.map(|r| quote!(-> #r));
            quote!(Box<dyn Fn(#ty) #ret #bound>)
        } else {
            let next = self.remaining_type(level + 1);
            quote!(Box<dyn Fn(#ty) -> #next #bound>)
        }
    }

    /// Boxed closure taking `params[level]`; earlier parameters are captured
    fn closure(&self, level: usize) -> TokenStream {
        let param = &self.params[level];
        let name = &param.name;
        let ty = &param.ty;
        let target = self.target;

        if level + 1 == self.params.len() {
            let ret = self.result.map(|r| quote!(-> #r));
            let args = self.params.iter().enumerate().map(|(i, p)| p.forward(i < level));
            return quote! {
                Box::new(move |#name: #ty| #ret { self::#target(#( #args ),*) })
            };
        }

        let captured: Vec<&Ident> =
            self.params[..level].iter().filter(|p| !p.borrowed()).map(|p| &p.name).collect();
        let next_type = self.remaining_type(level + 1);
        let inner = self.closure(level + 1);
        quote! {
            Box::new(move |#name: #ty| -> #next_type {
                #( let #captured = #captured.clone(); )*
                #inner
            })
        }
    }
}
