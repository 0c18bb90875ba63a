//! Declaration scanner
//!
//! Walks the `.rs` files of one directory (non-recursive), collects every
//! `struct` and free `fn` item, resolves the directive attached to each one
//! and renders field, parameter and result types back to source text.
//!
//! Directives live in doc comments:
//!
//! ```text
//! /// rsfn: record
//! struct Person { name: String, age: u32 }
//! ```
//!
//! A struct without a directive of its own inherits the first directive found
//! in the doc comments of its enclosing inline modules (innermost first).

use std::fs;
use std::path::{Path, PathBuf};

use quote::ToTokens;
use syn::{
    Attribute, Expr, ExprLit, Fields, FnArg, GenericArgument, Item, ItemFn, ItemStruct, Lit, Meta,
    Pat, PathArguments, ReturnType, Type, TypeParamBound,
};

use crate::error::{Error, Result};
use crate::model::{
    Declaration, FieldInfo, FuncInfo, ParamInfo, SourcePosition, StructInfo, Visibility,
};

/// Rendering of a type expression the scanner does not understand
pub const UNKNOWN_TYPE: &str = "_";

/// Leading token of a rendered variadic parameter type (`...T`)
pub const VARIADIC_PREFIX: &str = "...";

/// Default directive marker (`/// rsfn: <kind>`)
pub const DEFAULT_MARKER: &str = "rsfn";

/// Scanner settings
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub marker: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self { marker: DEFAULT_MARKER.to_string() }
    }
}

/// Everything found in one scan pass, in file order then source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
    pub structs: Vec<StructInfo>,
    pub funcs: Vec<FuncInfo>,
}

impl ScanOutput {
    /// Tagged view over all scanned declarations, structs first
    pub fn declarations(&self) -> Vec<Declaration> {
        self.structs
            .iter()
            .cloned()
            .map(Declaration::Struct)
            .chain(self.funcs.iter().cloned().map(Declaration::Func))
            .collect()
    }

    /// Declarations carrying a non-empty directive
    pub fn candidates(&self) -> Vec<Declaration> {
        self.declarations().into_iter().filter(|d| !d.directive().is_empty()).collect()
    }

    fn extend(&mut self, other: ScanOutput) {
        self.structs.extend(other.structs);
        self.funcs.extend(other.funcs);
    }
}

/// Scan every `*.rs` file directly inside `dir`.
///
/// Files are visited in name order so repeated runs see declarations in the
/// same order. The first unreadable or unparsable file aborts the scan.
pub fn scan_dir(dir: &Path, options: &ScanOptions) -> Result<ScanOutput> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| Error::read(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "rs"))
        .collect();
    files.sort();

    let mut output = ScanOutput::default();
    for path in &files {
        let source = fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        output.extend(scan_source(path, &source, options)?);
    }

    log::debug!(
        "scanned {} file(s) in {}: {} struct(s), {} fn(s)",
        files.len(),
        dir.display(),
        output.structs.len(),
        output.funcs.len()
    );
    Ok(output)
}

/// Scan one file's contents. `path` is only used for positions and errors.
pub fn scan_source(path: &Path, source: &str, options: &ScanOptions) -> Result<ScanOutput> {
    let file = syn::parse_file(source).map_err(|e| Error::parse(path, &e))?;
    let mut collector = Collector { marker: &options.marker, path, output: ScanOutput::default() };
    collector.visit_items(&file.items, &package_name_for(path), &[]);
    Ok(collector.output)
}

struct Collector<'a> {
    marker: &'a str,
    path: &'a Path,
    output: ScanOutput,
}

impl<'a> Collector<'a> {
    fn visit_items<'i>(&mut self, items: &'i [Item], package: &str, enclosing: &[&'i [Attribute]]) {
        for item in items {
            match item {
                Item::Struct(s) => {
                    let info = self.convert_struct(s, package, enclosing);
                    self.output.structs.push(info);
                }
                Item::Fn(f) => {
                    let info = self.convert_fn(f, package);
                    self.output.funcs.push(info);
                }
                Item::Mod(m) => {
                    if let Some((_, nested)) = &m.content {
                        let package = format!("{}::{}", package, m.ident);
                        let mut chain = enclosing.to_vec();
                        chain.push(m.attrs.as_slice());
                        self.visit_items(nested, &package, &chain);
                    }
                }
                _ => {}
            }
        }
    }

    fn convert_struct(
        &self,
        s: &ItemStruct,
        package: &str,
        enclosing: &[&[Attribute]],
    ) -> StructInfo {
        let directive = directive_in(&s.attrs, self.marker)
            .or_else(|| enclosing.iter().rev().find_map(|attrs| directive_in(attrs, self.marker)))
            .unwrap_or_default();

        let fields = match &s.fields {
            Fields::Named(named) => named.named.iter().map(convert_field).collect(),
            Fields::Unnamed(unnamed) => unnamed.unnamed.iter().map(convert_field).collect(),
            Fields::Unit => Vec::new(),
        };

        StructInfo {
            package_name: package.to_string(),
            name: s.ident.to_string(),
            fields,
            directive,
            visibility: convert_visibility(&s.vis),
            generic: !s.generics.params.is_empty(),
            position: self.position(&s.ident),
        }
    }

    fn convert_fn(&self, f: &ItemFn, package: &str) -> FuncInfo {
        let params = f
            .sig
            .inputs
            .iter()
            .filter_map(|arg| match arg {
                FnArg::Typed(pt) => {
                    Some(ParamInfo { name: pattern_name(&pt.pat), ty: render_type(&pt.ty) })
                }
                FnArg::Receiver(_) => None,
            })
            .collect();

        let results = match &f.sig.output {
            ReturnType::Default => Vec::new(),
            ReturnType::Type(_, ty) => split_results(ty),
        };

        FuncInfo {
            package_name: package.to_string(),
            name: f.sig.ident.to_string(),
            params,
            results,
            directive: directive_in(&f.attrs, self.marker).unwrap_or_default(),
            visibility: convert_visibility(&f.vis),
            generic: !f.sig.generics.params.is_empty(),
            is_async: f.sig.asyncness.is_some(),
            position: self.position(&f.sig.ident),
        }
    }

    fn position(&self, ident: &syn::Ident) -> SourcePosition {
        let start = ident.span().start();
        SourcePosition { file: self.path.to_path_buf(), line: start.line, column: start.column + 1 }
    }
}

/// Module path of a file relative to its crate root
fn package_name_for(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    match stem {
        "lib" | "main" | "" => "crate".to_string(),
        "mod" => path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| "crate".to_string()),
        other => other.to_string(),
    }
}

/// Lines of every doc attribute, in order
fn doc_lines(attrs: &[Attribute]) -> Vec<String> {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        if let Meta::NameValue(nv) = &attr.meta {
            if let Expr::Lit(ExprLit { lit: Lit::Str(text), .. }) = &nv.value {
                lines.extend(text.value().lines().map(str::to_string));
            }
        }
    }
    lines
}

/// First directive found in `attrs`, if any
pub(crate) fn directive_in(attrs: &[Attribute], marker: &str) -> Option<String> {
    let prefix = format!("{}:", marker);
    doc_lines(attrs).iter().find_map(|line| {
        // block doc comments keep their leading `*` decoration
        let text = line.trim().trim_start_matches('*').trim();
        text.strip_prefix(&prefix).map(|rest| rest.trim().to_string())
    })
}

fn convert_field(field: &syn::Field) -> FieldInfo {
    let tag = field
        .attrs
        .iter()
        .filter(|attr| !attr.path().is_ident("doc"))
        .map(|attr| attr.to_token_stream().to_string())
        .collect::<Vec<_>>()
        .join(" ");

    FieldInfo {
        name: field.ident.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        ty: render_type(&field.ty),
        tag,
        visibility: convert_visibility(&field.vis),
    }
}

fn convert_visibility(vis: &syn::Visibility) -> Visibility {
    match vis {
        syn::Visibility::Public(_) => Visibility::Public,
        syn::Visibility::Inherited => Visibility::Private,
        syn::Visibility::Restricted(r) => {
            let path = render_path(&r.path);
            if r.in_token.is_some() {
                Visibility::Restricted(format!("pub(in {})", path))
            } else {
                Visibility::Restricted(format!("pub({})", path))
            }
        }
    }
}

/// Parameter name, or empty when the pattern binds no single identifier
fn pattern_name(pat: &Pat) -> String {
    match pat {
        Pat::Ident(pi) if pi.subpat.is_none() => pi.ident.to_string(),
        _ => String::new(),
    }
}

/// Tuples of two or more elements are multiple results; `()` is none
fn split_results(ty: &Type) -> Vec<ParamInfo> {
    match ty {
        Type::Tuple(tuple) if tuple.elems.is_empty() => Vec::new(),
        Type::Tuple(tuple) if tuple.elems.len() >= 2 => tuple
            .elems
            .iter()
            .map(|elem| ParamInfo { name: String::new(), ty: render_type(elem) })
            .collect(),
        other => vec![ParamInfo { name: String::new(), ty: render_type(other) }],
    }
}

/// Render a type expression back to source text.
///
/// Total over all inputs: shapes without a rendering become [`UNKNOWN_TYPE`].
pub fn render_type(ty: &Type) -> String {
    match ty {
        Type::Path(tp) => match &tp.qself {
            Some(qself) => render_qualified(qself, &tp.path),
            None => render_path(&tp.path),
        },
        Type::Reference(r) => {
            let mut out = String::from("&");
            if let Some(lifetime) = &r.lifetime {
                out.push_str(&format!("'{} ", lifetime.ident));
            }
            if r.mutability.is_some() {
                out.push_str("mut ");
            }
            out.push_str(&render_type(&r.elem));
            out
        }
        Type::Ptr(p) => {
            let kind = if p.mutability.is_some() { "mut" } else { "const" };
            format!("*{} {}", kind, render_type(&p.elem))
        }
        Type::Slice(s) => format!("[{}]", render_type(&s.elem)),
        Type::Array(a) => format!("[{}; {}]", render_type(&a.elem), a.len.to_token_stream()),
        Type::Tuple(t) => match t.elems.len() {
            0 => "()".to_string(),
            1 => format!("({},)", render_type(&t.elems[0])),
            _ => format!("({})", t.elems.iter().map(render_type).collect::<Vec<_>>().join(", ")),
        },
        Type::TraitObject(t) => format!("dyn {}", render_bounds(t.bounds.iter())),
        Type::ImplTrait(i) => match variadic_item(i.bounds.iter()) {
            Some(item) => format!("{}{}", VARIADIC_PREFIX, item),
            None => format!("impl {}", render_bounds(i.bounds.iter())),
        },
        Type::BareFn(f) => render_bare_fn(f),
        Type::Never(_) => "!".to_string(),
        Type::Paren(p) => format!("({})", render_type(&p.elem)),
        Type::Group(g) => render_type(&g.elem),
        _ => UNKNOWN_TYPE.to_string(),
    }
}

fn render_path(path: &syn::Path) -> String {
    let mut out = String::new();
    if path.leading_colon.is_some() {
        out.push_str("::");
    }
    for (i, segment) in path.segments.iter().enumerate() {
        if i > 0 {
            out.push_str("::");
        }
        out.push_str(&segment.ident.to_string());
        out.push_str(&render_path_arguments(&segment.arguments));
    }
    out
}

fn render_path_arguments(arguments: &PathArguments) -> String {
    match arguments {
        PathArguments::None => String::new(),
        PathArguments::AngleBracketed(args) => {
            let rendered: Vec<String> = args.args.iter().map(render_generic_argument).collect();
            format!("<{}>", rendered.join(", "))
        }
        PathArguments::Parenthesized(args) => {
            let inputs: Vec<String> = args.inputs.iter().map(render_type).collect();
            let mut out = format!("({})", inputs.join(", "));
            if let ReturnType::Type(_, ty) = &args.output {
                out.push_str(&format!(" -> {}", render_type(ty)));
            }
            out
        }
    }
}

fn render_generic_argument(arg: &GenericArgument) -> String {
    match arg {
        GenericArgument::Lifetime(lt) => format!("'{}", lt.ident),
        GenericArgument::Type(ty) => render_type(ty),
        GenericArgument::Const(expr) => expr.to_token_stream().to_string(),
        GenericArgument::AssocType(assoc) => format!("{} = {}", assoc.ident, render_type(&assoc.ty)),
        GenericArgument::AssocConst(assoc) => {
            format!("{} = {}", assoc.ident, assoc.value.to_token_stream())
        }
        GenericArgument::Constraint(c) => {
            format!("{}: {}", c.ident, render_bounds(c.bounds.iter()))
        }
        _ => UNKNOWN_TYPE.to_string(),
    }
}

/// `<T as Trait>::Assoc`
fn render_qualified(qself: &syn::QSelf, path: &syn::Path) -> String {
    let segments: Vec<String> = path
        .segments
        .iter()
        .map(|s| format!("{}{}", s.ident, render_path_arguments(&s.arguments)))
        .collect();
    let (trait_part, rest) = segments.split_at(qself.position.min(segments.len()));
    let head = if trait_part.is_empty() {
        format!("<{}>", render_type(&qself.ty))
    } else {
        let colon = if path.leading_colon.is_some() { "::" } else { "" };
        format!("<{} as {}{}>", render_type(&qself.ty), colon, trait_part.join("::"))
    };
    if rest.is_empty() {
        head
    } else {
        format!("{}::{}", head, rest.join("::"))
    }
}

fn render_bounds<'b>(bounds: impl Iterator<Item = &'b TypeParamBound>) -> String {
    bounds
        .map(|bound| match bound {
            TypeParamBound::Trait(t) => {
                let maybe = if matches!(t.modifier, syn::TraitBoundModifier::Maybe(_)) {
                    "?"
                } else {
                    ""
                };
                format!("{}{}", maybe, render_path(&t.path))
            }
            TypeParamBound::Lifetime(lt) => format!("'{}", lt.ident),
            _ => UNKNOWN_TYPE.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Item type of an `impl IntoIterator<Item = T>` / `impl Iterator<Item = T>`
fn variadic_item<'b>(mut bounds: impl Iterator<Item = &'b TypeParamBound>) -> Option<String> {
    let TypeParamBound::Trait(bound) = bounds.next()? else {
        return None;
    };
    let segment = bound.path.segments.last()?;
    if segment.ident != "IntoIterator" && segment.ident != "Iterator" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::AssocType(assoc) if assoc.ident == "Item" => Some(render_type(&assoc.ty)),
        _ => None,
    })
}

fn render_bare_fn(f: &syn::TypeBareFn) -> String {
    let mut out = String::new();
    if f.unsafety.is_some() {
        out.push_str("unsafe ");
    }
    if let Some(abi) = &f.abi {
        match &abi.name {
            Some(name) => out.push_str(&format!("extern \"{}\" ", name.value())),
            None => out.push_str("extern "),
        }
    }
    let mut inputs: Vec<String> = f.inputs.iter().map(|arg| render_type(&arg.ty)).collect();
    if f.variadic.is_some() {
        inputs.push("...".to_string());
    }
    out.push_str(&format!("fn({})", inputs.join(", ")));
    if let ReturnType::Type(_, ty) = &f.output {
        out.push_str(&format!(" -> {}", render_type(ty)));
    }
    out
}
