//! Declaration model
//!
//! Normalized representation of the declarations found by the scanner. Every
//! record is produced once per scan pass and handed by value (or shared
//! reference) through classification and synthesis; nothing here is mutated
//! after construction.
//!
//! Type expressions are kept as rendered source text. Synthesizers re-parse
//! them when they build output tokens.

use std::fmt;
use std::path::PathBuf;

/// Where a declaration starts in its source file (1-based line and column).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourcePosition {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Declared visibility of an item or field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Visibility {
    /// No visibility modifier
    #[default]
    Private,
    /// `pub`
    Public,
    /// `pub(crate)`, `pub(super)`, `pub(in path)`; holds the rendered modifier
    Restricted(String),
}

impl Visibility {
    pub fn is_private(&self) -> bool {
        matches!(self, Visibility::Private)
    }

    /// Source text of the modifier, empty for private items
    pub fn as_source(&self) -> &str {
        match self {
            Visibility::Private => "",
            Visibility::Public => "pub",
            Visibility::Restricted(text) => text,
        }
    }
}

/// A struct field. `name` is empty for tuple-struct fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldInfo {
    pub name: String,
    pub ty: String,
    /// Non-doc attributes of the field rendered as source, space separated
    pub tag: String,
    pub visibility: Visibility,
}

/// A scanned `struct` declaration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructInfo {
    pub package_name: String,
    pub name: String,
    pub fields: Vec<FieldInfo>,
    pub directive: String,
    pub visibility: Visibility,
    /// Declares lifetime, type or const parameters
    pub generic: bool,
    pub position: SourcePosition,
}

impl StructInfo {
    /// True when every field is a tuple field (`struct Pair(i32, i32)`)
    pub fn is_tuple(&self) -> bool {
        !self.fields.is_empty() && self.fields.iter().all(|f| f.name.is_empty())
    }
}

/// A function parameter or result slot. `name` is empty when the pattern is
/// not a plain identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParamInfo {
    pub name: String,
    pub ty: String,
}

/// A scanned free function
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FuncInfo {
    pub package_name: String,
    pub name: String,
    pub params: Vec<ParamInfo>,
    pub results: Vec<ParamInfo>,
    pub directive: String,
    pub visibility: Visibility,
    pub generic: bool,
    pub is_async: bool,
    pub position: SourcePosition,
}

/// Tag for the two declaration variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Struct,
    Func,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationKind::Struct => f.write_str("struct"),
            DeclarationKind::Func => f.write_str("fn"),
        }
    }
}

/// Closed set of declarations produced by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Struct(StructInfo),
    Func(FuncInfo),
}

impl Declaration {
    pub fn kind(&self) -> DeclarationKind {
        match self {
            Declaration::Struct(_) => DeclarationKind::Struct,
            Declaration::Func(_) => DeclarationKind::Func,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Declaration::Struct(s) => &s.name,
            Declaration::Func(f) => &f.name,
        }
    }

    pub fn directive(&self) -> &str {
        match self {
            Declaration::Struct(s) => &s.directive,
            Declaration::Func(f) => &f.directive,
        }
    }

    pub fn position(&self) -> &SourcePosition {
        match self {
            Declaration::Struct(s) => &s.position,
            Declaration::Func(f) => &f.position,
        }
    }

    pub fn package_name(&self) -> &str {
        match self {
            Declaration::Struct(s) => &s.package_name,
            Declaration::Func(f) => &f.package_name,
        }
    }
}
