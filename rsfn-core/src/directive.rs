//! Directive classifier
//!
//! Parses raw directive text into [`DirectiveKind`] and checks the structural
//! preconditions each kind places on its declaration. Declarations that fail a
//! precondition are not errors; they are recorded as skips and left alone.

use std::fmt;

use crate::model::{Declaration, DeclarationKind, SourcePosition, StructInfo};

/// Supported generation kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Record,
    Optional,
    Curried,
    Pipeline,
    Match,
    /// Directive text naming no supported kind
    Unrecognized(String),
}

impl DirectiveKind {
    /// Parse directive text. Only the first word counts; anything after it is
    /// ignored. Returns `None` for empty text.
    pub fn parse(directive: &str) -> Option<Self> {
        let word = directive.split_whitespace().next()?;
        let kind = match word.to_ascii_lowercase().as_str() {
            "record" => DirectiveKind::Record,
            "optional" => DirectiveKind::Optional,
            "curried" => DirectiveKind::Curried,
            "pipeline" => DirectiveKind::Pipeline,
            "match" => DirectiveKind::Match,
            _ => DirectiveKind::Unrecognized(word.to_string()),
        };
        Some(kind)
    }

    /// Name used in generated file names and logs
    pub fn name(&self) -> &str {
        match self {
            DirectiveKind::Record => "record",
            DirectiveKind::Optional => "optional",
            DirectiveKind::Curried => "curried",
            DirectiveKind::Pipeline => "pipeline",
            DirectiveKind::Match => "match",
            DirectiveKind::Unrecognized(word) => word,
        }
    }

    /// Declaration variant this kind applies to
    pub fn target(&self) -> Option<DeclarationKind> {
        match self {
            DirectiveKind::Curried => Some(DeclarationKind::Func),
            DirectiveKind::Unrecognized(_) => None,
            _ => Some(DeclarationKind::Struct),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            DirectiveKind::Record => 0,
            DirectiveKind::Optional => 1,
            DirectiveKind::Curried => 2,
            DirectiveKind::Pipeline => 3,
            DirectiveKind::Match => 4,
            DirectiveKind::Unrecognized(_) => 5,
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a directive was not synthesized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Unrecognized(String),
    WrongDeclaration { expected: DeclarationKind, found: DeclarationKind },
    PublicType,
    PublicField(String),
    UnnamedField(usize),
    Generic,
    Async,
    TooFewFields { required: usize, found: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unrecognized(word) => write!(f, "unrecognized directive `{}`", word),
            SkipReason::WrongDeclaration { expected, found } => {
                write!(f, "directive applies to {} items, found {}", expected, found)
            }
            SkipReason::PublicType => f.write_str("type is not private"),
            SkipReason::PublicField(name) => write!(f, "field `{}` is not private", name),
            SkipReason::UnnamedField(index) => write!(f, "field {} has no name", index),
            SkipReason::Generic => f.write_str("generic declarations are not supported"),
            SkipReason::Async => f.write_str("async functions are not supported"),
            SkipReason::TooFewFields { required, found } => {
                write!(f, "needs at least {} field(s), found {}", required, found)
            }
        }
    }
}

/// A declaration that will be synthesized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub kind: DirectiveKind,
    pub declaration: Declaration,
}

/// A declaration whose directive was not synthesized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub name: String,
    pub directive: String,
    pub position: SourcePosition,
    pub reason: SkipReason,
}

/// Classified jobs grouped by kind (kinds in declaration order of the enum,
/// declarations in scan order within a kind)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationPlan {
    pub jobs: Vec<Job>,
    pub skipped: Vec<Skip>,
}

impl GenerationPlan {
    pub fn jobs_of<'p>(&'p self, kind: &'p DirectiveKind) -> impl Iterator<Item = &'p Job> + 'p {
        self.jobs.iter().filter(move |job| &job.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Classify scanned declarations. Declarations without a directive are ignored.
pub fn classify(declarations: impl IntoIterator<Item = Declaration>) -> GenerationPlan {
    let mut plan = GenerationPlan::default();

    for declaration in declarations {
        let Some(kind) = DirectiveKind::parse(declaration.directive()) else {
            continue;
        };

        match check(&kind, &declaration) {
            Ok(()) => {
                log::debug!(
                    "{}: {} `{}` classified as {}",
                    declaration.position(),
                    declaration.kind(),
                    declaration.name(),
                    kind
                );
                plan.jobs.push(Job { kind, declaration });
            }
            Err(reason) => {
                if matches!(reason, SkipReason::Unrecognized(_)) {
                    log::warn!("{}: {}", declaration.position(), reason);
                } else {
                    log::debug!(
                        "{}: skipping {} for `{}`: {}",
                        declaration.position(),
                        kind,
                        declaration.name(),
                        reason
                    );
                }
                plan.skipped.push(Skip {
                    name: declaration.name().to_string(),
                    directive: declaration.directive().to_string(),
                    position: declaration.position().clone(),
                    reason,
                });
            }
        }
    }

    plan.jobs.sort_by_key(|job| job.kind.rank());
    plan
}

/// Structural precondition of `kind` on `declaration`
pub fn check(kind: &DirectiveKind, declaration: &Declaration) -> Result<(), SkipReason> {
    let expected = match kind.target() {
        Some(target) => target,
        None => return Err(SkipReason::Unrecognized(kind.name().to_string())),
    };
    if expected != declaration.kind() {
        return Err(SkipReason::WrongDeclaration { expected, found: declaration.kind() });
    }

    match declaration {
        Declaration::Func(func) => {
            if func.generic {
                return Err(SkipReason::Generic);
            }
            if func.is_async {
                return Err(SkipReason::Async);
            }
            Ok(())
        }
        Declaration::Struct(info) => {
            if info.generic {
                return Err(SkipReason::Generic);
            }
            match kind {
                DirectiveKind::Record => check_record(info),
                DirectiveKind::Pipeline => require_fields(info, 2),
                DirectiveKind::Match => require_fields(info, 1),
                _ => Ok(()),
            }
        }
    }
}

/// Type and every field must be private and named
fn check_record(info: &StructInfo) -> Result<(), SkipReason> {
    if !info.visibility.is_private() {
        return Err(SkipReason::PublicType);
    }
    for (index, field) in info.fields.iter().enumerate() {
        if field.name.is_empty() {
            return Err(SkipReason::UnnamedField(index));
        }
        if !field.visibility.is_private() {
            return Err(SkipReason::PublicField(field.name.clone()));
        }
    }
    Ok(())
}

fn require_fields(info: &StructInfo, required: usize) -> Result<(), SkipReason> {
    if info.fields.len() < required {
        return Err(SkipReason::TooFewFields { required, found: info.fields.len() });
    }
    Ok(())
}
