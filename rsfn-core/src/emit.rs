//! Emission controller
//!
//! Decides whether a generated unit is stale, formats it and writes it to the
//! output directory. A unit is skipped only when its file exists and is at
//! least as new as the source file it was generated from; any metadata
//! failure counts as stale.

use std::fs;
use std::path::{Path, PathBuf};

use proc_macro2::TokenStream;

use crate::directive::DirectiveKind;
use crate::error::{Error, Result};
use crate::synth::to_snake_case;

/// Suffix shared by every generated file
pub const GENERATED_SUFFIX: &str = "_gen.rs";

/// One generated output file, before formatting
#[derive(Debug, Clone)]
pub struct Unit {
    /// Declaration the unit was generated for
    pub declaration: String,
    pub kind: DirectiveKind,
    /// Source file holding the declaration
    pub source: PathBuf,
    pub tokens: TokenStream,
}

impl Unit {
    /// `<snake_case(declaration)>_<kind>_gen.rs`
    pub fn file_name(&self) -> String {
        file_name(&self.declaration, &self.kind)
    }
}

pub fn file_name(declaration: &str, kind: &DirectiveKind) -> String {
    format!("{}_{}{}", to_snake_case(declaration), kind.name(), GENERATED_SUFFIX)
}

/// What happened to one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    Written(PathBuf),
    UpToDate(PathBuf),
}

impl EmitOutcome {
    pub fn path(&self) -> &Path {
        match self {
            EmitOutcome::Written(path) | EmitOutcome::UpToDate(path) => path,
        }
    }
}

/// True unless `target` exists and is not older than `source`
pub fn is_stale(source: &Path, target: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|m| m.modified());
    match (modified(source), modified(target)) {
        (Ok(source_time), Ok(target_time)) => target_time < source_time,
        _ => true,
    }
}

/// Header comment plus formatted items
pub fn format_unit(unit: &Unit) -> Result<String> {
    let file: syn::File = syn::parse2(unit.tokens.clone()).map_err(|e| Error::Format {
        unit: unit.file_name(),
        message: e.to_string(),
    })?;

    let source_name = unit
        .source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(format!(
        "// Code generated by rsfn from {} ({} for {}). DO NOT EDIT.\n\n{}",
        source_name,
        unit.kind,
        unit.declaration,
        prettyplease::unparse(&file)
    ))
}

/// Writes units into one output directory
#[derive(Debug, Clone)]
pub struct Emitter {
    out_dir: PathBuf,
    force: bool,
}

impl Emitter {
    pub fn new(out_dir: impl Into<PathBuf>, force: bool) -> Self {
        Self { out_dir: out_dir.into(), force }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn target(&self, unit: &Unit) -> PathBuf {
        self.out_dir.join(unit.file_name())
    }

    pub fn should_generate(&self, unit: &Unit) -> bool {
        self.force || is_stale(&unit.source, &self.target(unit))
    }

    /// Write `unit` unless its file is up to date
    pub fn emit(&self, unit: &Unit) -> Result<EmitOutcome> {
        let target = self.target(unit);
        if !self.should_generate(unit) {
            log::info!("{} is up to date", target.display());
            return Ok(EmitOutcome::UpToDate(target));
        }

        let contents = format_unit(unit)?;
        fs::create_dir_all(&self.out_dir).map_err(|e| Error::io(&self.out_dir, e))?;
        fs::write(&target, contents).map_err(|e| Error::io(&target, e))?;

        log::info!("generated {}", target.display());
        Ok(EmitOutcome::Written(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;
    use std::fs::File;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn unit(source: &Path) -> Unit {
        Unit {
            declaration: "OrderFlow".into(),
            kind: DirectiveKind::Pipeline,
            source: source.to_path_buf(),
            tokens: quote! { pub fn order_flow_marker() -> u8 { 1 } },
        }
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        File::options().write(true).open(path).unwrap().set_modified(time).unwrap();
    }

    #[test]
    fn file_names_use_snake_case_and_kind() {
        assert_eq!(file_name("OrderFlow", &DirectiveKind::Pipeline), "order_flow_pipeline_gen.rs");
        assert_eq!(file_name("add", &DirectiveKind::Curried), "add_curried_gen.rs");
    }

    #[test]
    fn formatted_unit_starts_with_header() {
        let text = format_unit(&unit(Path::new("src/models/flow.rs"))).unwrap();
        assert!(text.starts_with("// Code generated by rsfn from flow.rs (pipeline for OrderFlow). DO NOT EDIT.\n"));
        assert!(text.contains("pub fn order_flow_marker() -> u8 {\n    1\n}"));
    }

    #[test]
    fn emit_writes_then_skips_fresh_output() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("flow.rs");
        fs::write(&source, "struct OrderFlow(i32, i32);").unwrap();

        let emitter = Emitter::new(dir.path().join("out"), false);
        let first = emitter.emit(&unit(&source)).unwrap();
        assert!(matches!(first, EmitOutcome::Written(_)));
        assert!(first.path().exists());

        let now = SystemTime::now();
        set_mtime(&source, now - Duration::from_secs(60));
        set_mtime(first.path(), now);
        let second = emitter.emit(&unit(&source)).unwrap();
        assert!(matches!(second, EmitOutcome::UpToDate(_)));
    }

    #[test]
    fn newer_source_regenerates() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("flow.rs");
        fs::write(&source, "").unwrap();
        let emitter = Emitter::new(dir.path(), false);
        let target = emitter.target(&unit(&source));
        fs::write(&target, "stale").unwrap();

        let now = SystemTime::now();
        set_mtime(&target, now - Duration::from_secs(60));
        set_mtime(&source, now);
        assert!(emitter.should_generate(&unit(&source)));
        emitter.emit(&unit(&source)).unwrap();
        assert!(fs::read_to_string(&target).unwrap().contains("order_flow_marker"));
    }

    #[test]
    fn equal_mtimes_count_as_fresh() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("flow.rs");
        let target = dir.path().join("flow_gen.rs");
        fs::write(&source, "").unwrap();
        fs::write(&target, "").unwrap();
        let now = SystemTime::now();
        set_mtime(&source, now);
        set_mtime(&target, now);
        assert!(!is_stale(&source, &target));
    }

    #[test]
    fn missing_files_are_stale() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("flow.rs");
        fs::write(&source, "").unwrap();
        assert!(is_stale(&source, &dir.path().join("missing_gen.rs")));
        assert!(is_stale(&dir.path().join("gone.rs"), &source));
    }

    #[test]
    fn force_ignores_timestamps() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("flow.rs");
        fs::write(&source, "").unwrap();
        let emitter = Emitter::new(dir.path(), true);
        emitter.emit(&unit(&source)).unwrap();
        let now = SystemTime::now();
        set_mtime(&source, now - Duration::from_secs(60));
        assert!(matches!(emitter.emit(&unit(&source)).unwrap(), EmitOutcome::Written(_)));
    }

    #[test]
    fn unformattable_tokens_are_a_format_error() {
        let mut bad = unit(Path::new("flow.rs"));
        bad.tokens = quote! { let x = 1; };
        assert!(matches!(format_unit(&bad), Err(Error::Format { .. })));
    }
}
