//! Generation run: scan, classify, synthesize, emit

use std::collections::HashSet;
use std::path::PathBuf;

use crate::config::GeneratorConfig;
use crate::directive::{classify, GenerationPlan, Skip};
use crate::emit::{EmitOutcome, Emitter, Unit};
use crate::error::Result;
use crate::scanner::scan_dir;
use crate::synth::{synthesize, SynthContext};

/// Outcome of one run
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub output_dir: PathBuf,
    pub written: Vec<PathBuf>,
    pub up_to_date: Vec<PathBuf>,
    pub skipped: Vec<Skip>,
}

impl Report {
    pub fn units(&self) -> usize {
        self.written.len() + self.up_to_date.len()
    }
}

/// Run the whole pipeline for `config`.
///
/// Units are emitted in plan order. The first failure aborts the run; files
/// already written stay on disk.
pub fn generate(config: &GeneratorConfig) -> Result<Report> {
    let ctx = SynthContext::new(&config.runtime_path)?;
    let scanned = scan_dir(&config.source_dir, &config.scan_options())?;
    let plan = classify(scanned.candidates());

    let emitter = Emitter::new(config.output_dir(), config.force);
    let mut report = Report { output_dir: emitter.out_dir().to_path_buf(), ..Default::default() };

    for unit in units(&plan, &ctx) {
        match emitter.emit(&unit)? {
            EmitOutcome::Written(path) => report.written.push(path),
            EmitOutcome::UpToDate(path) => report.up_to_date.push(path),
        }
    }
    report.skipped = plan.skipped;

    log::info!(
        "{} unit(s): {} written, {} up to date, {} directive(s) skipped",
        report.units(),
        report.written.len(),
        report.up_to_date.len(),
        report.skipped.len()
    );
    Ok(report)
}

/// Synthesize every job of `plan`
pub fn units(plan: &GenerationPlan, ctx: &SynthContext) -> Vec<Unit> {
    let mut seen = HashSet::new();
    let mut units = Vec::with_capacity(plan.jobs.len());

    for job in &plan.jobs {
        let Some(tokens) = synthesize(job, ctx) else {
            log::debug!("no synthesizer for {} on `{}`", job.kind, job.declaration.name());
            continue;
        };
        let unit = Unit {
            declaration: job.declaration.name().to_string(),
            kind: job.kind.clone(),
            source: job.declaration.position().file.clone(),
            tokens,
        };
        if !seen.insert(unit.file_name()) {
            log::warn!(
                "{}: {} overwrites a unit generated earlier in this run",
                job.declaration.position(),
                unit.file_name()
            );
        }
        units.push(unit);
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::DirectiveKind;
    use crate::scanner::{scan_source, ScanOptions};
    use std::path::Path;

    const SOURCE: &str = r#"
        /// rsfn: record
        struct Person { name: String, age: u32 }

        /// rsfn: curried
        fn add(a: i32, b: i32) -> i32 { a + b }

        /// rsfn: lens
        struct Ignored;
    "#;

    #[test]
    fn units_follow_plan_order() {
        let scanned = scan_source(Path::new("models.rs"), SOURCE, &ScanOptions::default()).unwrap();
        let plan = classify(scanned.candidates());
        let units = units(&plan, &SynthContext::default());

        let names: Vec<String> = units.iter().map(Unit::file_name).collect();
        assert_eq!(names, ["person_record_gen.rs", "add_curried_gen.rs"]);
        assert_eq!(units[0].kind, DirectiveKind::Record);
        assert_eq!(units[1].source, Path::new("models.rs"));
        assert_eq!(plan.skipped.len(), 1);
    }
}
