use cucumber::gherkin::Step;
use cucumber::{given, then, when, World as CucumberWorld};
use rsfn_core::{GeneratorConfig, Report};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

#[derive(Debug, Default, CucumberWorld)]
pub struct GenerationWorld {
    pub temp_dir: Option<tempfile::TempDir>,
    pub output_dir: Option<PathBuf>,
    pub marker: Option<String>,
    pub result: Option<Result<Report, rsfn_core::Error>>,
}

impl GenerationWorld {
    fn base_dir(&self) -> PathBuf {
        self.temp_dir.as_ref().expect("temp_dir not initialized").path().to_path_buf()
    }

    fn out_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| self.base_dir())
    }

    fn report(&self) -> &Report {
        match self.result.as_ref().expect("generator has not run") {
            Ok(report) => report,
            Err(e) => panic!("generator failed: {}", e),
        }
    }

    fn run(&mut self, force: bool) {
        let mut config = GeneratorConfig {
            source_dir: self.base_dir(),
            output_dir: self.output_dir.clone(),
            force,
            ..GeneratorConfig::default()
        };
        if let Some(marker) = &self.marker {
            config.marker = marker.clone();
        }
        self.result = Some(rsfn_core::generate(&config));
    }

    fn files_with_suffix(&self, dir: &Path, suffix: &str) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok().map(|e| e.path()))
                    .filter(|p| p.to_string_lossy().ends_with(suffix))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Move sources and generated files apart in time
    fn shift_mtimes(&self, sources_newer: bool) {
        let now = SystemTime::now();
        let earlier = now - Duration::from_secs(120);
        let (source_time, generated_time) = if sources_newer { (now, earlier) } else { (earlier, now) };

        for path in self.files_with_suffix(&self.out_dir(), "_gen.rs") {
            set_mtime(&path, generated_time);
        }
        for path in self.files_with_suffix(&self.base_dir(), ".rs") {
            if !path.to_string_lossy().ends_with("_gen.rs") {
                set_mtime(&path, source_time);
            }
        }
    }
}

fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .and_then(|f| f.set_modified(time))
        .unwrap_or_else(|e| panic!("cannot set mtime of {}: {}", path.display(), e));
}

#[given("a clean source directory")]
async fn clean_source_dir(world: &mut GenerationWorld) {
    world.temp_dir = Some(tempfile::tempdir().expect("failed to create temp dir"));
}

#[given(expr = "a source file {string} containing:")]
async fn source_file(world: &mut GenerationWorld, name: String, step: &Step) {
    let content = step.docstring.as_deref().expect("docstring with the file content");
    fs::write(world.base_dir().join(&name), content).expect("failed to write source file");
}

#[given(expr = "the output directory is {string}")]
async fn output_dir(world: &mut GenerationWorld, name: String) {
    world.output_dir = Some(world.base_dir().join(name));
}

#[given(expr = "the marker is {string}")]
async fn marker(world: &mut GenerationWorld, value: String) {
    world.marker = Some(value);
}

#[when("I run the generator")]
async fn run_generator(world: &mut GenerationWorld) {
    world.run(false);
}

#[when("I run the generator with force")]
async fn run_generator_forced(world: &mut GenerationWorld) {
    world.run(true);
}

#[when("the generated files are newer than the sources")]
async fn generated_newer(world: &mut GenerationWorld) {
    world.shift_mtimes(false);
}

#[when("the sources are newer than the generated files")]
async fn sources_newer(world: &mut GenerationWorld) {
    world.shift_mtimes(true);
}

#[then("the run should succeed")]
async fn run_succeeds(world: &mut GenerationWorld) {
    world.report();
}

#[then(expr = "the run should fail with a scan error naming {string}")]
async fn run_fails_with_scan_error(world: &mut GenerationWorld, file: String) {
    match world.result.as_ref().expect("generator has not run") {
        Ok(report) => panic!("expected a scan error, got {:?}", report),
        Err(e) => {
            assert!(e.is_scan_error(), "not a scan error: {}", e);
            assert!(e.to_string().contains(&file), "error does not name {}: {}", file, e);
        }
    }
}

#[then(regex = r"^(\d+) files? should be written$")]
async fn files_written(world: &mut GenerationWorld, count: usize) {
    let report = world.report();
    assert_eq!(report.written.len(), count, "written: {:?}", report.written);
}

#[then(regex = r"^(\d+) files? should be up to date$")]
async fn files_up_to_date(world: &mut GenerationWorld, count: usize) {
    let report = world.report();
    assert_eq!(report.up_to_date.len(), count, "up to date: {:?}", report.up_to_date);
}

#[then(regex = r"^(\d+) directives? should be skipped$")]
async fn directives_skipped(world: &mut GenerationWorld, count: usize) {
    let report = world.report();
    assert_eq!(report.skipped.len(), count, "skipped: {:?}", report.skipped);
}

#[then(expr = "the file {string} should exist")]
async fn file_exists(world: &mut GenerationWorld, path: String) {
    let full = world.base_dir().join(&path);
    assert!(full.is_file(), "File does not exist: {}", full.display());
}

#[then(expr = "the file {string} should not exist")]
async fn file_not_exists(world: &mut GenerationWorld, path: String) {
    let full = world.base_dir().join(&path);
    assert!(!full.exists(), "File should not exist: {}", full.display());
}

#[then(regex = r#"^the file "([^"]*)" should contain "(.*)"$"#)]
async fn file_contains(world: &mut GenerationWorld, path: String, needle: String) {
    let full = world.base_dir().join(&path);
    let content =
        fs::read_to_string(&full).unwrap_or_else(|_| panic!("Cannot read {}", full.display()));
    assert!(
        content.contains(&needle),
        "File {} does not contain \"{}\". Content:\n{}",
        full.display(),
        needle,
        content
    );
}
