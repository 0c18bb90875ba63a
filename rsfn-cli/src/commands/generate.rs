use std::fmt;
use std::path::PathBuf;

use anyhow::Context;
use log::LevelFilter;
use rsfn_core::config::GeneratorConfig;
use rsfn_core::logging::init_logging;
use rsfn_core::{generate, Report};

/// Command-line overrides, applied over the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub src: PathBuf,
    pub out: Option<PathBuf>,
    pub marker: Option<String>,
    pub runtime_path: Option<String>,
    pub force: bool,
    pub config: Option<PathBuf>,
    pub verbose: u8,
}

/// Why a run failed; each maps to its own exit status
#[derive(Debug)]
pub enum Failure {
    Config(anyhow::Error),
    Scan(rsfn_core::Error),
    Generate(rsfn_core::Error),
}

impl Failure {
    pub fn exit_code(&self) -> i32 {
        match self {
            Failure::Config(_) => 1,
            Failure::Scan(_) => 2,
            Failure::Generate(_) => 3,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Config(e) => write!(f, "configuration error: {:#}", e),
            Failure::Scan(e) => write!(f, "parse error: {}", e),
            Failure::Generate(e) => write!(f, "generate error: {}", e),
        }
    }
}

impl From<rsfn_core::Error> for Failure {
    fn from(error: rsfn_core::Error) -> Self {
        if error.is_scan_error() {
            Failure::Scan(error)
        } else if matches!(error, rsfn_core::Error::Config(_)) {
            Failure::Config(anyhow::Error::new(error))
        } else {
            Failure::Generate(error)
        }
    }
}

/// Defaults < config file < environment < flags
pub fn resolve_config(options: &Options) -> anyhow::Result<GeneratorConfig> {
    let mut config = match &options.config {
        Some(path) => {
            let mut config = GeneratorConfig::load_from(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            config.source_dir = options.src.clone();
            config
        }
        None => GeneratorConfig::load(&options.src)?,
    };

    if let Some(out) = &options.out {
        config.output_dir = Some(out.clone());
    }
    if let Some(marker) = &options.marker {
        config.marker = marker.clone();
    }
    if let Some(path) = &options.runtime_path {
        config.runtime_path = path.clone();
    }
    if options.force {
        config.force = true;
    }
    match options.verbose {
        0 => {}
        1 => config.log_level = config.log_level.max(LevelFilter::Debug),
        _ => config.log_level = LevelFilter::Trace,
    }

    config.validate()?;
    Ok(config)
}

/// Resolve configuration, then generate.
pub fn run(options: &Options) -> Result<Report, Failure> {
    let config = resolve_config(options).map_err(Failure::Config)?;
    init_logging(config.log_level);
    log::debug!("resolved configuration: {:?}", config);

    let report = generate(&config)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const MODELS: &str = "/// rsfn: curried\nfn add(a: i32, b: i32) -> i32 { a + b }\n";

    fn options(src: &std::path::Path) -> Options {
        Options { src: src.to_path_buf(), ..Default::default() }
    }

    #[test]
    fn output_defaults_to_source() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("math.rs"), MODELS).unwrap();

        let report = run(&options(tmp.path())).unwrap();
        assert_eq!(report.output_dir, tmp.path());
        assert!(tmp.path().join("add_curried_gen.rs").exists());
    }

    #[test]
    fn flags_override_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("math.rs"), "/// gen: curried\nfn add(a: i32) -> i32 { a }\n").unwrap();
        fs::write(tmp.path().join("rsfn.toml"), "marker = \"other\"\nforce = true\n").unwrap();

        let opts = Options { marker: Some("gen".into()), out: Some(tmp.path().join("out")), ..options(tmp.path()) };
        let config = resolve_config(&opts).unwrap();
        assert_eq!(config.marker, "gen");
        assert!(config.force);

        let report = run(&opts).unwrap();
        assert_eq!(report.written.len(), 1);
        assert!(tmp.path().join("out").join("add_curried_gen.rs").exists());
    }

    #[test]
    fn explicit_config_file_is_used() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("custom.toml");
        fs::write(&config_path, "runtime_path = \"crate::runtime\"\n").unwrap();

        let opts = Options { config: Some(config_path), ..options(tmp.path()) };
        let config = resolve_config(&opts).unwrap();
        assert_eq!(config.runtime_path, "crate::runtime");
        assert_eq!(config.source_dir, tmp.path());
    }

    #[test]
    fn verbosity_raises_log_level() {
        let tmp = tempfile::tempdir().unwrap();
        let opts = Options { verbose: 1, ..options(tmp.path()) };
        assert_eq!(resolve_config(&opts).unwrap().log_level, LevelFilter::Debug);
        let opts = Options { verbose: 3, ..options(tmp.path()) };
        assert_eq!(resolve_config(&opts).unwrap().log_level, LevelFilter::Trace);

        fs::write(tmp.path().join("rsfn.toml"), "log_level = \"trace\"\n").unwrap();
        let opts = Options { verbose: 1, ..options(tmp.path()) };
        assert_eq!(resolve_config(&opts).unwrap().log_level, LevelFilter::Trace);
    }

    #[test]
    fn exit_codes_follow_failure_kind() {
        let tmp = tempfile::tempdir().unwrap();

        let bad_marker = Options { marker: Some("has space".into()), ..options(tmp.path()) };
        assert_eq!(run(&bad_marker).unwrap_err().exit_code(), 1);

        fs::write(tmp.path().join("broken.rs"), "fn (").unwrap();
        let failure = run(&options(tmp.path())).unwrap_err();
        assert_eq!(failure.exit_code(), 2);
        assert!(failure.to_string().starts_with("parse error:"));
    }

    #[test]
    fn unwritable_output_is_a_generation_failure() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("math.rs"), MODELS).unwrap();
        // a regular file where the output directory should be
        let blocker = tmp.path().join("blocked");
        fs::write(&blocker, "").unwrap();

        let opts = Options { out: Some(blocker.join("out")), ..options(tmp.path()) };
        let failure = run(&opts).unwrap_err();
        assert_eq!(failure.exit_code(), 3);
    }
}
