//! Generator configuration
//!
//! Values are resolved in the following order (highest priority wins):
//!
//! 1. **Code / CLI flags** - set on the struct after loading
//! 2. **Environment Variables** - `RSFN_MARKER`, `RSFN_RUNTIME_PATH`, `RSFN_FORCE`, `RSFN_LOG_LEVEL`
//! 3. **Config File** - `rsfn.toml` in the source directory, or an explicit path
//! 4. **Defaults**
//!
//! # Example
//!
//! ```no_run
//! use rsfn_core::config::GeneratorConfig;
//!
//! let mut config = GeneratorConfig::load("src/models")?;
//! config.force = true;
//! config.validate()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{bail, Context, Result};
use log::LevelFilter;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::scanner::{ScanOptions, DEFAULT_MARKER};
use crate::synth::DEFAULT_RUNTIME_PATH;

/// File name looked up in the source directory
pub const CONFIG_FILE_NAME: &str = "rsfn.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Directory scanned for `*.rs` files
    pub source_dir: PathBuf,
    /// Where generated files go; the source directory when unset
    pub output_dir: Option<PathBuf>,
    /// Doc-comment marker introducing a directive
    pub marker: String,
    /// Path generated code uses to reach the runtime crate
    pub runtime_path: String,
    /// Regenerate every unit regardless of timestamps
    pub force: bool,
    pub log_level: LevelFilter,
}

/// Contents of one `rsfn.toml`; absent keys leave the current value alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub source_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub marker: Option<String>,
    pub runtime_path: Option<String>,
    pub force: Option<bool>,
    /// Case-insensitive level name, `off` through `trace`
    pub log_level: Option<LevelFilter>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            output_dir: None,
            marker: DEFAULT_MARKER.to_string(),
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            force: false,
            log_level: LevelFilter::Info,
        }
    }
}

impl GeneratorConfig {
    /// Defaults, then `rsfn.toml` from `source_dir` if present, then environment
    pub fn load(source_dir: impl AsRef<Path>) -> Result<Self> {
        let source_dir = source_dir.as_ref();
        let mut config = Self::load_from(source_dir.join(CONFIG_FILE_NAME))?;
        if config.source_dir == Path::new(".") {
            config.source_dir = source_dir.to_path_buf();
        }
        Ok(config)
    }

    /// Defaults, then the given file if it exists, then environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = Self::default();

        if path.exists() {
            let file_config = Self::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.merge(file_config);
        }

        config.apply_env_vars();

        Ok(config)
    }

    /// Parse one TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<ConfigFile> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.as_ref().display()))
    }

    /// Merge a config file into this one (keys present in the file win)
    pub fn merge(&mut self, file: ConfigFile) {
        if let Some(source_dir) = file.source_dir {
            self.source_dir = source_dir;
        }
        if file.output_dir.is_some() {
            self.output_dir = file.output_dir;
        }
        if let Some(marker) = file.marker {
            self.marker = marker;
        }
        if let Some(runtime_path) = file.runtime_path {
            self.runtime_path = runtime_path;
        }
        if let Some(force) = file.force {
            self.force = force;
        }
        if let Some(log_level) = file.log_level {
            self.log_level = log_level;
        }
    }

    pub fn apply_env_vars(&mut self) {
        self.apply_env_from(|key| env::var(key).ok());
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(marker) = lookup("RSFN_MARKER") {
            self.marker = marker;
        }
        if let Some(path) = lookup("RSFN_RUNTIME_PATH") {
            self.runtime_path = path;
        }
        if let Some(force) = lookup("RSFN_FORCE") {
            self.force = matches!(force.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(level) = lookup("RSFN_LOG_LEVEL") {
            match level.trim().parse() {
                Ok(level) => self.log_level = level,
                Err(_) => log::warn!("ignoring RSFN_LOG_LEVEL `{}`: not a log level", level),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.marker.is_empty() {
            bail!("marker must not be empty");
        }
        if !self.marker.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            bail!("marker `{}` may only contain ASCII letters, digits, `_` and `-`", self.marker);
        }
        syn::parse_str::<syn::Path>(&self.runtime_path)
            .map_err(|e| anyhow::anyhow!("runtime path `{}` is not a path: {}", self.runtime_path, e))?;
        Ok(())
    }

    /// Output directory, falling back to the source directory
    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.source_dir)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions { marker: self.marker.clone() }
    }
}
