//! Error taxonomy for a generation run
//!
//! Scan and emission failures are fatal and propagate to the caller.
//! Classification skips and type rendering fallbacks never surface here.

use std::path::PathBuf;

/// Result alias used across the engine
pub type Result<T> = std::result::Result<T, Error>;

/// Engine error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to read source {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}:{line}:{column}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("failed to format generated unit {unit}: {message}")]
    Format { unit: String, message: String },
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Read { path: path.into(), source }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, err: &syn::Error) -> Self {
        let start = err.span().start();
        Error::Parse {
            path: path.into(),
            line: start.line,
            column: start.column + 1,
            message: err.to_string(),
        }
    }

    /// True for failures raised while reading or parsing sources
    pub fn is_scan_error(&self) -> bool {
        matches!(self, Error::Read { .. } | Error::Parse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_the_file() {
        let err = syn::parse_file("struct {").unwrap_err();
        let err = Error::parse("models/broken.rs", &err);
        assert!(err.is_scan_error());
        assert!(err.to_string().contains("models/broken.rs"));
    }

    #[test]
    fn unreadable_source_is_a_scan_error() {
        let err = Error::read("lib.rs", std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.is_scan_error());
    }

    #[test]
    fn io_error_is_not_a_scan_error() {
        let err = Error::io("out", std::io::Error::new(std::io::ErrorKind::Other, "denied"));
        assert!(!err.is_scan_error());
        assert!(err.to_string().contains("denied"));
    }
}
