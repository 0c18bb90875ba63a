//! Logger bootstrap
//!
//! The engine logs through the `log` facade only. Binaries call
//! [`init_logging`] once at startup; `RUST_LOG` wins over the level passed in.

use log::LevelFilter;

/// Install `env_logger` at `level`. Safe to call more than once.
pub fn init_logging(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp_millis().format_module_path(false);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    // try_init: a logger may already be installed (tests, embedding tools)
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(LevelFilter::Info);
        init_logging(LevelFilter::Debug);
        log::info!("logger installed");
    }
}
