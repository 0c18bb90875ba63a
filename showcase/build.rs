use std::env;
use std::path::PathBuf;

use rsfn_core::GeneratorConfig;

fn main() {
    let manifest_dir = PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR not set"));
    let models = manifest_dir.join("src").join("models");

    println!("cargo:rerun-if-changed={}", models.display());

    let config = GeneratorConfig {
        source_dir: models,
        output_dir: Some(out_dir),
        force: true,
        ..GeneratorConfig::default()
    };

    match rsfn_core::generate(&config) {
        Ok(report) => {
            for skip in &report.skipped {
                println!(
                    "cargo:warning={}: skipped `{}` ({}): {}",
                    skip.position, skip.name, skip.directive, skip.reason
                );
            }
        }
        Err(e) => panic!("rsfn generation failed: {}", e),
    }
}
