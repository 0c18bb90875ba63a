//! rsfn CLI: companion code generator.
//!
//! Install with `cargo install rsfn-cli`, then run:
//!
//! ```bash
//! rsfn --src src/models --out src/models/generated
//! ```
//!
//! See `rsfn --help` for all available options.

mod commands;

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "rsfn",
    about = "Generate companion code for `/// rsfn: <kind>` directives",
    version,
    after_help = "Kinds: record, optional, curried, pipeline, match.\n\
                  Exit status: 1 configuration error, 2 scan error, 3 generation error."
)]
struct Cli {
    /// Directory scanned for `*.rs` files (not recursive)
    #[arg(long, value_name = "DIR", default_value = ".")]
    src: PathBuf,

    /// Output directory for generated files (defaults to --src)
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Doc-comment marker introducing a directive
    #[arg(long, value_name = "MARKER")]
    marker: Option<String>,

    /// Path generated code uses to reach the runtime crate
    #[arg(long, value_name = "PATH")]
    runtime_path: Option<String>,

    /// Regenerate every file regardless of timestamps
    #[arg(long)]
    force: bool,

    /// Config file (defaults to rsfn.toml in --src)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl From<Cli> for commands::generate::Options {
    fn from(cli: Cli) -> Self {
        Self {
            src: cli.src,
            out: cli.out,
            marker: cli.marker,
            runtime_path: cli.runtime_path,
            force: cli.force,
            config: cli.config,
            verbose: cli.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let options = commands::generate::Options::from(cli);

    match commands::generate::run(&options) {
        Ok(report) => {
            println!("generated to {}", report.output_dir.display());
            println!(
                "  {} written, {} up to date, {} skipped",
                report.written.len(),
                report.up_to_date.len(),
                report.skipped.len()
            );
        }
        Err(failure) => {
            eprintln!("{}", failure);
            std::process::exit(failure.exit_code());
        }
    }
}
