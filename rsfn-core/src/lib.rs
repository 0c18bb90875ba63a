//! rsfn - Core
//!
//! A directive-driven companion code generator for Rust sources.
//!
//! # Overview
//!
//! Annotate a struct or free function with a doc-comment directive and rsfn
//! writes a companion file next to it (or into `OUT_DIR` from a build script)
//! holding the functional boilerplate for that declaration:
//!
//! ```rust,ignore
//! /// rsfn: record
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! /// rsfn: curried
//! fn add(a: i32, b: i32) -> i32 {
//!     a + b
//! }
//!
//! include!(concat!(env!("OUT_DIR"), "/person_record_gen.rs"));
//! include!(concat!(env!("OUT_DIR"), "/add_curried_gen.rs"));
//! ```
//!
//! From a build script:
//!
//! ```rust,ignore
//! let mut config = rsfn_core::GeneratorConfig::load("src/models")?;
//! config.output_dir = Some(std::env::var("OUT_DIR")?.into());
//! rsfn_core::generate(&config)?;
//! ```
//!
//! # Architecture
//!
//! - [`scanner`] - Reads sources and builds the [`model`] records
//! - [`directive`] - Classifies declarations by directive kind
//! - [`synth`] - One synthesizer per kind (record, optional, curried, pipeline, match)
//! - [`emit`] - Staleness check, formatting and writes
//! - [`generator`] - The end-to-end run
//!
//! Generated code depends on the `rsfn-runtime` crate for pipeline and
//! match support.

pub mod config; // rsfn.toml + environment layering
pub mod directive;
pub mod emit;
pub mod error;
pub mod generator;
pub mod logging; // env_logger bootstrap for binaries
pub mod model;
pub mod scanner;
pub mod synth;

pub use config::GeneratorConfig;
pub use directive::{classify, DirectiveKind, GenerationPlan, SkipReason};
pub use emit::{EmitOutcome, Emitter, Unit};
pub use error::{Error, Result};
pub use generator::{generate, Report};
pub use model::{Declaration, DeclarationKind, FieldInfo, FuncInfo, ParamInfo, StructInfo};
pub use scanner::{scan_dir, scan_source, ScanOptions};
