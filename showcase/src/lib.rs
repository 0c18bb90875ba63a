//! Models annotated with `rsfn` directives.
//!
//! `build.rs` runs the generator over `src/models` and writes the companions
//! to `OUT_DIR`; each model file pulls its own companion in with `include!`.

pub mod models;
