// src/config/mod.rs

//! Configuration loading and validation for farsite-exec.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into pipeline settings and run inputs (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{
    ConfigFile, DEFAULT_EXECUTABLE, DEFAULT_OUTPUT_BASENAME, RawConfigFile, RunSection,
    RunnerSection, WorkspaceSection,
};
pub use validate::parse_duration;
