// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::pipeline::{RunInputs, Settings};
use crate::types::OutputsType;
use crate::workspace::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_ROOT};

/// Default location of the simulator wrapper inside the runtime image.
pub const DEFAULT_EXECUTABLE: &str = "/usr/local/bin/run_farsite.sh";

/// Default prefix for everything a run produces.
pub const DEFAULT_OUTPUT_BASENAME: &str = "farsite_run";

/// Configuration exactly as read from TOML (plus CLI overrides), before
/// validation.
///
/// ```toml
/// [workspace]
/// root = "/work"
///
/// [runner]
/// executable = "/usr/local/bin/run_farsite.sh"
/// timeout = "2h"
///
/// [run]
/// lcp_path = "/data/area.lcp"
/// inputs_path = "/data/run.input"
/// ignition_shp_path = "/data/ignite.shp"
/// barrier_shp_path = "0"
/// output_basename = "run1"
/// outputs_type = 1
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub workspace: WorkspaceSection,

    #[serde(default)]
    pub runner: RunnerSection,

    #[serde(default)]
    pub run: RunSection,
}

/// `[workspace]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceSection {
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Staged inputs, relative to `root`.
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    /// Simulator outputs, relative to `root`.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_root() -> PathBuf {
    PathBuf::from(DEFAULT_ROOT)
}

fn default_input_dir() -> String {
    DEFAULT_INPUT_DIR.to_string()
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

impl Default for WorkspaceSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
        }
    }
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    #[serde(default = "default_executable")]
    pub executable: PathBuf,

    /// Duration string such as `"90s"` or `"2h"`. No limit when absent.
    #[serde(default)]
    pub timeout: Option<String>,
}

fn default_executable() -> PathBuf {
    PathBuf::from(DEFAULT_EXECUTABLE)
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            timeout: None,
        }
    }
}

/// `[run]` section: the inputs of one simulation.
///
/// Fields are optional here because they may come from the command line
/// instead; validation enforces the required ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunSection {
    /// Landscape file (`.lcp`).
    #[serde(default)]
    pub lcp_path: Option<PathBuf>,

    /// Simulation parameters file (`.input`).
    #[serde(default)]
    pub inputs_path: Option<PathBuf>,

    /// Ignition shapefile (`.shp`).
    #[serde(default)]
    pub ignition_shp_path: Option<PathBuf>,

    /// Barrier shapefile (`.shp`) or `"0"` for no barrier.
    #[serde(default)]
    pub barrier_shp_path: Option<String>,

    #[serde(default)]
    pub output_basename: Option<String>,

    #[serde(default)]
    pub outputs_type: Option<OutputsType>,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub settings: Settings,
    pub inputs: RunInputs,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(settings: Settings, inputs: RunInputs) -> Self {
        Self { settings, inputs }
    }
}
