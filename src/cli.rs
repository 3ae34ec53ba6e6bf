// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every `[run]`, `[runner]` and `[workspace]` value of the config file can be
//! given (or overridden) here, so the binary also works without a file.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::RawConfigFile;
use crate::types::OutputsType;

/// Command-line arguments for `farsite-exec`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "farsite-exec",
    version,
    about = "Stage inputs, run the FARSITE wrapper and zip its outputs.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a config file (TOML). Optional.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Landscape file (.lcp).
    #[arg(long, value_name = "PATH")]
    pub lcp: Option<PathBuf>,

    /// FARSITE inputs file (.input).
    #[arg(long, value_name = "PATH")]
    pub inputs: Option<PathBuf>,

    /// Ignition shapefile (.shp); its sibling files are staged with it.
    #[arg(long, value_name = "PATH")]
    pub ignition: Option<PathBuf>,

    /// Barrier shapefile (.shp), or 0 for no barrier.
    #[arg(long, value_name = "PATH")]
    pub barrier: Option<String>,

    /// Prefix for outputs, logs and the archive.
    #[arg(long, value_name = "NAME")]
    pub output_basename: Option<String>,

    /// 0 = both, 1 = ASCII grid, 2 = FlamMap binary grid.
    #[arg(long, value_name = "CODE")]
    pub outputs_type: Option<OutputsType>,

    /// Workspace root holding the input and output directories.
    #[arg(long, value_name = "DIR")]
    pub work_root: Option<PathBuf>,

    /// Simulator wrapper to invoke.
    #[arg(long, value_name = "PATH")]
    pub executable: Option<PathBuf>,

    /// Kill the simulator after this long (e.g. 90s, 2h).
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FARSITE_EXEC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate, print the planned command, but don't stage or run anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Overlay the flags that were given onto a raw config.
    pub fn apply_overrides(&self, raw: &mut RawConfigFile) {
        if let Some(ref root) = self.work_root {
            raw.workspace.root = root.clone();
        }
        if let Some(ref exe) = self.executable {
            raw.runner.executable = exe.clone();
        }
        if let Some(ref timeout) = self.timeout {
            raw.runner.timeout = Some(timeout.clone());
        }

        let run = &mut raw.run;
        if let Some(ref p) = self.lcp {
            run.lcp_path = Some(p.clone());
        }
        if let Some(ref p) = self.inputs {
            run.inputs_path = Some(p.clone());
        }
        if let Some(ref p) = self.ignition {
            run.ignition_shp_path = Some(p.clone());
        }
        if let Some(ref b) = self.barrier {
            run.barrier_shp_path = Some(b.clone());
        }
        if let Some(ref name) = self.output_basename {
            run.output_basename = Some(name.clone());
        }
        if let Some(kind) = self.outputs_type {
            run.outputs_type = Some(kind);
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let args = CliArgs::parse_from([
            "farsite-exec",
            "--lcp",
            "/data/area.lcp",
            "--outputs-type",
            "2",
            "--work-root",
            "/tmp/work",
        ]);
        let mut raw: RawConfigFile = toml::from_str(
            r#"
[run]
lcp_path = "/old/area.lcp"
inputs_path = "/data/run.input"
outputs_type = 0
"#,
        )
        .unwrap();

        args.apply_overrides(&mut raw);

        assert_eq!(raw.run.lcp_path, Some(PathBuf::from("/data/area.lcp")));
        assert_eq!(raw.run.inputs_path, Some(PathBuf::from("/data/run.input")));
        assert_eq!(raw.run.outputs_type, Some(OutputsType::FlamMapBinary));
        assert_eq!(raw.workspace.root, PathBuf::from("/tmp/work"));
    }

    #[test]
    fn rejects_unknown_outputs_type() {
        let res = CliArgs::try_parse_from(["farsite-exec", "--outputs-type", "9"]);
        assert!(res.is_err());
    }
}
