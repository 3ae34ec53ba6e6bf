// src/config/validate.rs

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::config::model::{
    ConfigFile, DEFAULT_OUTPUT_BASENAME, RawConfigFile, RunSection, RunnerSection,
    WorkspaceSection,
};
use crate::errors::{PieceError, Result};
use crate::fileset::NO_BARRIER;
use crate::pipeline::{RunInputs, Settings};
use crate::workspace::Workspace;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PieceError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let workspace = validate_workspace(&raw.workspace)?;
        let (executable, timeout) = validate_runner(&raw.runner)?;
        let inputs = validate_run(raw.run)?;

        let settings = Settings {
            workspace,
            executable,
            timeout,
        };
        Ok(ConfigFile::new_unchecked(settings, inputs))
    }
}

fn validate_workspace(section: &WorkspaceSection) -> Result<Workspace> {
    if section.root.as_os_str().is_empty() {
        return Err(PieceError::ConfigError(
            "[workspace].root must not be empty".to_string(),
        ));
    }

    ensure_plain_relative("input_dir", &section.input_dir)?;
    ensure_plain_relative("output_dir", &section.output_dir)?;

    if Path::new(&section.input_dir) == Path::new(&section.output_dir) {
        return Err(PieceError::ConfigError(format!(
            "[workspace].input_dir and output_dir must differ (both '{}')",
            section.input_dir
        )));
    }

    let root = std::path::absolute(&section.root).map_err(|e| {
        PieceError::ConfigError(format!(
            "[workspace].root {:?} cannot be made absolute: {e}",
            section.root
        ))
    })?;

    Ok(Workspace::with_dirs(
        root,
        &section.input_dir,
        &section.output_dir,
    ))
}

/// The subdirectory must stay below the workspace root.
fn ensure_plain_relative(key: &str, dir: &str) -> Result<()> {
    let path = Path::new(dir);
    let plain = !dir.trim().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !plain {
        return Err(PieceError::ConfigError(format!(
            "[workspace].{key} must be a relative path below the root (got '{dir}')"
        )));
    }
    Ok(())
}

fn validate_runner(section: &RunnerSection) -> Result<(PathBuf, Option<Duration>)> {
    if section.executable.as_os_str().is_empty() {
        return Err(PieceError::ConfigError(
            "[runner].executable must not be empty".to_string(),
        ));
    }

    let timeout = match section.timeout.as_deref() {
        None => None,
        Some(s) => {
            let d = parse_duration(s).map_err(|e| {
                PieceError::ConfigError(format!("[runner].timeout is invalid: {e}"))
            })?;
            if d.is_zero() {
                return Err(PieceError::ConfigError(
                    "[runner].timeout must be greater than zero".to_string(),
                ));
            }
            Some(d)
        }
    };

    Ok((section.executable.clone(), timeout))
}

fn validate_run(section: RunSection) -> Result<RunInputs> {
    let lcp_path = required(section.lcp_path, "lcp_path", "--lcp")?;
    let inputs_path = required(section.inputs_path, "inputs_path", "--inputs")?;
    let ignition_shp_path = required(section.ignition_shp_path, "ignition_shp_path", "--ignition")?;

    let output_basename = section
        .output_basename
        .unwrap_or_else(|| DEFAULT_OUTPUT_BASENAME.to_string());
    validate_basename(&output_basename)?;

    Ok(RunInputs {
        lcp_path,
        inputs_path,
        ignition_shp_path,
        barrier_shp_path: section
            .barrier_shp_path
            .unwrap_or_else(|| NO_BARRIER.to_string()),
        output_basename,
        outputs_type: section.outputs_type.unwrap_or_default(),
    })
}

fn required(value: Option<PathBuf>, key: &str, flag: &str) -> Result<PathBuf> {
    match value {
        Some(p) if !p.as_os_str().is_empty() => Ok(p),
        _ => Err(PieceError::ConfigError(format!(
            "missing required [run].{key} (or {flag})"
        ))),
    }
}

/// The basename becomes part of several file names, so it must be a single
/// path component.
fn validate_basename(name: &str) -> Result<()> {
    let bad = name.trim().is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name == "."
        || name == "..";
    if bad {
        return Err(PieceError::ConfigError(format!(
            "[run].output_basename must be a plain file name prefix (got '{name}')"
        )));
    }
    Ok(())
}

/// Parse a duration string like `"500ms"`, `"30s"`, `"5m"` or `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_duration_units() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration(" 2H ").unwrap(), Duration::from_secs(7200));
    }

    #[test]
    fn rejects_bad_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("3d").is_err());
        assert!(parse_duration("99999999999999999h").is_err());
        assert!(parse_duration("999999999999999999m").is_err());
    }

    #[test]
    fn oversized_timeout_is_a_config_error() {
        let mut raw = RawConfigFile::default();
        raw.runner.timeout = Some("99999999999999999h".to_string());
        raw.run.lcp_path = Some(PathBuf::from("/data/area.lcp"));
        raw.run.inputs_path = Some(PathBuf::from("/data/run.input"));
        raw.run.ignition_shp_path = Some(PathBuf::from("/data/ignite.shp"));

        match ConfigFile::try_from(raw) {
            Err(PieceError::ConfigError(msg)) => assert!(msg.contains("too large")),
            other => panic!("expected ConfigError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn basename_must_be_a_single_component() {
        assert!(validate_basename("run1").is_ok());
        assert!(validate_basename("").is_err());
        assert!(validate_basename("a/b").is_err());
        assert!(validate_basename("..").is_err());
    }

    #[test]
    fn workspace_dirs_must_stay_below_root() {
        assert!(ensure_plain_relative("input_dir", "in").is_ok());
        assert!(ensure_plain_relative("input_dir", "staging/in").is_ok());
        assert!(ensure_plain_relative("input_dir", "/abs").is_err());
        assert!(ensure_plain_relative("input_dir", "../up").is_err());
        assert!(ensure_plain_relative("input_dir", " ").is_err());
    }
}
