// tests/config_loading.rs

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use farsite_exec::config::{ConfigFile, DEFAULT_EXECUTABLE, load_and_validate, load_from_path};
use farsite_exec::errors::PieceError;
use farsite_exec::types::OutputsType;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn minimal_config_gets_original_defaults() {
    let file = config_file(
        r#"
[run]
lcp_path = "/data/area.lcp"
inputs_path = "/data/run.input"
ignition_shp_path = "/data/ignite.shp"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.settings.workspace.root(), PathBuf::from("/work"));
    assert_eq!(cfg.settings.workspace.in_dir(), PathBuf::from("/work/in"));
    assert_eq!(cfg.settings.workspace.out_dir(), PathBuf::from("/work/out"));
    assert_eq!(cfg.settings.executable, PathBuf::from(DEFAULT_EXECUTABLE));
    assert_eq!(cfg.settings.timeout, None);
    assert_eq!(cfg.inputs.barrier_shp_path, "0");
    assert_eq!(cfg.inputs.output_basename, "farsite_run");
    assert_eq!(cfg.inputs.outputs_type, OutputsType::AsciiGrid);
}

#[test]
fn full_config_is_honoured() {
    let file = config_file(
        r#"
[workspace]
root = "/scratch/job7"
input_dir = "staged"
output_dir = "results"

[runner]
executable = "/opt/farsite/run.sh"
timeout = "90m"

[run]
lcp_path = "/data/area.lcp"
inputs_path = "/data/run.input"
ignition_shp_path = "/data/ignite.shp"
barrier_shp_path = "/data/roads.shp"
output_basename = "valley"
outputs_type = 2
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.settings.workspace.in_dir(), PathBuf::from("/scratch/job7/staged"));
    assert_eq!(cfg.settings.workspace.out_dir(), PathBuf::from("/scratch/job7/results"));
    assert_eq!(cfg.settings.timeout, Some(Duration::from_secs(90 * 60)));
    assert_eq!(cfg.inputs.barrier_shp_path, "/data/roads.shp");
    assert_eq!(cfg.inputs.output_basename, "valley");
    assert_eq!(cfg.inputs.outputs_type, OutputsType::FlamMapBinary);
}

#[test]
fn relative_workspace_root_is_made_absolute() {
    let file = config_file(
        r#"
[workspace]
root = "jobs/run7"

[run]
lcp_path = "/data/area.lcp"
inputs_path = "/data/run.input"
ignition_shp_path = "/data/ignite.shp"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    let cwd = std::env::current_dir().unwrap();

    assert!(cfg.settings.workspace.root().is_absolute());
    assert_eq!(cfg.settings.workspace.root(), cwd.join("jobs/run7"));
    assert_eq!(cfg.settings.workspace.out_dir(), cwd.join("jobs/run7/out"));
}

#[test]
fn missing_run_input_returns_config_error() {
    let file = config_file(
        r#"
[run]
lcp_path = "/data/area.lcp"
inputs_path = "/data/run.input"
"#,
    );

    match load_and_validate(file.path()) {
        Err(PieceError::ConfigError(msg)) => {
            assert!(msg.contains("ignition_shp_path"));
            assert!(msg.contains("--ignition"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn out_of_range_outputs_type_is_a_toml_error() {
    let file = config_file(
        r#"
[run]
outputs_type = 5
"#,
    );

    match load_from_path(file.path()) {
        Err(PieceError::TomlError(e)) => assert!(e.to_string().contains("outputs_type")),
        Err(e) => panic!("Expected TomlError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn bad_timeout_and_basename_are_rejected() {
    let mut raw = load_from_path(
        config_file(
            r#"
[runner]
timeout = "soon"

[run]
lcp_path = "/data/area.lcp"
inputs_path = "/data/run.input"
ignition_shp_path = "/data/ignite.shp"
"#,
        )
        .path(),
    )
    .unwrap();

    assert!(matches!(
        ConfigFile::try_from(raw.clone()),
        Err(PieceError::ConfigError(msg)) if msg.contains("timeout")
    ));

    raw.runner.timeout = None;
    raw.run.output_basename = Some("../escape".to_string());
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(PieceError::ConfigError(msg)) if msg.contains("output_basename")
    ));
}

#[test]
fn missing_config_file_is_an_io_error() {
    match load_and_validate("/definitely/not/here/farsite.toml") {
        Err(PieceError::Io { path, .. }) => {
            assert_eq!(path, PathBuf::from("/definitely/not/here/farsite.toml"))
        }
        other => panic!("Expected Io error, got: {:?}", other.map(|_| ())),
    }
}
