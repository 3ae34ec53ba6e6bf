#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use farsite_exec::fileset::NO_BARRIER;
use farsite_exec::pipeline::{RunInputs, Settings};
use farsite_exec::types::OutputsType;
use farsite_exec::workspace::Workspace;
use tempfile::TempDir;

/// Sidecars created next to every fixture shapefile.
pub const SHAPEFILE_SIDECARS: [&str; 3] = ["dbf", "shx", "prj"];

/// A temporary directory holding source inputs (`src/`) and a workspace
/// root (`work/`).
pub struct Fixture {
    tmp: TempDir,
}

impl Fixture {
    /// Create `area.lcp`, `run.input` and the `ignite.shp` set under `src/`.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("creating temp dir");
        let fixture = Self { tmp };
        fs::create_dir_all(fixture.src_dir()).expect("creating src dir");
        fixture.write_source("area.lcp", "LCP landscape");
        fixture.write_source("run.input", "FARSITE INPUTS FILE VERSION 1.0");
        fixture.write_shapefile("ignite");
        fixture
    }

    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    pub fn src_dir(&self) -> PathBuf {
        self.tmp.path().join("src")
    }

    pub fn work_root(&self) -> PathBuf {
        self.tmp.path().join("work")
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.work_root())
    }

    pub fn write_source(&self, name: &str, content: &str) -> PathBuf {
        let path = self.src_dir().join(name);
        fs::write(&path, content).expect("writing source file");
        path
    }

    /// Write `<stem>.shp` plus the standard sidecars; returns the `.shp` path.
    pub fn write_shapefile(&self, stem: &str) -> PathBuf {
        for ext in SHAPEFILE_SIDECARS {
            self.write_source(&format!("{stem}.{ext}"), ext);
        }
        self.write_source(&format!("{stem}.shp"), "shp")
    }

    /// Write an executable shell script under the fixture root.
    pub fn stub_executable(&self, name: &str, body: &str) -> PathBuf {
        let path = self.tmp.path().join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("writing stub executable");
        make_executable(&path);
        path
    }

    pub fn settings(&self, executable: impl Into<PathBuf>) -> SettingsBuilder {
        SettingsBuilder::new(self.workspace(), executable)
    }

    pub fn inputs(&self) -> RunInputsBuilder {
        RunInputsBuilder::new(
            self.src_dir().join("area.lcp"),
            self.src_dir().join("run.input"),
            self.src_dir().join("ignite.shp"),
        )
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path).expect("stat stub").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod stub");
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) {}

/// Builder for `Settings`.
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new(workspace: Workspace, executable: impl Into<PathBuf>) -> Self {
        Self {
            settings: Settings {
                workspace,
                executable: executable.into(),
                timeout: None,
            },
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

/// Builder for `RunInputs`.
pub struct RunInputsBuilder {
    inputs: RunInputs,
}

impl RunInputsBuilder {
    pub fn new(lcp: PathBuf, params: PathBuf, ignition: PathBuf) -> Self {
        Self {
            inputs: RunInputs {
                lcp_path: lcp,
                inputs_path: params,
                ignition_shp_path: ignition,
                barrier_shp_path: NO_BARRIER.to_string(),
                output_basename: "run1".to_string(),
                outputs_type: OutputsType::AsciiGrid,
            },
        }
    }

    pub fn barrier(mut self, barrier: impl Into<String>) -> Self {
        self.inputs.barrier_shp_path = barrier.into();
        self
    }

    pub fn ignition(mut self, path: PathBuf) -> Self {
        self.inputs.ignition_shp_path = path;
        self
    }

    pub fn output_basename(mut self, name: &str) -> Self {
        self.inputs.output_basename = name.to_string();
        self
    }

    pub fn outputs_type(mut self, kind: OutputsType) -> Self {
        self.inputs.outputs_type = kind;
        self
    }

    pub fn build(self) -> RunInputs {
        self.inputs
    }
}
