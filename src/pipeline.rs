// src/pipeline.rs

//! The execution pipeline: stage inputs, run the simulator, classify the
//! result, package outputs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::classify::{LogPaths, classify, write_fallback_log};
use crate::errors::Result;
use crate::exec::{ExecutionRequest, FarsiteArgs, ProcessBackend, RealProcessBackend};
use crate::fileset::{NO_BARRIER, resolve_barrier, resolve_file_set, resolve_single_file};
use crate::package::archive;
use crate::types::OutputsType;
use crate::workspace::Workspace;

/// Where things live and what to run. Fixed for the lifetime of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub workspace: Workspace,
    pub executable: PathBuf,
    pub timeout: Option<Duration>,
}

/// Inputs of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInputs {
    pub lcp_path: PathBuf,
    pub inputs_path: PathBuf,
    pub ignition_shp_path: PathBuf,
    /// Barrier `.shp` path, or `"0"` / empty for none.
    pub barrier_shp_path: String,
    /// Prefix of the output base, the logs and the archive.
    pub output_basename: String,
    pub outputs_type: OutputsType,
}

/// What a successful run hands back to the hosting pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutput {
    pub outputs_zip_path: PathBuf,
    pub runner_log_path: PathBuf,
}

pub struct Pipeline<B: ProcessBackend> {
    settings: Settings,
    backend: B,
}

impl Pipeline<RealProcessBackend> {
    pub fn with_real_backend(settings: Settings) -> Self {
        Self::new(settings, RealProcessBackend::new())
    }
}

impl<B: ProcessBackend> Pipeline<B> {
    pub fn new(settings: Settings, backend: B) -> Self {
        Self { settings, backend }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.settings.workspace
    }

    pub fn log_paths(&self, inputs: &RunInputs) -> LogPaths {
        let ws = self.workspace();
        LogPaths {
            runner: ws.runner_log(&inputs.output_basename),
            fallback: ws.fallback_log(&inputs.output_basename),
        }
    }

    /// Run without an external cancellation source.
    pub async fn execute(&mut self, inputs: &RunInputs) -> Result<PipelineOutput> {
        let (_keep_alive, cancel) = oneshot::channel();
        self.execute_with_cancel(inputs, cancel).await
    }

    /// Run the whole pipeline. Firing `cancel` kills the simulator; staged
    /// inputs and partial outputs stay on disk and no archive is produced.
    pub async fn execute_with_cancel(
        &mut self,
        inputs: &RunInputs,
        cancel: oneshot::Receiver<()>,
    ) -> Result<PipelineOutput> {
        self.workspace().provision()?;

        info!(dir = ?self.workspace().in_dir(), "staging inputs");
        let args = self.stage_inputs(inputs)?;
        let request = self.request_for(&args);
        let logs = self.log_paths(inputs);

        info!(cmd = %request.command_line(), "running wrapper");
        let invocation = match self.backend.run(request, cancel).await {
            Ok(inv) => inv,
            Err(err) => {
                // Keep the log guarantee even when nothing ran.
                let note = format!("failed to launch {:?}: {err}\n", self.settings.executable);
                if let Err(log_err) = write_fallback_log(&logs.fallback, &note) {
                    warn!(error = %log_err, "could not write fallback log");
                }
                return Err(err);
            }
        };

        let runner_log_path = classify(&invocation, &logs)?;

        let archive_path = self.workspace().archive_path(&inputs.output_basename);
        let outputs_zip_path = archive(self.workspace().out_dir(), &archive_path)?;

        info!(zip = ?outputs_zip_path, "outputs zipped");
        info!(log = ?runner_log_path, "runner log");

        Ok(PipelineOutput {
            outputs_zip_path,
            runner_log_path,
        })
    }

    /// Copy every input into the input root and build the argument list
    /// from the staged locations.
    pub fn stage_inputs(&self, inputs: &RunInputs) -> Result<FarsiteArgs> {
        let in_dir = self.workspace().in_dir();

        let landscape = resolve_single_file(&inputs.lcp_path, in_dir)?;
        let parameters = resolve_single_file(&inputs.inputs_path, in_dir)?;
        let ignition = resolve_file_set(&inputs.ignition_shp_path, in_dir)?;
        let barrier = resolve_barrier(Some(inputs.barrier_shp_path.as_str()), in_dir)?;

        Ok(FarsiteArgs {
            landscape,
            parameters,
            ignition,
            barrier,
            output_base: self.workspace().output_base(&inputs.output_basename),
            outputs_type: inputs.outputs_type,
        })
    }

    /// The argument list a run would use, computed without touching the
    /// filesystem.
    pub fn planned_args(&self, inputs: &RunInputs) -> FarsiteArgs {
        let in_dir = self.workspace().in_dir();
        let barrier = inputs.barrier_shp_path.trim();
        let barrier = if barrier.is_empty() || barrier == NO_BARRIER {
            NO_BARRIER.to_string()
        } else {
            staged_location(in_dir, Path::new(barrier))
                .to_string_lossy()
                .into_owned()
        };

        FarsiteArgs {
            landscape: staged_location(in_dir, &inputs.lcp_path),
            parameters: staged_location(in_dir, &inputs.inputs_path),
            ignition: staged_location(in_dir, &inputs.ignition_shp_path),
            barrier,
            output_base: self.workspace().output_base(&inputs.output_basename),
            outputs_type: inputs.outputs_type,
        }
    }

    pub fn request_for(&self, args: &FarsiteArgs) -> ExecutionRequest {
        ExecutionRequest::new(&self.settings.executable, self.workspace().root())
            .args(args.to_args())
            .timeout(self.settings.timeout)
    }
}

fn staged_location(dir: &Path, src: &Path) -> PathBuf {
    match src.file_name() {
        Some(name) => dir.join(name),
        None => dir.to_path_buf(),
    }
}
