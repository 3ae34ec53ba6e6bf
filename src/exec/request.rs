// src/exec/request.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::types::OutputsType;

/// The six positional arguments of the simulator wrapper, in call order.
///
/// The wrapper has no flag interface; position is the only contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarsiteArgs {
    pub landscape: PathBuf,
    pub parameters: PathBuf,
    pub ignition: PathBuf,
    /// `"0"` or the staged barrier `.shp` path.
    pub barrier: String,
    /// Filename prefix under the output root; not a file itself.
    pub output_base: PathBuf,
    pub outputs_type: OutputsType,
}

impl FarsiteArgs {
    pub fn to_args(&self) -> Vec<String> {
        vec![
            self.landscape.to_string_lossy().into_owned(),
            self.parameters.to_string_lossy().into_owned(),
            self.ignition.to_string_lossy().into_owned(),
            self.barrier.clone(),
            self.output_base.to_string_lossy().into_owned(),
            self.outputs_type.code().to_string(),
        ]
    }
}

/// Everything needed to launch the external executable once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub executable: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Kill the process if it runs longer than this.
    pub timeout: Option<Duration>,
}

impl ExecutionRequest {
    pub fn new(executable: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
            timeout: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Space-joined command line, for logs only.
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
