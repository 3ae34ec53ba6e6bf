// src/exec/backend.rs

//! Pluggable process backend.
//!
//! The pipeline talks to a `ProcessBackend` instead of spawning processes
//! directly. Production code uses [`RealProcessBackend`]; tests can provide a
//! fake that records requests and returns canned invocations.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::oneshot;

use crate::errors::Result;

use super::invoker::{Invocation, run_process};
use super::request::ExecutionRequest;

/// Trait abstracting how the external executable is run.
pub trait ProcessBackend: Send {
    /// Run the request to completion, or until `cancel` fires.
    ///
    /// Implementations must not retry; the executable's side effects are not
    /// known to be idempotent.
    fn run(
        &mut self,
        request: ExecutionRequest,
        cancel: oneshot::Receiver<()>,
    ) -> Pin<Box<dyn Future<Output = Result<Invocation>> + Send + '_>>;
}

/// Backend that spawns a real OS process.
#[derive(Debug, Clone, Default)]
pub struct RealProcessBackend;

impl RealProcessBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessBackend for RealProcessBackend {
    fn run(
        &mut self,
        request: ExecutionRequest,
        cancel: oneshot::Receiver<()>,
    ) -> Pin<Box<dyn Future<Output = Result<Invocation>> + Send + '_>> {
        Box::pin(async move { run_process(&request, cancel).await })
    }
}
