use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use farsite_exec::errors::Result;
use farsite_exec::exec::{ExecutionRequest, Invocation, ProcessBackend};
use tokio::sync::oneshot;

type Behaviour = Box<dyn FnMut(&ExecutionRequest) -> Invocation + Send>;

/// A fake process backend that:
/// - records every request it was asked to run
/// - answers with whatever the behaviour closure returns (the closure may
///   also write files, standing in for the simulator).
pub struct FakeBackend {
    requests: Arc<Mutex<Vec<ExecutionRequest>>>,
    behaviour: Behaviour,
}

impl FakeBackend {
    pub fn new(
        requests: Arc<Mutex<Vec<ExecutionRequest>>>,
        behaviour: impl FnMut(&ExecutionRequest) -> Invocation + Send + 'static,
    ) -> Self {
        Self {
            requests,
            behaviour: Box::new(behaviour),
        }
    }

    /// Always exit with `status` and print `captured`.
    pub fn exiting(
        requests: Arc<Mutex<Vec<ExecutionRequest>>>,
        status: i32,
        captured: &str,
    ) -> Self {
        let captured = captured.to_string();
        Self::new(requests, move |_| Invocation::exited(status, captured.clone()))
    }
}

impl ProcessBackend for FakeBackend {
    fn run(
        &mut self,
        request: ExecutionRequest,
        _cancel: oneshot::Receiver<()>,
    ) -> Pin<Box<dyn Future<Output = Result<Invocation>> + Send + '_>> {
        {
            let mut guard = self.requests.lock().unwrap();
            guard.push(request.clone());
        }
        let invocation = (self.behaviour)(&request);

        Box::pin(async move { Ok(invocation) })
    }
}
