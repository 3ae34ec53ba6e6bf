// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`request`] builds the positional argument list and the launch request.
//! - [`invoker`] runs one process with `tokio::process::Command`, merging its
//!   stdout and stderr into one captured buffer, with optional timeout and
//!   cancellation.
//! - [`backend`] provides the `ProcessBackend` trait and the concrete
//!   `RealProcessBackend` used in production, which tests can replace with a
//!   fake implementation.

pub mod backend;
pub mod invoker;
pub mod request;

pub use backend::{ProcessBackend, RealProcessBackend};
pub use invoker::{Invocation, ProcessEnd, run_process};
pub use request::{ExecutionRequest, FarsiteArgs};
