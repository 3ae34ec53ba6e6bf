// src/lib.rs

pub mod classify;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fileset;
pub mod logging;
pub mod package;
pub mod pipeline;
pub mod types;
pub mod workspace;

use anyhow::Result;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::exec::ProcessBackend;
use crate::pipeline::{Pipeline, RunInputs};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - the pipeline with the real process backend
/// - Ctrl-C handling (cancels the running simulator)
/// - printing the result as JSON on stdout
pub async fn run(args: CliArgs) -> Result<()> {
    let mut raw = load_or_default(args.config.as_deref())?;
    args.apply_overrides(&mut raw);
    let cfg = ConfigFile::try_from(raw)?;

    let mut pipeline = Pipeline::with_real_backend(cfg.settings);

    if args.dry_run {
        print_dry_run(&pipeline, &cfg.inputs);
        return Ok(());
    }

    // Ctrl-C → kill the simulator and fail the step.
    let (cancel_tx, cancel_rx) = oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            // Keep the sender alive so the run is not treated as cancelled.
            std::future::pending::<()>().await;
        }
        let _ = cancel_tx.send(());
    });

    let output = pipeline.execute_with_cancel(&cfg.inputs, cancel_rx).await?;
    info!(zip = ?output.outputs_zip_path, "run complete");

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Simple dry-run output: print workspace, staged paths and the command line.
fn print_dry_run<B: ProcessBackend>(pipeline: &Pipeline<B>, inputs: &RunInputs) {
    let ws = pipeline.workspace();
    let args = pipeline.planned_args(inputs);
    let request = pipeline.request_for(&args);
    let logs = pipeline.log_paths(inputs);

    println!("farsite-exec dry-run");
    println!("  workspace.root = {}", ws.root().display());
    println!("  workspace.in   = {}", ws.in_dir().display());
    println!("  workspace.out  = {}", ws.out_dir().display());
    if let Some(timeout) = request.timeout {
        println!("  timeout        = {}s", timeout.as_secs());
    }
    println!();

    println!("arguments:");
    for (i, arg) in request.args.iter().enumerate() {
        println!("  {}: {arg}", i + 1);
    }
    println!();

    println!("command: {}", request.command_line());
    println!("runner log:   {}", logs.runner.display());
    println!("fallback log: {}", logs.fallback.display());
    println!(
        "archive:      {}",
        ws.archive_path(&inputs.output_basename).display()
    );

    debug!("dry-run complete (no execution)");
}
