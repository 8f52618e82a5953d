// privscan - Sensitive Data Sampling Scanner
// Copyright (c) 2025 privscan Contributors
// Licensed under the MIT License

use anyhow::Context;
use clap::Parser;
use privscan::cli::{commands::scan, Cli};
use privscan::logging::init_logging;
use std::process;
use tokio::runtime::Runtime;
use tokio::sync::watch;

fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(e.exit_code());
        }
    };

    let guard = match init_logging(&config.application.log_level, &config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "privscan");

    let runtime = match build_runtime(config.scan.processes) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(5);
        }
    };

    let exit_code = runtime.block_on(async {
        // Create shutdown signal channel for graceful shutdown
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(forward_signals(shutdown_tx));

        match scan::execute(&cli, &config, shutdown_rx).await {
            Ok(code) => code,
            Err(e) => {
                tracing::error!(error = %e, "Scan command failed");
                eprintln!("Error: {e:#}");
                5
            }
        }
    });

    // process::exit skips destructors; flush file logs first
    drop(runtime);
    drop(guard);
    process::exit(exit_code);
}

/// Builds the multi-threaded runtime, sized by `--processes` when given
fn build_runtime(worker_threads: Option<usize>) -> anyhow::Result<Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(threads) = worker_threads {
        builder.worker_threads(threads);
    }
    builder.build().context("Failed to build tokio runtime")
}

/// Flips the shutdown flag on SIGINT or SIGTERM
async fn forward_signals(shutdown_tx: watch::Sender<bool>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Received SIGINT (Ctrl+C), finishing running units...");
                    }
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, finishing running units...");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                tracing::info!("Received SIGINT (Ctrl+C), finishing running units...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        tracing::info!("Received SIGINT (Ctrl+C), finishing running units...");
    }

    eprintln!("\nShutdown signal received, finishing running units...");
    let _ = shutdown_tx.send(true);
}
