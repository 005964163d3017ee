//! storage-worker binary.
//!
//! Creates the worker through the plugin bootstrap, starts it, waits until
//! it is ready, then serves until Ctrl-C.
//!
//! # Environment Variables
//!
//! - `WORKER_HOSTNAME` — Hostname advertised to the master (default: localhost)
//! - `WORKER_BIND_HOST` — Bind host for all listeners (default: 0.0.0.0)
//! - `WORKER_RPC_PORT` / `WORKER_DATA_PORT` / `WORKER_WEB_PORT` — Ports (0 = any free port)
//! - `WORKER_TIERED_STORE_ALIASES` — Comma-separated storage tiers (default: MEM)
//! - `RUST_LOG` — Tracing filter (default: "info,storage_worker=debug")
//!
//! # Usage
//!
//! ```bash
//! WORKER_WEB_PORT=0 cargo run --bin storage-worker
//! ```

use std::sync::mpsc;

use anyhow::Context;
use storage_worker::Factory;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storage_worker=debug".into()),
        )
        .init();

    let worker = Factory::create().context("failed to create worker")?;
    worker.start().context("failed to start worker")?;

    tracing::info!("waiting for {} to become ready", worker.name());
    worker.wait_for_ready();

    tracing::info!("worker {} ready", worker.address());
    tracing::info!("  rpc:  {}", worker.rpc_address());
    tracing::info!("  data: {}:{}", worker.data_bind_host(), worker.data_local_port());
    tracing::info!("  web:  {}:{}", worker.web_bind_host(), worker.web_local_port());

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("failed to install Ctrl-C handler")?;
    let _ = rx.recv();

    tracing::info!("shutting down after {} ms", worker.uptime_ms());
    worker.stop().context("failed to stop worker")?;
    Ok(())
}
