//! The contract every worker implementation exposes.
//!
//! Whatever factory built it, a worker is used the same way:
//!
//! 1. `start()` kicks off the sub-services and endpoints
//! 2. `wait_for_ready()` blocks until all of them are up
//! 3. accessors report the identity and ports to advertise to the master

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use super::block::BlockWorker;
use super::file::FileSystemWorker;
use super::net_address::WorkerNetAddress;
use crate::error::WorkerResult;

/// Observable lifecycle state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Constructed,
    Starting,
    Ready,
    Stopped,
}

/// A long-running service with a start/stop lifecycle.
pub trait Server: Send + Sync {
    fn name(&self) -> &str;

    /// Start serving. Returns once startup is under way; use the readiness
    /// gate to learn when it completes.
    fn start(&self) -> WorkerResult<()>;

    fn stop(&self) -> WorkerResult<()>;

    /// Whether the server has started and not yet stopped.
    fn is_serving(&self) -> bool;
}

/// A worker in the storage cluster.
pub trait WorkerService: Server {
    /// Connect information for this worker.
    fn address(&self) -> WorkerNetAddress;

    fn block_worker(&self) -> Arc<dyn BlockWorker>;

    fn file_system_worker(&self) -> Arc<dyn FileSystemWorker>;

    /// Host the data service is bound to.
    fn data_bind_host(&self) -> String;

    /// Port the data service is bound to (the real port when `0` was requested).
    fn data_local_port(&self) -> u16;

    /// Socket address the RPC service is bound to.
    fn rpc_address(&self) -> SocketAddr;

    /// Construction time in milliseconds since the Unix epoch.
    fn start_time_ms(&self) -> i64;

    /// Milliseconds since construction.
    fn uptime_ms(&self) -> u64;

    fn web_bind_host(&self) -> String;

    fn web_local_port(&self) -> u16;

    fn state(&self) -> WorkerState;

    /// Block until the worker is ready to serve requests.
    fn wait_for_ready(&self);

    /// Like [`WorkerService::wait_for_ready`], giving up after `timeout`.
    /// Returns `true` if the worker became ready.
    fn wait_for_ready_timeout(&self, timeout: Duration) -> bool;
}
