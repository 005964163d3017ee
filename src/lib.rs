//! # storage-worker
//!
//! Worker node bootstrap for a distributed block/file storage cluster.
//!
//! A host process calls [`Factory::create`] once at startup. The bootstrap
//! discovers the installed [`WorkerFactory`] plugins (once per process),
//! lets the first applicable one build the worker, and falls back to the
//! built-in [`DefaultWorker`] otherwise. The returned [`WorkerService`] is
//! then started and awaited with [`WorkerService::wait_for_ready`] before
//! being advertised to the master.

pub mod config;
pub mod error;
pub mod web;
pub mod worker;

// Used by `register_worker_factory!`.
#[doc(hidden)]
pub use inventory;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use worker::{
    BlockWorker, DefaultWorker, Factory, FileSystemWorker, PluginRegistry, WorkerFactory,
    WorkerNetAddress, WorkerService,
};

/// Crate version reported by the web status surface.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
