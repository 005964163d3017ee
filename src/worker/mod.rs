//! The worker capability contract and its bootstrap.
//!
//! - [`service`]: the [`WorkerService`] contract every worker honours
//! - [`factory`]: the [`WorkerFactory`] extension point for plugins
//! - [`registry`]: process-wide, lazily discovered factory registry
//! - [`bootstrap`]: [`Factory::create`], the single creation entry point
//! - [`default_worker`]: the built-in worker used when no plugin applies

pub mod block;
pub mod bootstrap;
pub mod default_worker;
pub mod factory;
pub mod file;
pub mod net_address;
pub mod readiness;
pub mod registry;
pub mod service;

pub use block::BlockWorker;
pub use bootstrap::Factory;
pub use default_worker::DefaultWorker;
pub use factory::WorkerFactory;
pub use file::FileSystemWorker;
pub use net_address::{LocalityTier, WorkerNetAddress};
pub use readiness::ReadinessGate;
pub use registry::{DiscoverySource, LazyRegistry, PluginRegistry};
pub use service::{Server, WorkerService, WorkerState};
