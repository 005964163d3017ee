//! Extension point for alternate worker implementations.
//!
//! A plugin crate implements [`WorkerFactory`] and registers it with
//! [`register_worker_factory!`]. Registration happens at link time, so the
//! bootstrap finds the factory without naming it.
//!
//! ```ignore
//! struct TieredWorkerFactory;
//!
//! impl WorkerFactory for TieredWorkerFactory {
//!     fn name(&self) -> &str { "tiered" }
//!
//!     fn create(&self, conf: &WorkerConfig) -> WorkerResult<Option<Box<dyn WorkerService>>> {
//!         if conf.storage_tiers.len() < 2 {
//!             return Ok(None);
//!         }
//!         Ok(Some(Box::new(TieredWorker::new(conf)?)))
//!     }
//! }
//!
//! register_worker_factory!(TieredWorkerFactory);
//! ```

use std::sync::Arc;

use super::service::WorkerService;
use crate::config::WorkerConfig;
use crate::error::WorkerResult;

/// Priority given to factories that do not override [`WorkerFactory::priority`].
pub const DEFAULT_PRIORITY: i32 = 100;

/// A candidate able to build a worker.
pub trait WorkerFactory: Send + Sync {
    /// Name used for ordering ties and in logs.
    fn name(&self) -> &str;

    /// Lower values are tried first.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Attempt to build a worker.
    ///
    /// `Ok(None)` declines; the bootstrap moves on to the next candidate.
    /// `Err` is a construction failure and aborts the bootstrap.
    fn create(&self, conf: &WorkerConfig) -> WorkerResult<Option<Box<dyn WorkerService>>>;
}

/// Link-time registration record collected by `inventory`.
pub struct FactoryRegistration {
    constructor: fn() -> Arc<dyn WorkerFactory>,
}

impl FactoryRegistration {
    pub const fn new(constructor: fn() -> Arc<dyn WorkerFactory>) -> Self {
        Self { constructor }
    }

    pub fn instantiate(&self) -> Arc<dyn WorkerFactory> {
        (self.constructor)()
    }
}

inventory::collect!(FactoryRegistration);

/// Register a [`WorkerFactory`] for discovery by the bootstrap.
///
/// The argument is an expression producing the factory value.
#[macro_export]
macro_rules! register_worker_factory {
    ($factory:expr) => {
        $crate::inventory::submit! {
            $crate::worker::factory::FactoryRegistration::new(
                || -> ::std::sync::Arc<dyn $crate::worker::factory::WorkerFactory> {
                    ::std::sync::Arc::new($factory)
                },
            )
        }
    };
}
