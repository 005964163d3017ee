//! Block sub-service boundary.
//!
//! The block storage engine lives elsewhere; a worker only needs to start
//! it, stop it, and observe its readiness.

use parking_lot::Mutex;
use tracing::debug;

use super::readiness::ReadinessGate;
use crate::error::{WorkerError, WorkerResult};

/// Handle to the sub-service managing fixed-size block storage.
pub trait BlockWorker: Send + Sync {
    fn name(&self) -> &str {
        "BlockWorker"
    }

    /// Storage tier aliases managed by this block worker, fastest first.
    fn storage_tiers(&self) -> Vec<String>;

    /// Begin startup. Readiness is signalled through [`BlockWorker::readiness`].
    fn start(&self) -> WorkerResult<()>;

    fn stop(&self) -> WorkerResult<()>;

    fn readiness(&self) -> &ReadinessGate;
}

/// In-process block worker used by the default worker.
#[derive(Debug)]
pub struct DefaultBlockWorker {
    tiers: Vec<String>,
    running: Mutex<bool>,
    ready: ReadinessGate,
}

impl DefaultBlockWorker {
    pub fn new(tiers: Vec<String>) -> Self {
        Self {
            tiers,
            running: Mutex::new(false),
            ready: ReadinessGate::new(),
        }
    }
}

impl BlockWorker for DefaultBlockWorker {
    fn storage_tiers(&self) -> Vec<String> {
        self.tiers.clone()
    }

    fn start(&self) -> WorkerResult<()> {
        let mut running = self.running.lock();
        if *running {
            return Err(WorkerError::AlreadyStarted);
        }
        if self.tiers.is_empty() {
            return Err(WorkerError::Config("block worker has no storage tiers".into()));
        }
        *running = true;
        debug!(tiers = ?self.tiers, "block worker started");
        self.ready.mark_ready();
        Ok(())
    }

    fn stop(&self) -> WorkerResult<()> {
        *self.running.lock() = false;
        debug!("block worker stopped");
        Ok(())
    }

    fn readiness(&self) -> &ReadinessGate {
        &self.ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_opens_gate_once() {
        let worker = DefaultBlockWorker::new(vec!["MEM".into(), "SSD".into()]);
        assert!(!worker.readiness().is_ready());
        worker.start().unwrap();
        assert!(worker.readiness().is_ready());
        assert!(matches!(worker.start(), Err(WorkerError::AlreadyStarted)));
        assert_eq!(worker.storage_tiers(), vec!["MEM", "SSD"]);
    }

    #[test]
    fn test_start_without_tiers_fails() {
        let worker = DefaultBlockWorker::new(vec![]);
        assert!(matches!(worker.start(), Err(WorkerError::Config(_))));
        assert!(!worker.readiness().is_ready());
    }
}
