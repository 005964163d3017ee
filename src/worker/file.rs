//! File-system sub-service boundary.

use parking_lot::Mutex;
use tracing::debug;

use super::readiness::ReadinessGate;
use crate::error::{WorkerError, WorkerResult};

/// Handle to the sub-service serving file/namespace-level operations.
pub trait FileSystemWorker: Send + Sync {
    fn name(&self) -> &str {
        "FileSystemWorker"
    }

    fn start(&self) -> WorkerResult<()>;

    fn stop(&self) -> WorkerResult<()>;

    fn readiness(&self) -> &ReadinessGate;
}

/// In-process file-system worker used by the default worker.
#[derive(Debug, Default)]
pub struct DefaultFileSystemWorker {
    running: Mutex<bool>,
    ready: ReadinessGate,
}

impl DefaultFileSystemWorker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileSystemWorker for DefaultFileSystemWorker {
    fn start(&self) -> WorkerResult<()> {
        let mut running = self.running.lock();
        if *running {
            return Err(WorkerError::AlreadyStarted);
        }
        *running = true;
        debug!("file system worker started");
        self.ready.mark_ready();
        Ok(())
    }

    fn stop(&self) -> WorkerResult<()> {
        *self.running.lock() = false;
        debug!("file system worker stopped");
        Ok(())
    }

    fn readiness(&self) -> &ReadinessGate {
        &self.ready
    }
}
