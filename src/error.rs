//! Worker errors.

use std::net::SocketAddr;

use thiserror::Error;

/// Errors raised while constructing, starting, or stopping a worker.
///
/// A factory that has nothing to offer returns `Ok(None)` rather than an
/// error; every variant here is a hard failure.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Configuration value missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A listener could not be bound.
    #[error("Failed to bind {role} endpoint on {addr}: {source}")]
    Bind {
        role: &'static str,
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// File or socket I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A plugin factory attempted construction and failed.
    #[error("Worker factory '{name}' failed: {source}")]
    Plugin {
        name: String,
        #[source]
        source: Box<WorkerError>,
    },

    /// `start()` was called on a worker that is already running.
    #[error("Worker already started")]
    AlreadyStarted,

    /// An operation needed a started worker.
    #[error("Worker not started")]
    NotStarted,

    /// A sub-service or background runtime failed.
    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Convenience alias used throughout the crate.
pub type WorkerResult<T> = Result<T, WorkerError>;
