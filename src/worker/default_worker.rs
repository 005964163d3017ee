//! Built-in worker used when no plugin factory applies.
//!
//! Construction binds the RPC, data and web listeners so that callers can
//! read back the real ports straight away. `start()` starts the block and
//! file sub-services, serves the web status surface on a background Tokio
//! runtime, and opens the readiness gate once both sub-services report ready.

use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, error, info, warn};

use super::block::{BlockWorker, DefaultBlockWorker};
use super::file::{DefaultFileSystemWorker, FileSystemWorker};
use super::net_address::{WorkerNetAddress, TIER_RACK};
use super::readiness::{self, ReadinessGate};
use super::service::{Server, WorkerService, WorkerState};
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::web::{app_router, AppState};

const WEB_RUNTIME_THREADS: usize = 2;
const STARTUP_WATCH_INTERVAL: Duration = Duration::from_millis(50);

/// Live view of a worker shared with the web status surface.
#[derive(Debug)]
pub struct WorkerStatus {
    pub address: WorkerNetAddress,
    pub rpc_address: SocketAddr,
    pub start_time_ms: i64,
    started_at: Instant,
    state: Mutex<WorkerState>,
    ready: ReadinessGate,
}

impl WorkerStatus {
    pub fn new(address: WorkerNetAddress, rpc_address: SocketAddr) -> Self {
        Self {
            address,
            rpc_address,
            start_time_ms: Utc::now().timestamp_millis(),
            started_at: Instant::now(),
            state: Mutex::new(WorkerState::Constructed),
            ready: ReadinessGate::new(),
        }
    }

    /// Milliseconds since construction, measured on the monotonic clock.
    pub fn uptime_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    pub fn state(&self) -> WorkerState {
        *self.state.lock()
    }

    pub fn set_state(&self, state: WorkerState) {
        *self.state.lock() = state;
    }

    pub fn readiness(&self) -> &ReadinessGate {
        &self.ready
    }
}

struct Listeners {
    rpc: Option<TcpListener>,
    data: Option<TcpListener>,
    web: Option<TcpListener>,
}

/// The default [`WorkerService`] implementation.
pub struct DefaultWorker {
    status: Arc<WorkerStatus>,
    data_bind_host: String,
    data_port: u16,
    web_bind_host: String,
    web_port: u16,
    block_worker: Arc<dyn BlockWorker>,
    file_system_worker: Arc<dyn FileSystemWorker>,
    listeners: Mutex<Listeners>,
    web_runtime: Mutex<Option<Runtime>>,
}

impl DefaultWorker {
    /// Build a worker with the default block and file sub-services.
    pub fn new(conf: &WorkerConfig) -> WorkerResult<Self> {
        Self::with_subservices(
            conf,
            Arc::new(DefaultBlockWorker::new(conf.storage_tiers.clone())),
            Arc::new(DefaultFileSystemWorker::new()),
        )
    }

    /// Build a worker around caller-supplied sub-services.
    pub fn with_subservices(
        conf: &WorkerConfig,
        block_worker: Arc<dyn BlockWorker>,
        file_system_worker: Arc<dyn FileSystemWorker>,
    ) -> WorkerResult<Self> {
        let rpc = bind("rpc", &conf.bind_host, conf.rpc_port)?;
        let data = bind("data", &conf.bind_host, conf.data_port)?;
        let web = bind("web", &conf.bind_host, conf.web_port)?;

        let rpc_address = rpc.local_addr()?;
        let data_port = data.local_addr()?.port();
        let web_port = web.local_addr()?.port();

        let address = WorkerNetAddress::new(
            conf.hostname.clone(),
            rpc_address.port(),
            data_port,
            web_port,
        )
        .with_domain_socket_path(conf.domain_socket_path.clone())
        .with_tier(TIER_RACK, conf.rack.clone());

        info!(%address, %rpc_address, "worker constructed");

        Ok(Self {
            status: Arc::new(WorkerStatus::new(address, rpc_address)),
            data_bind_host: conf.bind_host.clone(),
            data_port,
            web_bind_host: conf.bind_host.clone(),
            web_port,
            block_worker,
            file_system_worker,
            listeners: Mutex::new(Listeners {
                rpc: Some(rpc),
                data: Some(data),
                web: Some(web),
            }),
            web_runtime: Mutex::new(None),
        })
    }

    /// Shared status handle, as served on the web port.
    pub fn status(&self) -> Arc<WorkerStatus> {
        Arc::clone(&self.status)
    }

    fn start_web_server(&self, listener: TcpListener) -> WorkerResult<()> {
        listener.set_nonblocking(true)?;
        let runtime = Builder::new_multi_thread()
            .worker_threads(WEB_RUNTIME_THREADS)
            .thread_name("worker-web")
            .enable_all()
            .build()?;

        let app = app_router(AppState::new(self.status()));
        runtime.spawn(async move {
            let listener = match tokio::net::TcpListener::from_std(listener) {
                Ok(listener) => listener,
                Err(e) => {
                    error!("web server could not adopt listener: {}", e);
                    return;
                }
            };
            if let Err(e) = axum::serve(listener, app).await {
                error!("web server failed: {}", e);
            }
        });

        *self.web_runtime.lock() = Some(runtime);
        Ok(())
    }

    fn start_components(&self) -> WorkerResult<()> {
        self.block_worker.start()?;
        self.file_system_worker.start()?;

        let web = self
            .listeners
            .lock()
            .web
            .take()
            .ok_or_else(|| WorkerError::Runtime("web listener already consumed".into()))?;
        self.start_web_server(web)?;

        // Detached: exits once both sub-services report ready or the worker leaves Starting.
        self.spawn_readiness_watch()?;
        Ok(())
    }

    fn spawn_readiness_watch(&self) -> WorkerResult<JoinHandle<()>> {
        let status = self.status();
        let block_worker = Arc::clone(&self.block_worker);
        let file_system_worker = Arc::clone(&self.file_system_worker);

        let handle = thread::Builder::new()
            .name("worker-startup".to_string())
            .spawn(move || {
                let gates = [block_worker.readiness(), file_system_worker.readiness()];
                while !readiness::wait_all_timeout(&gates, STARTUP_WATCH_INTERVAL) {
                    if status.state() != WorkerState::Starting {
                        debug!("worker left Starting before its sub-services were ready");
                        return;
                    }
                }

                let mut state = status.state.lock();
                if *state != WorkerState::Starting {
                    debug!(state = ?*state, "sub-services ready after worker left Starting");
                    return;
                }
                *state = WorkerState::Ready;
                // Opened under the state lock so `stop()` cannot interleave.
                status.readiness().mark_ready();
                drop(state);
                info!(address = %status.address, "worker ready");
            })?;
        Ok(handle)
    }

    /// Stop sub-services, the web runtime and the listeners.
    fn teardown(&self) {
        if let Err(e) = self.block_worker.stop() {
            warn!("failed to stop {}: {}", self.block_worker.name(), e);
        }
        if let Err(e) = self.file_system_worker.stop() {
            warn!("failed to stop {}: {}", self.file_system_worker.name(), e);
        }
        if let Some(runtime) = self.web_runtime.lock().take() {
            runtime.shutdown_background();
        }
        let mut listeners = self.listeners.lock();
        drop(listeners.rpc.take());
        drop(listeners.data.take());
        drop(listeners.web.take());
    }
}

impl Server for DefaultWorker {
    fn name(&self) -> &str {
        "DefaultWorker"
    }

    fn start(&self) -> WorkerResult<()> {
        {
            let mut state = self.status.state.lock();
            if *state != WorkerState::Constructed {
                return Err(WorkerError::AlreadyStarted);
            }
            *state = WorkerState::Starting;
        }
        info!("starting worker");

        let started = self.start_components();
        if let Err(e) = &started {
            error!("worker failed to start: {}", e);
            self.status.set_state(WorkerState::Stopped);
            self.teardown();
        }
        started
    }

    fn stop(&self) -> WorkerResult<()> {
        let previous = {
            let mut state = self.status.state.lock();
            std::mem::replace(&mut *state, WorkerState::Stopped)
        };
        if previous == WorkerState::Constructed || previous == WorkerState::Stopped {
            return Ok(());
        }
        info!("stopping worker");
        self.teardown();
        Ok(())
    }

    fn is_serving(&self) -> bool {
        matches!(
            self.status.state(),
            WorkerState::Starting | WorkerState::Ready
        )
    }
}

impl WorkerService for DefaultWorker {
    fn address(&self) -> WorkerNetAddress {
        self.status.address.clone()
    }

    fn block_worker(&self) -> Arc<dyn BlockWorker> {
        Arc::clone(&self.block_worker)
    }

    fn file_system_worker(&self) -> Arc<dyn FileSystemWorker> {
        Arc::clone(&self.file_system_worker)
    }

    fn data_bind_host(&self) -> String {
        self.data_bind_host.clone()
    }

    fn data_local_port(&self) -> u16 {
        self.data_port
    }

    fn rpc_address(&self) -> SocketAddr {
        self.status.rpc_address
    }

    fn start_time_ms(&self) -> i64 {
        self.status.start_time_ms
    }

    fn uptime_ms(&self) -> u64 {
        self.status.uptime_ms()
    }

    fn web_bind_host(&self) -> String {
        self.web_bind_host.clone()
    }

    fn web_local_port(&self) -> u16 {
        self.web_port
    }

    fn state(&self) -> WorkerState {
        self.status.state()
    }

    fn wait_for_ready(&self) {
        self.status.readiness().wait();
    }

    fn wait_for_ready_timeout(&self, timeout: Duration) -> bool {
        self.status.readiness().wait_timeout(timeout)
    }
}

impl Drop for DefaultWorker {
    fn drop(&mut self) {
        // A runtime dropped inside another runtime's context panics.
        if let Some(runtime) = self.web_runtime.get_mut().take() {
            runtime.shutdown_background();
        }
    }
}

fn bind(role: &'static str, host: &str, port: u16) -> WorkerResult<TcpListener> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|e| WorkerError::Config(format!("cannot resolve {role} bind host {host:?}: {e}")))?
        .next()
        .ok_or_else(|| WorkerError::Config(format!("{role} bind host {host:?} has no address")))?;
    TcpListener::bind(addr).map_err(|source| WorkerError::Bind { role, addr, source })
}
