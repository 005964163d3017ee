//! Worker bootstrap: pick a factory, fall back to the default worker.

use tracing::{debug, info};

use super::default_worker::DefaultWorker;
use super::registry::PluginRegistry;
use super::service::WorkerService;
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};

/// Entry point for creating the worker of this process.
///
/// Holds no state of its own; discovery is cached by [`PluginRegistry::global`].
pub enum Factory {}

impl Factory {
    /// Create the worker for this process from the environment configuration
    /// and the discovered plugin factories.
    pub fn create() -> WorkerResult<Box<dyn WorkerService>> {
        let conf = WorkerConfig::from_env()?;
        Self::create_with(&PluginRegistry::global(), &conf)
    }

    /// Create a worker from an explicit registry and configuration.
    ///
    /// Factories are tried in registry order. The first that builds a worker
    /// wins; a decline moves on to the next; a failure is returned at once.
    /// When every factory declines, the default worker is built.
    pub fn create_with(
        registry: &PluginRegistry,
        conf: &WorkerConfig,
    ) -> WorkerResult<Box<dyn WorkerService>> {
        for factory in registry.factories() {
            match factory.create(conf) {
                Ok(Some(worker)) => {
                    info!(factory = factory.name(), worker = worker.name(), "worker created");
                    return Ok(worker);
                }
                Ok(None) => {
                    debug!(factory = factory.name(), "worker factory declined");
                }
                Err(e) => {
                    return Err(WorkerError::Plugin {
                        name: factory.name().to_string(),
                        source: Box::new(e),
                    });
                }
            }
        }

        info!("no worker factory applied, creating default worker");
        Ok(Box::new(DefaultWorker::new(conf)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::factory::WorkerFactory;
    use crate::worker::service::WorkerState;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum Behaviour {
        Decline,
        Build,
        Fail,
    }

    struct ScriptedFactory {
        name: &'static str,
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl ScriptedFactory {
        fn new(name: &'static str, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                name,
                behaviour,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl WorkerFactory for ScriptedFactory {
        fn name(&self) -> &str {
            self.name
        }

        fn create(&self, conf: &WorkerConfig) -> WorkerResult<Option<Box<dyn WorkerService>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Decline => Ok(None),
                Behaviour::Build => {
                    let conf = WorkerConfig {
                        hostname: format!("built-by-{}", self.name),
                        ..conf.clone()
                    };
                    Ok(Some(Box::new(DefaultWorker::new(&conf)?)))
                }
                Behaviour::Fail => Err(WorkerError::Config("tier directory missing".into())),
            }
        }
    }

    fn registry(factories: &[Arc<ScriptedFactory>]) -> PluginRegistry {
        PluginRegistry::new(
            factories
                .iter()
                .map(|f| Arc::clone(f) as Arc<dyn WorkerFactory>)
                .collect(),
        )
    }

    #[test]
    fn test_no_plugins_yields_default_worker() {
        let worker =
            Factory::create_with(&PluginRegistry::empty(), &WorkerConfig::ephemeral()).unwrap();
        assert_eq!(worker.name(), "DefaultWorker");
        assert_eq!(worker.state(), WorkerState::Constructed);
        assert_eq!(worker.block_worker().storage_tiers(), vec!["MEM"]);
        assert!(!worker.file_system_worker().readiness().is_ready());

        worker.start().unwrap();
        worker.wait_for_ready();
        assert!(worker.block_worker().readiness().is_ready());
        assert!(worker.file_system_worker().readiness().is_ready());
        worker.stop().unwrap();
    }

    #[test]
    fn test_decline_falls_through_to_next() {
        let a = ScriptedFactory::new("a", Behaviour::Decline);
        let b = ScriptedFactory::new("b", Behaviour::Build);
        let c = ScriptedFactory::new("c", Behaviour::Build);

        let candidates = registry(&[c.clone(), b.clone(), a.clone()]);
        let worker = Factory::create_with(&candidates, &WorkerConfig::ephemeral()).unwrap();

        assert_eq!(worker.address().host, "built-by-b");
        assert_eq!((a.calls(), b.calls(), c.calls()), (1, 1, 0));
    }

    #[test]
    fn test_all_decline_yields_default_worker() {
        let a = ScriptedFactory::new("a", Behaviour::Decline);
        let b = ScriptedFactory::new("b", Behaviour::Decline);

        let candidates = registry(&[a.clone(), b.clone()]);
        let worker = Factory::create_with(&candidates, &WorkerConfig::ephemeral()).unwrap();

        assert_eq!(worker.address().host, "localhost");
        assert_eq!((a.calls(), b.calls()), (1, 1));
    }

    #[test]
    fn test_failure_propagates_without_trying_rest() {
        let a = ScriptedFactory::new("a", Behaviour::Fail);
        let b = ScriptedFactory::new("b", Behaviour::Build);

        let candidates = registry(&[a.clone(), b.clone()]);
        let err = Factory::create_with(&candidates, &WorkerConfig::ephemeral()).err().unwrap();

        match err {
            WorkerError::Plugin { name, source } => {
                assert_eq!(name, "a");
                assert!(matches!(*source, WorkerError::Config(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(b.calls(), 0);
    }

    #[test]
    fn test_default_worker_bind_failure_propagates() {
        let held = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let conf = WorkerConfig {
            web_port: held.local_addr().unwrap().port(),
            ..WorkerConfig::ephemeral()
        };
        let err = Factory::create_with(&PluginRegistry::empty(), &conf).err().unwrap();
        assert!(matches!(err, WorkerError::Bind { role: "web", .. }));
    }

    #[test]
    fn test_create_uses_global_registry() {
        // The global registry holds a declining test factory; the default
        // worker is built behind it.
        let conf = WorkerConfig::ephemeral();
        let worker = Factory::create_with(&PluginRegistry::global(), &conf).unwrap();
        assert_eq!(worker.name(), "DefaultWorker");
    }

    #[test]
    fn test_create_from_environment() {
        // Default ports may already be taken on the test host; either outcome
        // must come back as a value, never a panic.
        match Factory::create() {
            Ok(worker) => {
                assert_eq!(worker.name(), "DefaultWorker");
                assert_eq!(worker.state(), WorkerState::Constructed);
                assert!(worker.rpc_address().port() != 0);
            }
            Err(WorkerError::Bind { .. }) | Err(WorkerError::Config(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
