//! Process-wide registry of worker factories.
//!
//! Discovery runs at most once per [`LazyRegistry`]. Concurrent first
//! callers block on the same initialisation and all observe the same
//! `Arc<PluginRegistry>`. Factories are never invoked under the lock.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use super::factory::{FactoryRegistration, WorkerFactory};

/// Where factory candidates come from.
pub trait DiscoverySource: Send + Sync {
    fn discover(&self) -> Vec<Arc<dyn WorkerFactory>>;
}

/// Factories registered with `register_worker_factory!` anywhere in the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct InventoryDiscovery;

impl DiscoverySource for InventoryDiscovery {
    fn discover(&self) -> Vec<Arc<dyn WorkerFactory>> {
        let mut factories = Vec::new();
        for registration in inventory::iter::<FactoryRegistration> {
            factories.push(registration.instantiate());
        }
        factories
    }
}

/// Ordered, immutable set of factory candidates.
///
/// Candidates are sorted by ascending priority, then by name, so the
/// selection order does not depend on link order.
pub struct PluginRegistry {
    factories: Vec<Arc<dyn WorkerFactory>>,
}

impl PluginRegistry {
    pub fn new(mut factories: Vec<Arc<dyn WorkerFactory>>) -> Self {
        factories.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.name().cmp(b.name()))
        });
        Self { factories }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// The registry discovered for this process.
    pub fn global() -> Arc<PluginRegistry> {
        GLOBAL_REGISTRY.get()
    }

    /// Candidates in selection order.
    pub fn factories(&self) -> &[Arc<dyn WorkerFactory>] {
        &self.factories
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("factories", &self.names())
            .finish()
    }
}

/// Lazily discovered, cached [`PluginRegistry`].
pub struct LazyRegistry<S> {
    source: S,
    cell: OnceCell<Arc<PluginRegistry>>,
}

impl<S: DiscoverySource> LazyRegistry<S> {
    pub const fn new(source: S) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    /// Discover on first call; return the cached registry afterwards.
    pub fn get(&self) -> Arc<PluginRegistry> {
        self.cell
            .get_or_init(|| {
                let registry = PluginRegistry::new(self.source.discover());
                debug!(factories = ?registry.names(), "discovered worker factories");
                Arc::new(registry)
            })
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

static GLOBAL_REGISTRY: LazyRegistry<InventoryDiscovery> = LazyRegistry::new(InventoryDiscovery);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkerConfig;
    use crate::error::WorkerResult;
    use crate::worker::service::WorkerService;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    struct NamedFactory {
        name: &'static str,
        priority: i32,
    }

    impl WorkerFactory for NamedFactory {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn create(&self, _conf: &WorkerConfig) -> WorkerResult<Option<Box<dyn WorkerService>>> {
            Ok(None)
        }
    }

    fn named(name: &'static str, priority: i32) -> Arc<dyn WorkerFactory> {
        Arc::new(NamedFactory { name, priority })
    }

    /// Counts discovery passes; sleeps to widen the race window.
    struct CountingSource {
        passes: AtomicUsize,
    }

    impl DiscoverySource for CountingSource {
        fn discover(&self) -> Vec<Arc<dyn WorkerFactory>> {
            self.passes.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            vec![named("b", 100), named("a", 100)]
        }
    }

    crate::register_worker_factory!(NamedFactory {
        name: "registry-test-decline",
        priority: 1000,
    });

    #[test]
    fn test_order_by_priority_then_name() {
        let registry = PluginRegistry::new(vec![
            named("zeta", 100),
            named("alpha", 100),
            named("urgent", 1),
            named("late", 500),
        ]);
        assert_eq!(registry.names(), vec!["urgent", "alpha", "zeta", "late"]);
    }

    #[test]
    fn test_repeated_access_returns_same_registry() {
        let lazy = LazyRegistry::new(CountingSource {
            passes: AtomicUsize::new(0),
        });
        assert!(!lazy.is_initialized());

        let first = lazy.get();
        let second = lazy.get();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.names(), vec!["a", "b"]);
        assert_eq!(lazy.source.passes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_access_discovers_once() {
        let threads = 16;
        let lazy = Arc::new(LazyRegistry::new(CountingSource {
            passes: AtomicUsize::new(0),
        }));
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let lazy = Arc::clone(&lazy);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    lazy.get()
                })
            })
            .collect();

        let registries: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(lazy.source.passes.load(Ordering::SeqCst), 1);
        for registry in &registries[1..] {
            assert!(Arc::ptr_eq(&registries[0], registry));
        }
    }

    #[test]
    fn test_global_registry_finds_registered_factory() {
        let registry = PluginRegistry::global();
        assert!(registry.names().contains(&"registry-test-decline"));
        assert!(Arc::ptr_eq(&registry, &PluginRegistry::global()));
    }
}
