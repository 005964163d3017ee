//! Readiness gate shared by a worker and its sub-services.
//!
//! A gate starts closed and opens exactly once. Opening wakes every waiter;
//! waits on an open gate return immediately.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// One-shot, multi-waiter readiness signal.
#[derive(Debug, Default)]
pub struct ReadinessGate {
    ready: Mutex<bool>,
    cond: Condvar,
}

impl ReadinessGate {
    /// Create a closed gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate and wake all waiters. Idempotent.
    pub fn mark_ready(&self) {
        let mut ready = self.ready.lock();
        if !*ready {
            *ready = true;
            self.cond.notify_all();
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.lock()
    }

    /// Block until the gate opens.
    pub fn wait(&self) {
        let mut ready = self.ready.lock();
        while !*ready {
            self.cond.wait(&mut ready);
        }
    }

    /// Block until the gate opens or `timeout` elapses.
    ///
    /// Returns `true` if the gate is open.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.wait_deadline(deadline)
    }

    /// Block until the gate opens or `deadline` passes.
    pub fn wait_deadline(&self, deadline: Instant) -> bool {
        let mut ready = self.ready.lock();
        while !*ready {
            if self.cond.wait_until(&mut ready, deadline).timed_out() {
                return *ready;
            }
        }
        true
    }
}

/// Block until every gate has opened.
pub fn wait_all(gates: &[&ReadinessGate]) {
    for gate in gates {
        gate.wait();
    }
}

/// Block until every gate has opened, sharing one deadline across them.
pub fn wait_all_timeout(gates: &[&ReadinessGate], timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    gates.iter().all(|gate| gate.wait_deadline(deadline))
}
