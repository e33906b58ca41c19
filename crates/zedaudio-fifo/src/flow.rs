//! Wait queue and cancellation for producers blocked on FIFO vacancy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

/// Per-instance queue of producers suspended until the hardware reports
/// room for a burst.
///
/// Readiness is never stored here: the gate protects only the
/// sleep/wake handshake, and every waiter re-reads the vacancy register
/// after waking. Wake-ups are broadcast; coalesced or spurious wakes are
/// harmless because of that re-check.
#[derive(Debug, Default)]
pub(crate) struct WaitQueue {
    gate: Mutex<()>,
    vacancy: Condvar,
}

impl WaitQueue {
    /// Wake every producer blocked on this queue.
    ///
    /// Callable from interrupt context: the gate is held only long enough
    /// to order the notification against a waiter's predicate check,
    /// never across a blocking region.
    pub(crate) fn wake_all(&self) {
        let _gate = self.gate.lock().unwrap();
        self.vacancy.notify_all();
    }

    /// Suspend until `ready()` holds, re-checking after every wake-up.
    ///
    /// Returns `false` if `cancelled()` fired first. Either way the queue
    /// is left intact for the remaining waiters.
    pub(crate) fn wait_until(
        &self,
        ready: impl Fn() -> bool,
        cancelled: impl Fn() -> bool,
    ) -> bool {
        let mut gate = self.gate.lock().unwrap();
        loop {
            if ready() {
                return true;
            }
            if cancelled() {
                return false;
            }
            gate = self.vacancy.wait(gate).unwrap();
        }
    }
}

/// Cooperative cancellation for a writer session's blocking waits.
///
/// Cancelling wakes every waiter on the owning instance's queue; the
/// cancelled session observes the flag and bails out while other waiters
/// re-check vacancy and keep going.
#[derive(Debug, Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    waitq: Arc<WaitQueue>,
}

impl CancelToken {
    pub(crate) fn new(waitq: Arc<WaitQueue>) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            waitq,
        }
    }

    /// Abort any in-progress or future wait tied to this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.waitq.wake_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
