//! Cleanup bookkeeping for deferred host operations.
//!
//! When a command returns `VK_OPERATION_DEFERRED_KHR` the driver keeps
//! reading the unwrapped copies the layer handed it, so the scratch arena of
//! that call must outlive the call. It is parked here under the operation's
//! outer handle and released once the operation is observed complete.
//! Post-completion work (wrapping deferred pipeline outputs) is parked the
//! same way.

use std::collections::HashMap;

use parking_lot::Mutex;
use vkchassis_core::HandleTranslator;

use crate::scratch::Scratch;

/// Work run once a deferred operation completes, before its arenas are freed.
pub type CompletionHook = Box<dyn FnOnce(&HandleTranslator) + Send>;

#[derive(Default)]
struct PendingWork {
    retained: Vec<Scratch>,
    on_complete: Vec<CompletionHook>,
}

impl PendingWork {
    fn len(&self) -> usize {
        self.retained.len() + self.on_complete.len()
    }
}

/// Deferred operation outer handle -> everything awaiting its completion.
#[derive(Default)]
pub struct DeferredOperations {
    pending: Mutex<HashMap<u64, PendingWork>>,
}

impl DeferredOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a freshly created operation.
    pub fn track(&self, op: u64) {
        self.pending.lock().entry(op).or_default();
    }

    /// Keep `scratch` alive until `op` completes.
    pub fn defer(&self, op: u64, scratch: Scratch) {
        self.pending.lock().entry(op).or_default().retained.push(scratch);
    }

    /// Run `hook` when `op` completes.
    pub fn on_complete(&self, op: u64, hook: CompletionHook) {
        self.pending.lock().entry(op).or_default().on_complete.push(hook);
    }

    /// Run every hook registered for `op`, then drop its arenas. Returns the
    /// number of items released. Completing an unknown or already-completed
    /// operation releases nothing.
    pub fn complete(&self, op: u64, translator: &HandleTranslator) -> usize {
        let Some(work) = self.pending.lock().remove(&op) else {
            return 0;
        };
        let released = work.len();
        for hook in work.on_complete {
            hook(translator);
        }
        if released > 0 {
            tracing::debug!(released, "deferred operation {op:#x} retired");
        }
        released
    }

    /// Number of items parked on `op`.
    pub fn pending(&self, op: u64) -> usize {
        self.pending.lock().get(&op).map_or(0, PendingWork::len)
    }

    pub fn is_tracked(&self, op: u64) -> bool {
        self.pending.lock().contains_key(&op)
    }
}
