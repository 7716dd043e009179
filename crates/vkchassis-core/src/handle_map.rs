use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ash::vk::Handle;
use dashmap::DashMap;

use crate::config::UnknownHandlePolicy;
use crate::error::CoreError;

/// First outer value handed out. Kept well away from small integers so a
/// leaked inner value is easy to tell apart in logs.
pub const FIRST_OUTER_ID: u64 = 0x0100_0000;

// Shared by every translator in the process so outer values stay unique
// across instances and devices.
static NEXT_OUTER: AtomicU64 = AtomicU64::new(FIRST_OUTER_ID);

fn alloc_outer() -> u64 {
    NEXT_OUTER.fetch_add(1, Ordering::Relaxed)
}

/// Mapping from outer (application-visible) handles to inner (driver) handles.
///
/// Every operation is a single shard-locked DashMap access, so concurrent
/// wraps, unwraps and pops on different objects never observe a half-updated
/// entry. No lock is held once a method returns.
///
/// A translator may chain to a parent: device-scoped tables chain to their
/// instance so instance-level objects resolve from device calls. Wraps and
/// pops only ever touch the local table.
pub struct HandleTranslator {
    outer_to_inner: DashMap<u64, u64>,
    parent: Option<Arc<HandleTranslator>>,
    policy: UnknownHandlePolicy,
    misses: AtomicU64,
}

impl HandleTranslator {
    pub fn new() -> Self {
        Self::with_policy(UnknownHandlePolicy::default())
    }

    pub fn with_policy(policy: UnknownHandlePolicy) -> Self {
        Self {
            outer_to_inner: DashMap::new(),
            parent: None,
            policy,
            misses: AtomicU64::new(0),
        }
    }

    /// Create a translator whose misses fall through to `parent`.
    pub fn with_parent(parent: Arc<HandleTranslator>) -> Self {
        Self {
            outer_to_inner: DashMap::new(),
            policy: parent.policy,
            parent: Some(parent),
            misses: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> UnknownHandlePolicy {
        self.policy
    }

    /// Record a freshly created driver object and return its outer value.
    /// The null handle is never recorded and stays null.
    pub fn wrap_new(&self, inner: u64) -> u64 {
        if inner == 0 {
            return 0;
        }
        let outer = alloc_outer();
        self.outer_to_inner.insert(outer, inner);
        outer
    }

    /// Translate an outer value. Null maps to null; a miss is resolved by
    /// the unknown-handle policy.
    pub fn unwrap(&self, outer: u64) -> u64 {
        if outer == 0 {
            return 0;
        }
        if let Some(inner) = self.lookup(outer) {
            return inner;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        match self.policy {
            UnknownHandlePolicy::Null => {
                tracing::debug!("unwrap miss for {outer:#x}, forwarding null");
                0
            }
            UnknownHandlePolicy::FailFast => {
                // aborts the host when reached through an extern "system" entry point
                panic!("unwrap of unknown handle {outer:#x}")
            }
        }
    }

    /// Like [`unwrap`](Self::unwrap) but reports a miss instead of applying the policy.
    pub fn try_unwrap(&self, outer: u64) -> Result<u64, CoreError> {
        if outer == 0 {
            return Ok(0);
        }
        self.lookup(outer).ok_or(CoreError::UnknownHandle(outer))
    }

    /// Remove an entry and return its inner value, or null if absent.
    pub fn pop(&self, outer: u64) -> u64 {
        if outer == 0 {
            return 0;
        }
        match self.outer_to_inner.remove(&outer) {
            Some((_, inner)) => inner,
            None => {
                tracing::debug!("pop of unknown handle {outer:#x}");
                0
            }
        }
    }

    pub fn contains(&self, outer: u64) -> bool {
        self.outer_to_inner.contains_key(&outer)
    }

    // ── Typed helpers ───────────────────────────────────────

    pub fn wrap<H: Handle>(&self, inner: H) -> H {
        H::from_raw(self.wrap_new(inner.as_raw()))
    }

    pub fn unwrap_handle<H: Handle>(&self, outer: H) -> H {
        H::from_raw(self.unwrap(outer.as_raw()))
    }

    pub fn pop_handle<H: Handle>(&self, outer: H) -> H {
        H::from_raw(self.pop(outer.as_raw()))
    }

    /// Number of live local entries.
    pub fn len(&self) -> usize {
        self.outer_to_inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outer_to_inner.is_empty()
    }

    /// Number of unwraps that found no entry.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn lookup(&self, outer: u64) -> Option<u64> {
        if let Some(inner) = self.outer_to_inner.get(&outer) {
            return Some(*inner);
        }
        self.parent.as_ref().and_then(|parent| parent.lookup(outer))
    }
}

impl Default for HandleTranslator {
    fn default() -> Self {
        Self::new()
    }
}
