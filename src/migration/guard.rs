use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reject-if-busy flag for migration runs.
///
/// There is no queue and no waiting: a caller either gets a [`SessionToken`]
/// or is told a run is already active.
#[derive(Debug, Clone, Default)]
pub struct SessionGuard {
    migrating: Arc<AtomicBool>,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a run as active. Returns `None` if one already is.
    pub fn try_acquire(&self) -> Option<SessionToken> {
        self.migrating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SessionToken {
                migrating: Arc::clone(&self.migrating),
            })
    }

    pub fn is_migrating(&self) -> bool {
        self.migrating.load(Ordering::Acquire)
    }
}

/// Held for the duration of one run; clears the flag when dropped.
#[derive(Debug)]
pub struct SessionToken {
    migrating: Arc<AtomicBool>,
}

impl Drop for SessionToken {
    fn drop(&mut self) {
        self.migrating.store(false, Ordering::Release);
    }
}
