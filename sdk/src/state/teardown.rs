use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::registry::{ConsumerToken, ReleaseFlag};

/// Cross-thread request line asking the main context to sweep released
/// consumers on its next tick.
///
/// Requests coalesce into a single bit; the sweep itself discovers every
/// released slot, so losing the count costs nothing.
#[derive(Debug, Default)]
pub struct TeardownQueue {
    pending: AtomicBool,
}

impl TeardownQueue {
    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Consumes the pending request, if any.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

/// RAII registration held by a consumer.
///
/// Dropping the handle is safe from any thread: it trips the release flag
/// and asks the main context to run the effectful teardown there, instead of
/// calling into the single-threaded service binding directly. Paths that are
/// already on the main context can read the token and remove the
/// registration synchronously instead.
pub struct StateHandle {
    token: ConsumerToken,
    flag: Arc<ReleaseFlag>,
    teardown: Arc<TeardownQueue>,
}

impl StateHandle {
    pub(crate) fn new(
        token: ConsumerToken,
        flag: Arc<ReleaseFlag>,
        teardown: Arc<TeardownQueue>,
    ) -> Self {
        Self {
            token,
            flag,
            teardown,
        }
    }

    pub(crate) fn token(&self) -> ConsumerToken {
        self.token
    }
}

impl Drop for StateHandle {
    fn drop(&mut self) {
        self.flag.release();
        self.teardown.request();
    }
}
