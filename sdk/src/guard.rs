use std::thread::{self, ThreadId};

/// Records the context that created the SDK handle. All service-touching
/// calls must come back through that same context; the underlying service
/// bindings are single-threaded.
///
/// The check runs in debug builds only. Release builds trust the host loop.
#[derive(Debug, Clone)]
pub struct MainContextGuard {
    main: ThreadId,
}

impl MainContextGuard {
    pub fn for_current_thread() -> Self {
        Self {
            main: thread::current().id(),
        }
    }

    #[inline]
    pub fn assert_main_context(&self) {
        debug_assert_eq!(
            thread::current().id(),
            self.main,
            "SDK call made off the main context it was created on"
        );
    }
}
