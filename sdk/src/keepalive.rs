use crate::state::StateHandle;

/// Keeps the service connection open for as long as the handle lives.
///
/// Hosts that want availability events or fast stream starts without holding
/// a gaze provider can park one of these. The handle may be dropped from any
/// thread; the released connection settles on the next tick.
pub struct KeepaliveHandle {
    handle: StateHandle,
}

impl KeepaliveHandle {
    pub(crate) fn new(handle: StateHandle) -> Self {
        Self { handle }
    }

    /// Releases the connection requirement. Equivalent to dropping the handle.
    pub fn release(self) {
        drop(self.handle);
    }
}
