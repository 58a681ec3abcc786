use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to receive from the gaze sample transport")]
pub struct RecvError;

/// Non-blocking source of raw gaze record payloads.
///
/// A transport is owned by exactly one frame buffer and polled to exhaustion
/// once per tick. `receive` must never block: it returns `Ok(None)` when no
/// payload is ready right now.
pub trait SampleTransport {
    /// Returns the next ready payload, if any. The returned slice is valid
    /// until the next call to `receive`.
    fn receive(&mut self) -> Result<Option<&[u8]>, RecvError>;
}
