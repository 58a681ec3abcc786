//! Per-tick gaze sample pipeline: transport drain, version-stamped frame
//! buffer, and the caches derived from it.

mod frame_buffer;
mod source;

pub(crate) use frame_buffer::FrameSampleBuffer;
pub use source::CursorRead;
pub(crate) use source::GazeSource;
