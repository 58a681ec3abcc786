use bytemuck::{Pod, Zeroable};
use thiserror::Error;

/// Size in bytes of one raw gaze record on the wire.
pub const RAW_SAMPLE_BYTES: usize = std::mem::size_of::<RawGazeSample>();

/// One gaze record exactly as the service emits it: fixed-size, sequential,
/// no padding. The packed repr keeps the struct at 28 bytes; reads must go
/// through [`decode_raw_sample`], which copies out of unaligned storage.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RawGazeSample {
    /// Capture time in milliseconds since the service epoch.
    pub timestamp_ms: i64,
    /// Left eye gaze angle, horizontal, in radians.
    pub left_x: f32,
    /// Left eye gaze angle, vertical, in radians.
    pub left_y: f32,
    /// Right eye gaze angle, horizontal, in radians.
    pub right_x: f32,
    /// Right eye gaze angle, vertical, in radians.
    pub right_y: f32,
    /// Raw per-record event code, translated via [`GazeEvent::from_event_code`].
    pub event_code: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleDecodeError {
    #[error("Gaze record payload is {actual} bytes, expected {expected}")]
    WrongLength { expected: usize, actual: usize },
}

/// Reinterprets one wire payload as a raw gaze record.
///
/// The payload must be exactly [`RAW_SAMPLE_BYTES`] long; anything else is
/// a framing error on the transport.
pub fn decode_raw_sample(payload: &[u8]) -> Result<RawGazeSample, SampleDecodeError> {
    if payload.len() != RAW_SAMPLE_BYTES {
        return Err(SampleDecodeError::WrongLength {
            expected: RAW_SAMPLE_BYTES,
            actual: payload.len(),
        });
    }
    Ok(bytemuck::pod_read_unaligned(payload))
}

/// Serializes a raw gaze record into its wire form.
pub fn encode_raw_sample(sample: &RawGazeSample) -> [u8; RAW_SAMPLE_BYTES] {
    let mut bytes = [0u8; RAW_SAMPLE_BYTES];
    bytes.copy_from_slice(bytemuck::bytes_of(sample));
    bytes
}

bitflags::bitflags! {
    /// Eye tracker events carried alongside gaze coordinates.
    ///
    /// Raw records carry a single event code each; a translated sample can
    /// carry several, since aggregation over a frame ORs the codes together.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GazeEvent: u32 {
        /// No event occurred.
        const NONE = 0;
        /// Left eye is closed or blinked.
        const LEFT_EYE_BLINK_OR_CLOSED = 1 << 0;
        /// Right eye is closed or blinked.
        const RIGHT_EYE_BLINK_OR_CLOSED = 1 << 1;
        /// Both eyes are closed or blinked.
        const BOTH_EYES_BLINK_OR_CLOSED = 1 << 2;
        /// A saccade is in progress.
        const SACCADE = 1 << 3;
        /// The headset was put on.
        const HEADSET_MOUNTED = 1 << 4;
        /// The headset was taken off.
        const HEADSET_DISMOUNTED = 1 << 5;
        /// The service sent an event code this SDK does not know about.
        const UNKNOWN = 1 << 6;
    }
}

impl GazeEvent {
    /// Translates a raw wire event code into an event flag.
    ///
    /// Code `0` means no event, codes `1..=7` map onto single flags, and any
    /// code outside the known range collapses to [`GazeEvent::UNKNOWN`] so a
    /// newer service cannot crash an older SDK.
    pub fn from_event_code(code: i32) -> Self {
        match code {
            0 => Self::empty(),
            1..=7 => Self::from_bits_truncate(1 << (code - 1)),
            _ => Self::UNKNOWN,
        }
    }
}

/// A single gaze point: per-eye angles in radians, relative to straight ahead.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GazePoint {
    pub x: f32,
    pub y: f32,
}

impl GazePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A gaze record translated into host-facing form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeSample {
    /// Capture time in milliseconds since the service epoch.
    pub timestamp_ms: i64,
    /// Left eye gaze angles.
    pub left: GazePoint,
    /// Right eye gaze angles.
    pub right: GazePoint,
    /// Events attached to this sample.
    pub events: GazeEvent,
}

impl GazeSample {
    pub fn from_raw(raw: &RawGazeSample) -> Self {
        Self {
            timestamp_ms: raw.timestamp_ms,
            left: GazePoint::new(raw.left_x, raw.left_y),
            right: GazePoint::new(raw.right_x, raw.right_y),
            events: GazeEvent::from_event_code(raw.event_code),
        }
    }
}
