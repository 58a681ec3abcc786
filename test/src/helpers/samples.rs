use gazelink_shared::{encode_raw_sample, RawGazeSample};

/// Wire bytes for one gaze record.
pub fn raw_sample_bytes(
    timestamp_ms: i64,
    left: (f32, f32),
    right: (f32, f32),
    event_code: i32,
) -> Vec<u8> {
    encode_raw_sample(&RawGazeSample {
        timestamp_ms,
        left_x: left.0,
        left_y: left.1,
        right_x: right.0,
        right_y: right.1,
        event_code,
    })
    .to_vec()
}

/// An eventless record with a position derived from the timestamp, so
/// successive samples are distinguishable.
pub fn plain_sample(timestamp_ms: i64) -> Vec<u8> {
    let offset = timestamp_ms as f32 / 1000.0;
    raw_sample_bytes(
        timestamp_ms,
        (offset, -offset),
        (offset + 0.5, -offset - 0.5),
        0,
    )
}

/// A record carrying `event_code` at a neutral position.
pub fn event_sample(timestamp_ms: i64, event_code: i32) -> Vec<u8> {
    raw_sample_bytes(timestamp_ms, (0.0, 0.0), (0.0, 0.0), event_code)
}
