use std::sync::atomic::{AtomicU32, Ordering};

use log::warn;

use gazelink_shared::{decode_raw_sample, BufferVersion, RawGazeSample, SampleTransport, Tick};

/// Matches the service-side burst size, so a typical tick refills without
/// reallocating.
const INITIAL_SAMPLE_CAPACITY: usize = 50;

// Each buffer counts versions within its own epoch; a cursor pinned on a
// retired buffer can never match a replacement's counter.
static NEXT_BUFFER_EPOCH: AtomicU32 = AtomicU32::new(0);

/// Accumulates every raw record the transport had ready, at most once per
/// tick.
///
/// Each refresh clears the previous tick's records and stamps a new buffer
/// version; readers compare versions instead of holding borrows across
/// ticks. Storage only ever grows.
pub(crate) struct FrameSampleBuffer {
    samples: Vec<RawGazeSample>,
    version: BufferVersion,
    refreshed_at: Option<Tick>,
}

impl FrameSampleBuffer {
    pub fn new() -> Self {
        let epoch = NEXT_BUFFER_EPOCH.fetch_add(1, Ordering::Relaxed);
        Self {
            samples: Vec::with_capacity(INITIAL_SAMPLE_CAPACITY),
            version: (epoch as BufferVersion) << 32,
            refreshed_at: None,
        }
    }

    pub fn version(&self) -> BufferVersion {
        self.version
    }

    pub fn samples(&self) -> &[RawGazeSample] {
        &self.samples
    }

    /// Drains `transport` to exhaustion into the buffer. Idempotent within a
    /// tick: the second and later calls at the same tick do nothing, so every
    /// reader in one tick sees one consistent snapshot.
    ///
    /// A transport error or a malformed record ends the drain early and
    /// counts as "no more data this tick"; the next tick starts fresh.
    pub fn refresh(&mut self, tick: Tick, transport: Option<&mut (dyn SampleTransport + 'static)>) {
        if self.refreshed_at == Some(tick) {
            return;
        }
        self.samples.clear();
        if let Some(transport) = transport {
            loop {
                match transport.receive() {
                    Ok(Some(payload)) => match decode_raw_sample(payload) {
                        Ok(sample) => self.samples.push(sample),
                        Err(error) => {
                            warn!("Discarding gaze payload: {error}");
                            break;
                        }
                    },
                    Ok(None) => break,
                    Err(error) => {
                        warn!("Gaze transport read failed: {error}");
                        break;
                    }
                }
            }
        }
        self.version = self.version.wrapping_add(1);
        self.refreshed_at = Some(tick);
    }

    /// Wipes buffered records and invalidates outstanding readers. Used when
    /// the stream capability goes away mid-tick.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.version = self.version.wrapping_add(1);
        self.refreshed_at = None;
    }
}
