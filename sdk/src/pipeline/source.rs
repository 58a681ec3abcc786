use gazelink_shared::{
    BufferVersion, GazeEvent, GazeSample, RawGazeSample, SampleTransport, Tick,
};

use super::frame_buffer::FrameSampleBuffer;

/// Result of reading one position of a versioned sample cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorRead {
    /// The sample at the requested position.
    Sample(GazeSample),
    /// The cursor ran past the end of the current buffer.
    End,
    /// The buffer moved on since the cursor was created; the cursor fails
    /// closed rather than returning another tick's data.
    Stale,
}

/// The gaze data source for one implementation: the transport feeding the
/// frame buffer, plus the caches derived from it.
///
/// Both caches are keyed by the buffer version. As long as the buffer has
/// not moved, repeated reads cost nothing and agree with each other.
pub(crate) struct GazeSource {
    transport: Option<Box<dyn SampleTransport>>,
    buffer: FrameSampleBuffer,
    most_recent: Option<(BufferVersion, Option<GazeSample>)>,
    translated: Vec<GazeSample>,
    translated_version: Option<BufferVersion>,
}

impl GazeSource {
    pub fn new() -> Self {
        Self {
            transport: None,
            buffer: FrameSampleBuffer::new(),
            most_recent: None,
            translated: Vec::new(),
            translated_version: None,
        }
    }

    pub fn attach_transport(&mut self, transport: Box<dyn SampleTransport>) {
        self.transport = Some(transport);
    }

    /// Drops the transport and invalidates all outstanding readers.
    pub fn detach_transport(&mut self) {
        self.transport = None;
        self.buffer.reset();
    }

    /// Pulls this tick's records in (idempotent per tick) and recomputes the
    /// translated cache if the buffer moved.
    pub fn refresh(&mut self, tick: Tick) {
        self.buffer.refresh(tick, self.transport.as_deref_mut());
        let version = self.buffer.version();
        if self.translated_version != Some(version) {
            self.translated.clear();
            self.translated
                .extend(self.buffer.samples().iter().map(GazeSample::from_raw));
            self.translated_version = Some(version);
        }
    }

    pub fn version(&self) -> BufferVersion {
        self.buffer.version()
    }

    /// This tick's records in host-facing form. Valid for the version last
    /// refreshed.
    pub fn translated(&self) -> &[GazeSample] {
        &self.translated
    }

    /// The freshest sample of the current buffer, with events aggregated
    /// across the whole tick.
    ///
    /// Position and timestamp come from the last record; the event set is
    /// the union over every record, so a one-record blink in the middle of a
    /// busy tick is not lost. Returns `None` on an empty buffer, which is
    /// distinct from a zero-valued sample.
    pub fn most_recent(&mut self, tick: Tick) -> Option<GazeSample> {
        self.refresh(tick);
        let version = self.buffer.version();
        if let Some((cached_version, cached)) = &self.most_recent {
            if *cached_version == version {
                return *cached;
            }
        }
        let computed = aggregate_frame(self.buffer.samples());
        self.most_recent = Some((version, computed));
        computed
    }

    /// Version-checked random access for detached cursors.
    pub fn sample_at(&self, version: BufferVersion, index: usize) -> CursorRead {
        if version != self.buffer.version() {
            return CursorRead::Stale;
        }
        match self.translated.get(index) {
            Some(sample) => CursorRead::Sample(*sample),
            None => CursorRead::End,
        }
    }
}

fn aggregate_frame(samples: &[RawGazeSample]) -> Option<GazeSample> {
    let last = samples.last()?;
    let mut sample = GazeSample::from_raw(last);
    let mut events = GazeEvent::empty();
    for raw in samples {
        events |= GazeEvent::from_event_code(raw.event_code);
    }
    sample.events = events;
    Some(sample)
}
