use std::cell::{Ref, RefCell};
use std::rc::Rc;

use gazelink_shared::{BufferVersion, GazeSample};

use crate::pipeline::CursorRead;
use crate::sdk::SdkCore;
use crate::state::StateHandle;

/// Consumer-facing view of the gaze sample stream.
///
/// Holding a provider keeps the connection and the gaze stream open. Reads
/// refresh the frame buffer at most once per tick, so any number of reads
/// within one tick see the same snapshot.
///
/// Dropping the provider releases the stream lazily, on the next tick.
/// [`GazeProvider::release`] does the same synchronously.
pub struct GazeProvider {
    core: Rc<RefCell<SdkCore>>,
    handle: Option<StateHandle>,
}

impl GazeProvider {
    pub(crate) fn new(core: Rc<RefCell<SdkCore>>, handle: StateHandle) -> Self {
        Self {
            core,
            handle: Some(handle),
        }
    }

    /// The freshest sample of the current tick, if the tick delivered any.
    ///
    /// Position comes from the newest sample; the event mask is the union
    /// over every sample the tick delivered, so short-lived events like
    /// blinks are not lost between reads.
    pub fn try_most_recent(&mut self) -> Option<GazeSample> {
        let mut core = self.core.borrow_mut();
        let tick = core.tick;
        core.implementation.most_recent_sample(tick)
    }

    /// All samples delivered this tick, oldest first.
    ///
    /// The returned guard borrows the SDK core; drop it before calling
    /// anything else on the SDK.
    pub fn samples_for_current_tick(&mut self) -> Ref<'_, [GazeSample]> {
        {
            let mut core = self.core.borrow_mut();
            let tick = core.tick;
            core.implementation.refresh_samples(tick);
        }
        Ref::map(self.core.borrow(), |core| {
            core.implementation.translated_samples()
        })
    }

    /// Iterates over the samples of the current tick by value.
    ///
    /// The iterator pins the buffer version it started on: if the buffer is
    /// refreshed under it on a later tick, it stops instead of serving
    /// samples from the wrong frame.
    pub fn iter(&mut self) -> GazeSamples {
        let version = {
            let mut core = self.core.borrow_mut();
            let tick = core.tick;
            core.implementation.refresh_samples(tick);
            core.implementation.buffer_version()
        };
        GazeSamples {
            core: Rc::clone(&self.core),
            version,
            index: 0,
        }
    }

    /// Releases the stream requirement immediately instead of waiting for
    /// the next tick to notice the drop.
    pub fn release(mut self) {
        if let Some(handle) = self.handle.take() {
            self.core
                .borrow_mut()
                .implementation
                .remove_consumer(handle.token());
        }
    }
}

/// By-value iterator over one tick's samples, pinned to the buffer version
/// it was created on.
pub struct GazeSamples {
    core: Rc<RefCell<SdkCore>>,
    version: BufferVersion,
    index: usize,
}

impl Iterator for GazeSamples {
    type Item = GazeSample;

    fn next(&mut self) -> Option<GazeSample> {
        let core = self.core.borrow();
        match core.implementation.cursor_read(self.version, self.index) {
            CursorRead::Sample(sample) => {
                self.index += 1;
                Some(sample)
            }
            CursorRead::End | CursorRead::Stale => None,
        }
    }
}
