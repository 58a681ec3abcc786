//! The implementation seam: one trait the SDK facade drives, with a
//! service-backed implementation for devices that have an eye tracker and a
//! stub for platforms that do not.

mod device;
mod stub;

use std::collections::HashMap;

use gazelink_shared::{
    Availability, BufferVersion, ComponentVersion, Eyes, GazeSample, SdkComponent, SdkState, Tick,
};

use crate::calibration::CalibrationGrant;
use crate::error::{CalibrationError, InitializationError, SdkError};
use crate::events::SdkEvent;
use crate::pipeline::CursorRead;
use crate::state::{ConsumerEntry, ConsumerToken, StateHandle};

pub use device::{max_service_version, min_service_version, DeviceSdk};
pub use stub::StubSdk;

/// One concrete SDK backend.
///
/// The facade holds exactly one implementation at a time and may swap it at
/// runtime; consumer entries drained from the old implementation are adopted
/// by the new one so live handles keep meaning something.
pub trait SdkImplementation {
    /// Capabilities currently held against the service.
    fn current_state(&self) -> SdkState;

    /// Registers a consumer requiring `required`, driving the service into
    /// the union of all live requirements first. On failure nothing is
    /// registered; capabilities entered before the failing step stay up
    /// until the next reconciliation.
    fn register_consumer(&mut self, required: SdkState) -> Result<StateHandle, SdkError>;

    /// Synchronously removes a consumer and settles the service state down.
    /// Stale tokens (for instance, handles that crossed an implementation
    /// swap) miss harmlessly; the release flag sweep covers those.
    fn remove_consumer(&mut self, token: ConsumerToken);

    /// Once-per-tick housekeeping: sweep dropped consumers, settle state,
    /// drain background events. Returns notifications to deliver.
    fn reconcile(&mut self, tick: Tick) -> Vec<SdkEvent>;

    /// Takes whatever notifications accumulated since the last drain.
    fn drain_events(&mut self) -> Vec<SdkEvent>;

    /// Empties the consumer registry for an implementation swap.
    fn drain_consumers(&mut self) -> Vec<ConsumerEntry>;

    /// Adopts consumers drained from another implementation, driving the
    /// service toward their union. Per-consumer failures are logged, not
    /// returned; the entries stay registered either way.
    fn adopt_consumers(&mut self, consumers: Vec<ConsumerEntry>);

    /// Tears everything down ahead of dropping the implementation.
    fn shut_down(&mut self);

    /// Polls availability, connecting temporarily when necessary.
    fn availability(&mut self) -> Result<Availability, InitializationError>;

    /// Component versions for everything reachable right now.
    fn versions(&mut self) -> Result<HashMap<SdkComponent, ComponentVersion>, InitializationError>;

    /// The eye the tracker currently considers most accurate.
    fn most_accurate_eye(&mut self) -> Eyes;

    /// Starts a calibration, yielding the session channel and its state
    /// registration.
    fn begin_calibration(&mut self) -> Result<CalibrationGrant, CalibrationError>;

    /// Pulls this tick's gaze records in. Idempotent per tick.
    fn refresh_samples(&mut self, tick: Tick);

    /// The freshest sample this tick, events aggregated across the frame.
    fn most_recent_sample(&mut self, tick: Tick) -> Option<GazeSample>;

    /// This tick's translated records. Callers refresh first.
    fn translated_samples(&self) -> &[GazeSample];

    /// Version stamp of the current sample buffer.
    fn buffer_version(&self) -> BufferVersion;

    /// Version-checked random access for detached cursors.
    fn cursor_read(&self, version: BufferVersion, index: usize) -> CursorRead;
}
