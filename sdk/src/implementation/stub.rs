use std::collections::HashMap;
use std::sync::Arc;

use gazelink_shared::{
    Availability, BufferVersion, ComponentVersion, Eyes, GazeSample, SdkComponent, SdkState, Tick,
};

use crate::calibration::CalibrationGrant;
use crate::error::{CalibrationError, InitializationError, SdkError};
use crate::events::SdkEvent;
use crate::pipeline::CursorRead;
use crate::sdk::sdk_version;
use crate::state::{ConsumerEntry, ConsumerRegistry, ConsumerToken, StateHandle, TeardownQueue};

use super::SdkImplementation;

/// Inert SDK implementation for platforms without a service binding.
///
/// Every resource factory fails with [`InitializationError::NotSupported`],
/// availability is always [`Availability::Unknown`] and versions report the
/// SDK alone. Consumers adopted across a swap are retained so that swapping
/// back to a device implementation re-establishes them.
#[derive(Default)]
pub struct StubSdk {
    registry: ConsumerRegistry,
    teardown: Arc<TeardownQueue>,
}

impl StubSdk {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SdkImplementation for StubSdk {
    fn current_state(&self) -> SdkState {
        SdkState::empty()
    }

    fn register_consumer(&mut self, _required: SdkState) -> Result<StateHandle, SdkError> {
        Err(InitializationError::NotSupported.into())
    }

    fn remove_consumer(&mut self, token: ConsumerToken) {
        self.registry.remove(token);
    }

    fn reconcile(&mut self, _tick: Tick) -> Vec<SdkEvent> {
        if self.teardown.take() || self.registry.has_released() {
            // Dropped handles only need their registry slots reclaimed;
            // there is no service state to settle.
            let _ = self.registry.required_union();
        }
        Vec::new()
    }

    fn drain_events(&mut self) -> Vec<SdkEvent> {
        Vec::new()
    }

    fn drain_consumers(&mut self) -> Vec<ConsumerEntry> {
        self.registry.drain_live()
    }

    fn adopt_consumers(&mut self, consumers: Vec<ConsumerEntry>) {
        for entry in consumers {
            self.registry.insert_entry(entry);
        }
    }

    fn shut_down(&mut self) {}

    fn availability(&mut self) -> Result<Availability, InitializationError> {
        Ok(Availability::Unknown)
    }

    fn versions(&mut self) -> Result<HashMap<SdkComponent, ComponentVersion>, InitializationError> {
        let mut versions = HashMap::new();
        versions.insert(SdkComponent::Sdk, sdk_version());
        Ok(versions)
    }

    fn most_accurate_eye(&mut self) -> Eyes {
        Eyes::Both
    }

    fn begin_calibration(&mut self) -> Result<CalibrationGrant, CalibrationError> {
        Err(CalibrationError::NotSupported)
    }

    fn refresh_samples(&mut self, _tick: Tick) {}

    fn most_recent_sample(&mut self, _tick: Tick) -> Option<GazeSample> {
        None
    }

    fn translated_samples(&self) -> &[GazeSample] {
        &[]
    }

    fn buffer_version(&self) -> BufferVersion {
        0
    }

    fn cursor_read(&self, _version: BufferVersion, _index: usize) -> CursorRead {
        CursorRead::End
    }
}
