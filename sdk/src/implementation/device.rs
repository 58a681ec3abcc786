use std::collections::HashMap;
use std::sync::Arc;

use log::{error, info, warn};

use gazelink_shared::{
    Availability, AvailabilitySink, BufferVersion, CalibrationStart, ComponentVersion, EventSlot,
    Eyes, GazeSample, LinkConfig, SdkComponent, SdkState, ServiceLink, ServiceReturnCode,
    StreamStart, Tick, VersionHandshake,
};

use crate::calibration::CalibrationGrant;
use crate::error::{CalibrationError, InitializationError, InternalError, SdkError};
use crate::events::SdkEvent;
use crate::pipeline::{CursorRead, GazeSource};
use crate::sdk::sdk_version;
use crate::state::{
    ConsumerEntry, ConsumerRegistry, ConsumerToken, StateHandle, StateStep, TeardownQueue,
};

use super::SdkImplementation;

/// Oldest service protocol version this SDK can talk to.
pub fn min_service_version() -> ComponentVersion {
    ComponentVersion::new(0, 13, 0)
}

/// Newest service protocol version this SDK can talk to.
pub fn max_service_version() -> ComponentVersion {
    ComponentVersion::new(1, 0, 0)
}

fn contract_violation(violation: InternalError) -> InternalError {
    error!("SDK/service contract violation: {violation}");
    violation
}

fn as_initialization(error: SdkError) -> InitializationError {
    match error {
        SdkError::Initialization(error) => error,
        other => InitializationError::ServiceReported {
            message: other.to_string(),
        },
    }
}

/// Service-backed SDK implementation.
///
/// Owns the service link, the consumer registry and the sample pipeline.
/// All methods must run on the main context; the only cross-thread inputs
/// are tripped release flags and the availability mailbox, both drained by
/// [`DeviceSdk::reconcile`].
pub struct DeviceSdk {
    service: Box<dyn ServiceLink>,
    config: LinkConfig,
    registry: ConsumerRegistry,
    teardown: Arc<TeardownQueue>,
    current: SdkState,
    source: GazeSource,
    availability_events: AvailabilitySink,
    pending: Vec<SdkEvent>,
    last_availability: Option<Availability>,
    last_eye: Eyes,
    service_version: Option<ComponentVersion>,
    firmware_version: Option<ComponentVersion>,
}

impl DeviceSdk {
    pub fn new(service: Box<dyn ServiceLink>, config: LinkConfig) -> Self {
        Self {
            service,
            config,
            registry: ConsumerRegistry::new(),
            teardown: Arc::new(TeardownQueue::default()),
            current: SdkState::empty(),
            source: GazeSource::new(),
            availability_events: Arc::new(EventSlot::new()),
            pending: Vec::new(),
            last_availability: None,
            last_eye: Eyes::Both,
            service_version: None,
            firmware_version: None,
        }
    }

    /// Drives the service into `target`, entering and exiting capabilities in
    /// dependency order: `CONNECTED` enters first and exits last.
    ///
    /// A failed enter aborts the transition immediately. There is no
    /// rollback: capabilities entered before the failure stay up and are
    /// settled by the next requirement recomputation.
    fn drive_to(&mut self, target: SdkState) -> Result<(), SdkError> {
        if target == self.current {
            return Ok(());
        }
        info!("Driving SDK state {} -> {}", self.current, target);
        let connected_step = StateStep::between(SdkState::CONNECTED, self.current, target);
        if connected_step == Some(StateStep::Enter) {
            self.enter_connected()?;
        }
        match StateStep::between(SdkState::STREAMING_GAZE, self.current, target) {
            Some(StateStep::Enter) => self.enter_streaming()?,
            Some(StateStep::Exit) => self.exit_streaming(),
            None => {}
        }
        match StateStep::between(SdkState::SUBSCRIBED_TO_EVENTS, self.current, target) {
            Some(StateStep::Enter) => self.enter_subscribed()?,
            Some(StateStep::Exit) => self.exit_subscribed(),
            None => {}
        }
        // Calibration has no service primitive of its own; the per-session
        // channel covers that. The flag is pure bookkeeping.
        match StateStep::between(SdkState::CALIBRATING, self.current, target) {
            Some(StateStep::Enter) => self.current |= SdkState::CALIBRATING,
            Some(StateStep::Exit) => self.current -= SdkState::CALIBRATING,
            None => {}
        }
        if connected_step == Some(StateStep::Exit) {
            self.exit_connected();
        }
        Ok(())
    }

    /// Exit-only transitions never hard-fail; enters attempted while
    /// adopting consumers can, and are logged rather than propagated.
    fn drive_best_effort(&mut self, target: SdkState) {
        if let Err(error) = self.drive_to(target) {
            warn!("Best-effort transition to {target} did not complete: {error}");
        }
    }

    fn require_state(&mut self, required: SdkState) -> Result<StateHandle, SdkError> {
        let target = self.registry.required_union() | required;
        if target != self.current {
            self.drive_to(target)?;
        }
        let (token, flag) = self.registry.insert(required);
        Ok(StateHandle::new(token, flag, Arc::clone(&self.teardown)))
    }

    fn enter_connected(&mut self) -> Result<(), SdkError> {
        let code = self
            .service
            .connect(self.config.connect_timeout)
            .map_err(InitializationError::from)?;
        match code {
            ServiceReturnCode::Successful | ServiceReturnCode::AlreadyConnected => {}
            ServiceReturnCode::FailedToBindToService => {
                return Err(InitializationError::UnableToConnect.into());
            }
            ServiceReturnCode::InitializationTimeout => {
                return Err(InitializationError::Timeout.into());
            }
            ServiceReturnCode::UnknownErrorCheckErrorMessage => {
                let message = self.service.last_error_message();
                return Err(InitializationError::ServiceReported { message }.into());
            }
            code => {
                return Err(InitializationError::UnexpectedCode { code }.into());
            }
        }
        // The socket is open from here on, even if the version gate below
        // rejects the service; the connection still counts as entered.
        self.current |= SdkState::CONNECTED;

        let service_version = self.refresh_versions()?;
        let minimum = min_service_version();
        if service_version < minimum {
            return Err(InitializationError::ServiceVersionTooLow {
                actual: service_version,
                minimum,
            }
            .into());
        }
        let maximum = max_service_version();
        if service_version > maximum {
            return Err(InitializationError::ServiceVersionTooHigh {
                actual: service_version,
                maximum,
            }
            .into());
        }
        Ok(())
    }

    fn exit_connected(&mut self) {
        match self.service.disconnect() {
            Ok(ServiceReturnCode::Successful) => {}
            Ok(code) => warn!("Disconnecting from the service returned {code:?}"),
            Err(link_error) => warn!("Disconnecting from the service failed: {link_error}"),
        }
        self.current -= SdkState::CONNECTED;
        self.service_version = None;
        self.firmware_version = None;
    }

    fn enter_streaming(&mut self) -> Result<(), SdkError> {
        match self.service.start_gaze_stream().map_err(InternalError::from)? {
            StreamStart::Started(transport) => {
                self.source.attach_transport(transport);
                self.current |= SdkState::STREAMING_GAZE;
                Ok(())
            }
            StreamStart::Refused(code) => Err(contract_violation(
                InternalError::UnexpectedReturnCode {
                    call: "start_gaze_stream",
                    code,
                },
            )
            .into()),
        }
    }

    fn exit_streaming(&mut self) {
        self.source.detach_transport();
        match self.service.stop_gaze_stream() {
            Ok(ServiceReturnCode::Successful) => {}
            Ok(code) => warn!("Stopping the gaze stream returned {code:?}"),
            Err(link_error) => warn!("Stopping the gaze stream failed: {link_error}"),
        }
        self.current -= SdkState::STREAMING_GAZE;
    }

    fn enter_subscribed(&mut self) -> Result<(), SdkError> {
        let sink = Arc::clone(&self.availability_events);
        let code = self
            .service
            .subscribe_events(sink)
            .map_err(InternalError::from)?;
        match code {
            ServiceReturnCode::Successful | ServiceReturnCode::AlreadySubscribedToEvents => {
                self.current |= SdkState::SUBSCRIBED_TO_EVENTS;
                Ok(())
            }
            ServiceReturnCode::UnknownErrorCheckErrorMessage => {
                let message = self.service.last_error_message();
                Err(contract_violation(InternalError::ServiceReported { message }).into())
            }
            code => Err(contract_violation(InternalError::UnexpectedReturnCode {
                call: "subscribe_events",
                code,
            })
            .into()),
        }
    }

    fn exit_subscribed(&mut self) {
        match self.service.unsubscribe_events() {
            Ok(ServiceReturnCode::Successful) => {}
            Ok(code) => warn!("Unsubscribing from service events returned {code:?}"),
            Err(link_error) => warn!("Unsubscribing from service events failed: {link_error}"),
        }
        self.current -= SdkState::SUBSCRIBED_TO_EVENTS;
    }

    /// Runs the version handshake and caches the results.
    fn refresh_versions(&mut self) -> Result<ComponentVersion, InternalError> {
        let payload = self.service.version_handshake()?;
        let handshake = VersionHandshake::parse(&payload).map_err(|parse_error| {
            contract_violation(InternalError::Handshake(parse_error))
        })?;
        self.service_version = Some(handshake.service.clone());
        self.firmware_version = handshake.firmware;
        Ok(handshake.service)
    }

    fn note_availability(&mut self, value: Availability) {
        if self.last_availability == Some(value) {
            return;
        }
        self.last_availability = Some(value);
        self.pending.push(SdkEvent::AvailabilityChanged(value));
        // Availability movement is when the dominant eye tends to change.
        self.poll_most_accurate_eye();
    }

    fn poll_most_accurate_eye(&mut self) {
        if !self.current.contains(SdkState::CONNECTED) {
            return;
        }
        match self.service.most_accurate_eye() {
            Ok(eye) => {
                if eye != self.last_eye {
                    self.last_eye = eye;
                    self.pending.push(SdkEvent::MostAccurateEyeChanged(eye));
                }
            }
            Err(link_error) => warn!("Could not poll the most accurate eye: {link_error}"),
        }
    }

    fn settle_to_requirements(&mut self) {
        let union = self.registry.required_union();
        if union != self.current {
            self.drive_best_effort(union);
        }
    }
}

impl SdkImplementation for DeviceSdk {
    fn current_state(&self) -> SdkState {
        self.current
    }

    fn register_consumer(&mut self, required: SdkState) -> Result<StateHandle, SdkError> {
        self.require_state(required)
    }

    fn remove_consumer(&mut self, token: ConsumerToken) {
        if !self.registry.remove(token) {
            // Stale token: the handle crossed an implementation swap or was
            // already swept. Its release flag covers the rest.
            return;
        }
        self.settle_to_requirements();
    }

    fn reconcile(&mut self, _tick: Tick) -> Vec<SdkEvent> {
        // Handles that crossed an implementation swap request teardown on the
        // retired implementation's queue; the flag scan catches those.
        if self.teardown.take() || self.registry.has_released() {
            self.settle_to_requirements();
        }
        if let Some(value) = self.availability_events.take() {
            self.note_availability(value);
        }
        self.drain_events()
    }

    fn drain_events(&mut self) -> Vec<SdkEvent> {
        std::mem::take(&mut self.pending)
    }

    fn drain_consumers(&mut self) -> Vec<ConsumerEntry> {
        self.registry.drain_live()
    }

    fn adopt_consumers(&mut self, consumers: Vec<ConsumerEntry>) {
        for entry in consumers {
            self.registry.insert_entry(entry);
        }
        self.settle_to_requirements();
    }

    fn shut_down(&mut self) {
        self.drive_best_effort(SdkState::empty());
    }

    fn availability(&mut self) -> Result<Availability, InitializationError> {
        let needed_connect = !self.current.contains(SdkState::CONNECTED);
        let polled = if needed_connect {
            match self.drive_to(self.current | SdkState::CONNECTED) {
                Ok(()) => self
                    .service
                    .availability()
                    .map_err(InitializationError::from),
                Err(SdkError::Initialization(InitializationError::UnableToConnect))
                | Err(SdkError::Initialization(InitializationError::Timeout)) => {
                    Ok(Availability::UnableToConnect)
                }
                Err(SdkError::Initialization(InitializationError::ServiceVersionTooLow {
                    ..
                }))
                | Err(SdkError::Initialization(InitializationError::ServiceVersionTooHigh {
                    ..
                })) => Ok(Availability::InvalidServiceVersion),
                Err(error) => Err(as_initialization(error)),
            }
        } else {
            self.service
                .availability()
                .map_err(InitializationError::from)
        };
        if needed_connect {
            self.settle_to_requirements();
        }
        let value = polled?;
        self.note_availability(value);
        Ok(value)
    }

    fn versions(&mut self) -> Result<HashMap<SdkComponent, ComponentVersion>, InitializationError> {
        let mut versions = HashMap::new();
        versions.insert(SdkComponent::Sdk, sdk_version());
        let needed_connect = !self.current.contains(SdkState::CONNECTED);
        if needed_connect {
            if let Err(error) = self.drive_to(self.current | SdkState::CONNECTED) {
                self.settle_to_requirements();
                return Err(as_initialization(error));
            }
        }
        if let Some(service) = self.service_version.clone() {
            versions.insert(SdkComponent::Service, service);
        }
        if let Some(firmware) = self.firmware_version.clone() {
            versions.insert(SdkComponent::Firmware, firmware);
        }
        if needed_connect {
            self.settle_to_requirements();
        }
        Ok(versions)
    }

    fn most_accurate_eye(&mut self) -> Eyes {
        self.poll_most_accurate_eye();
        self.last_eye
    }

    fn begin_calibration(&mut self) -> Result<CalibrationGrant, CalibrationError> {
        if self.current.contains(SdkState::CALIBRATING) {
            return Err(CalibrationError::AlreadyOngoing);
        }
        let handle = self
            .require_state(SdkState::CONNECTED | SdkState::CALIBRATING)
            .map_err(CalibrationError::from)?;
        match self.service.begin_calibration() {
            Ok(CalibrationStart::Started(channel)) => Ok(CalibrationGrant::new(channel, handle)),
            Ok(CalibrationStart::Refused(code)) => {
                self.remove_consumer(handle.token());
                drop(handle);
                if code == ServiceReturnCode::AnotherCalibrationOngoing {
                    Err(CalibrationError::AlreadyOngoing)
                } else {
                    Err(CalibrationError::Refused { code })
                }
            }
            Err(link_error) => {
                self.remove_consumer(handle.token());
                drop(handle);
                Err(CalibrationError::Link(link_error))
            }
        }
    }

    fn refresh_samples(&mut self, tick: Tick) {
        self.source.refresh(tick);
    }

    fn most_recent_sample(&mut self, tick: Tick) -> Option<GazeSample> {
        self.source.most_recent(tick)
    }

    fn translated_samples(&self) -> &[GazeSample] {
        self.source.translated()
    }

    fn buffer_version(&self) -> BufferVersion {
        self.source.version()
    }

    fn cursor_read(&self, version: BufferVersion, index: usize) -> CursorRead {
        self.source.sample_at(version, index)
    }
}
