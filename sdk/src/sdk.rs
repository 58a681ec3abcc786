use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::warn;

use gazelink_shared::{
    Availability, ComponentVersion, Eyes, SdkComponent, SdkState, Tick,
};

use crate::calibration::CalibrationSession;
use crate::error::{CalibrationError, InitializationError, SdkError};
use crate::events::{EventBroker, ListenerId, SdkEvent};
use crate::guard::MainContextGuard;
use crate::implementation::{SdkImplementation, StubSdk};
use crate::keepalive::KeepaliveHandle;
use crate::provider::GazeProvider;

/// Version of this SDK, reported alongside the service and firmware versions.
pub fn sdk_version() -> ComponentVersion {
    ComponentVersion::new(0, 5, 4)
}

/// The implementation plus the tick counter gating the sample pipeline.
/// Shared between the facade and the providers it hands out.
pub(crate) struct SdkCore {
    pub(crate) implementation: Box<dyn SdkImplementation>,
    pub(crate) tick: Tick,
}

/// Host-facing entry point to the eye tracker.
///
/// One `Sdk` per process, owned by the main context. The host calls
/// [`Sdk::tick`] once per frame; everything else (provider reads, events,
/// dropped-handle cleanup) hangs off that cadence.
///
/// The implementation behind the facade can be swapped at runtime, for
/// example from the device-backed one to [`StubSdk`] when the headset goes
/// away; live consumers carry over.
pub struct Sdk {
    core: Rc<RefCell<SdkCore>>,
    broker: EventBroker,
    guard: MainContextGuard,
}

impl Sdk {
    /// Builds the facade around `implementation`. The calling thread becomes
    /// the SDK main context.
    pub fn new(implementation: Box<dyn SdkImplementation>) -> Self {
        Self {
            core: Rc::new(RefCell::new(SdkCore {
                implementation,
                tick: 0,
            })),
            broker: EventBroker::new(),
            guard: MainContextGuard::for_current_thread(),
        }
    }

    /// Advances the SDK by one tick.
    ///
    /// This is where dropped handles are swept, the availability mailbox is
    /// drained and pending events reach listeners. Sample reads made after
    /// this call see the new tick's snapshot.
    pub fn tick(&mut self) {
        self.guard.assert_main_context();
        let events = {
            let mut core = self.core.borrow_mut();
            core.tick = core.tick.wrapping_add(1);
            let tick = core.tick;
            core.implementation.reconcile(tick)
        };
        self.broker.dispatch(&events);
    }

    /// Opens the gaze stream and returns a provider over it.
    ///
    /// Connects first if nothing was connected yet. Each provider is an
    /// independent consumer; the stream stays open until the last one is
    /// released.
    pub fn gaze_provider(&mut self) -> Result<GazeProvider, SdkError> {
        self.guard.assert_main_context();
        let handle = self
            .core
            .borrow_mut()
            .implementation
            .register_consumer(SdkState::CONNECTED | SdkState::STREAMING_GAZE)?;
        Ok(GazeProvider::new(Rc::clone(&self.core), handle))
    }

    /// Keeps the service connection open without streaming anything.
    pub fn keep_connected(&mut self) -> Result<KeepaliveHandle, SdkError> {
        self.guard.assert_main_context();
        let handle = self
            .core
            .borrow_mut()
            .implementation
            .register_consumer(SdkState::CONNECTED)?;
        Ok(KeepaliveHandle::new(handle))
    }

    /// Starts a calibration session. Refused while another session is live.
    pub fn start_calibration(&mut self) -> Result<CalibrationSession, CalibrationError> {
        self.guard.assert_main_context();
        let grant = self.core.borrow_mut().implementation.begin_calibration()?;
        Ok(CalibrationSession::new(grant))
    }

    /// Polls eye tracker availability, connecting temporarily if needed.
    ///
    /// Connection failures fold into the result where they have a value:
    /// an unreachable service reports [`Availability::UnableToConnect`], a
    /// version-gate failure [`Availability::InvalidServiceVersion`].
    pub fn availability(&mut self) -> Result<Availability, InitializationError> {
        self.guard.assert_main_context();
        let polled = self.core.borrow_mut().implementation.availability();
        self.flush_events();
        polled
    }

    /// Like [`Sdk::availability`], but logs failures instead of returning them.
    pub fn try_availability(&mut self) -> Option<Availability> {
        match self.availability() {
            Ok(value) => Some(value),
            Err(error) => {
                warn!("Availability query failed: {error}");
                None
            }
        }
    }

    /// Versions of every reachable component.
    ///
    /// Always contains [`SdkComponent::Sdk`]; the service and firmware
    /// entries need a connection and are omitted when it cannot be made.
    pub fn versions(&mut self) -> HashMap<SdkComponent, ComponentVersion> {
        self.guard.assert_main_context();
        match self.core.borrow_mut().implementation.versions() {
            Ok(versions) => versions,
            Err(error) => {
                warn!("Component version query failed: {error}");
                let mut fallback = HashMap::new();
                fallback.insert(SdkComponent::Sdk, sdk_version());
                fallback
            }
        }
    }

    /// The eye the tracker currently considers most accurate. [`Eyes::Both`]
    /// when not connected or the tracker has no preference.
    pub fn most_accurate_eye(&mut self) -> Eyes {
        self.guard.assert_main_context();
        let eye = self.core.borrow_mut().implementation.most_accurate_eye();
        self.flush_events();
        eye
    }

    /// Registers `listener` for availability changes.
    ///
    /// The first listener bridges the SDK onto the service event channel,
    /// which connects if nothing was connected. If that fails the listener
    /// is kept anyway and still sees changes noticed by polling; the bridge
    /// is retried when listeners next go from none to some.
    pub fn on_availability_changed<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(Availability) + 'static,
    {
        self.guard.assert_main_context();
        let id = self.broker.add_availability_listener(Box::new(listener));
        if self.broker.availability_listener_count() == 1 && !self.broker.has_bridge() {
            self.connect_event_bridge();
        }
        id
    }

    /// Removes an availability listener. The service event subscription is
    /// released when the last one goes.
    pub fn remove_availability_listener(&mut self, id: ListenerId) -> bool {
        self.guard.assert_main_context();
        let removed = self.broker.remove_availability_listener(id);
        if removed && self.broker.availability_listener_count() == 0 {
            if let Some(bridge) = self.broker.take_bridge() {
                self.core
                    .borrow_mut()
                    .implementation
                    .remove_consumer(bridge.token());
            }
        }
        removed
    }

    /// Registers `listener` for changes of the most accurate eye. Derived
    /// from availability movement and polls; no extra service subscription.
    pub fn on_most_accurate_eye_changed<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(Eyes) + 'static,
    {
        self.guard.assert_main_context();
        self.broker.add_eye_listener(Box::new(listener))
    }

    /// Removes a most accurate eye listener.
    pub fn remove_most_accurate_eye_listener(&mut self, id: ListenerId) -> bool {
        self.guard.assert_main_context();
        self.broker.remove_eye_listener(id)
    }

    /// Replaces the implementation behind the facade.
    ///
    /// Live consumers move over whole: their handles stay valid and the
    /// replacement immediately drives itself to their required state. The
    /// retired implementation is torn down. If availability differs across
    /// the swap, listeners hear about it once.
    pub fn swap_implementation(&mut self, mut replacement: Box<dyn SdkImplementation>) {
        self.guard.assert_main_context();
        let change = {
            let mut core = self.core.borrow_mut();
            if core
                .implementation
                .current_state()
                .contains(SdkState::CALIBRATING)
            {
                warn!("Swapping SDK implementations while a calibration is ongoing");
            }
            let before = core.implementation.availability().ok();
            let consumers = core.implementation.drain_consumers();
            replacement.adopt_consumers(consumers);
            core.implementation.shut_down();
            core.implementation = replacement;
            let after = core.implementation.availability().ok();
            // The handover's internal events are superseded by the single
            // synthesized change below.
            let _ = core.implementation.drain_events();
            match after {
                Some(after) if before != Some(after) => Some(after),
                _ => None,
            }
        };
        if let Some(value) = change {
            self.broker.dispatch(&[SdkEvent::AvailabilityChanged(value)]);
        }
    }

    /// Capabilities currently held against the service.
    pub fn current_state(&self) -> SdkState {
        self.core.borrow().implementation.current_state()
    }

    /// The current tick number.
    pub fn current_tick(&self) -> Tick {
        self.core.borrow().tick
    }

    fn connect_event_bridge(&mut self) {
        let registered = self
            .core
            .borrow_mut()
            .implementation
            .register_consumer(SdkState::CONNECTED | SdkState::SUBSCRIBED_TO_EVENTS);
        match registered {
            Ok(handle) => self.broker.set_bridge(handle),
            Err(error) => warn!("Could not subscribe to service events: {error}"),
        }
    }

    fn flush_events(&mut self) {
        let events = self.core.borrow_mut().implementation.drain_events();
        self.broker.dispatch(&events);
    }
}

impl Default for Sdk {
    /// A facade over [`StubSdk`], for platforms without a service binding.
    fn default() -> Self {
        Self::new(Box::new(StubSdk::new()))
    }
}

impl Drop for Sdk {
    fn drop(&mut self) {
        self.core.borrow_mut().implementation.shut_down();
    }
}
