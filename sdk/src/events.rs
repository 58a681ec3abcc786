use gazelink_shared::{Availability, Eyes};

use crate::state::StateHandle;

/// Identifies one registered listener.
pub type ListenerId = u32;

/// Change notification produced by an implementation and delivered on the
/// main tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkEvent {
    AvailabilityChanged(Availability),
    MostAccurateEyeChanged(Eyes),
}

/// Listener registry plus the bridge registration that keeps the service
/// event subscription alive while anyone is listening for availability.
///
/// The bridge is itself an ordinary consumer requiring
/// `CONNECTED | SUBSCRIBED_TO_EVENTS`; it exists exactly while the
/// availability listener count is non-zero.
pub(crate) struct EventBroker {
    next_listener: ListenerId,
    availability_listeners: Vec<(ListenerId, Box<dyn FnMut(Availability)>)>,
    eye_listeners: Vec<(ListenerId, Box<dyn FnMut(Eyes)>)>,
    bridge: Option<StateHandle>,
}

impl EventBroker {
    pub fn new() -> Self {
        Self {
            next_listener: 0,
            availability_listeners: Vec::new(),
            eye_listeners: Vec::new(),
            bridge: None,
        }
    }

    pub fn add_availability_listener(
        &mut self,
        listener: Box<dyn FnMut(Availability)>,
    ) -> ListenerId {
        let id = self.next_id();
        self.availability_listeners.push((id, listener));
        id
    }

    pub fn remove_availability_listener(&mut self, id: ListenerId) -> bool {
        let before = self.availability_listeners.len();
        self.availability_listeners.retain(|(entry, _)| *entry != id);
        self.availability_listeners.len() != before
    }

    pub fn availability_listener_count(&self) -> usize {
        self.availability_listeners.len()
    }

    pub fn add_eye_listener(&mut self, listener: Box<dyn FnMut(Eyes)>) -> ListenerId {
        let id = self.next_id();
        self.eye_listeners.push((id, listener));
        id
    }

    pub fn remove_eye_listener(&mut self, id: ListenerId) -> bool {
        let before = self.eye_listeners.len();
        self.eye_listeners.retain(|(entry, _)| *entry != id);
        self.eye_listeners.len() != before
    }

    pub fn set_bridge(&mut self, handle: StateHandle) {
        self.bridge = Some(handle);
    }

    pub fn take_bridge(&mut self) -> Option<StateHandle> {
        self.bridge.take()
    }

    pub fn has_bridge(&self) -> bool {
        self.bridge.is_some()
    }

    /// Fans events out to listeners. Called with no implementation borrow
    /// held, so listeners are free to call back into the SDK.
    pub fn dispatch(&mut self, events: &[SdkEvent]) {
        for event in events {
            match event {
                SdkEvent::AvailabilityChanged(value) => {
                    for (_, listener) in &mut self.availability_listeners {
                        listener(*value);
                    }
                }
                SdkEvent::MostAccurateEyeChanged(eye) => {
                    for (_, listener) in &mut self.eye_listeners {
                        listener(*eye);
                    }
                }
            }
        }
    }

    fn next_id(&mut self) -> ListenerId {
        let id = self.next_listener;
        self.next_listener = self.next_listener.wrapping_add(1);
        id
    }
}
