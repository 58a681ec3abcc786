use std::fmt;

bitflags::bitflags! {
    /// Capability bitmap describing what the SDK currently holds open against
    /// the eye tracker service.
    ///
    /// The empty set is the fully torn down state. Every other capability
    /// requires [`SdkState::CONNECTED`], which is entered first and exited
    /// last whenever a transition touches it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SdkState: u32 {
        /// A live binding to the platform service.
        const CONNECTED = 1 << 0;
        /// A calibration session is ongoing.
        const CALIBRATING = 1 << 1;
        /// The gaze sample stream is open.
        const STREAMING_GAZE = 1 << 2;
        /// The service event subscription is active.
        const SUBSCRIBED_TO_EVENTS = 1 << 3;
    }
}

impl SdkState {
    /// True when no capability is held and the service binding is fully torn down.
    pub fn is_uninitialized(&self) -> bool {
        self.is_empty()
    }
}

impl fmt::Display for SdkState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "Uninitialized");
        }
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                write!(f, " | ")?;
            }
            write!(f, "{name}")?;
            first = false;
        }
        Ok(())
    }
}
