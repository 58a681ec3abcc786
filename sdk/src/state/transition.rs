use gazelink_shared::SdkState;

/// Direction of a single capability change within a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateStep {
    Enter,
    Exit,
}

impl StateStep {
    /// The step needed to take `flag` from `current` to `target`, if any.
    pub fn between(flag: SdkState, current: SdkState, target: SdkState) -> Option<StateStep> {
        match (current.contains(flag), target.contains(flag)) {
            (false, true) => Some(StateStep::Enter),
            (true, false) => Some(StateStep::Exit),
            _ => None,
        }
    }
}
