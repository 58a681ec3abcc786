use std::time::Duration;

/// Parameters for establishing the service binding.
#[derive(Clone, Debug)]
pub struct LinkConfig {
    /// The maximum time a connect call may block while the service spins up.
    /// Every other service call is expected to return promptly and is not
    /// bounded by this value.
    pub connect_timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(2000),
        }
    }
}
