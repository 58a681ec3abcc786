use thiserror::Error;

use gazelink_shared::{
    CalibrationState, ComponentVersion, HandshakeError, ServiceCallError, ServiceReturnCode,
};

/// Errors raised while establishing or upgrading the service connection.
///
/// Callers can recover from these: retry later, fall back to a stub
/// implementation, or surface "eye tracking unavailable" to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitializationError {
    /// The service is not installed or refused the binding.
    #[error("Unable to connect to the eye tracker service")]
    UnableToConnect,

    /// The service did not come up within the configured connect timeout.
    #[error("Timed out while connecting to the eye tracker service")]
    Timeout,

    /// The connected service speaks an older protocol than this SDK supports.
    #[error("Service version {actual} is older than the minimum supported {minimum}")]
    ServiceVersionTooLow {
        actual: ComponentVersion,
        minimum: ComponentVersion,
    },

    /// The connected service speaks a newer protocol than this SDK supports.
    #[error("Service version {actual} is newer than the maximum supported {maximum}")]
    ServiceVersionTooHigh {
        actual: ComponentVersion,
        maximum: ComponentVersion,
    },

    /// The service asked us to fetch and report its own error description.
    #[error("Eye tracker service reported: {message}")]
    ServiceReported { message: String },

    /// The connect call answered with a code that has no meaning there.
    #[error("Connection attempt failed with return code {code:?}")]
    UnexpectedCode { code: ServiceReturnCode },

    /// This implementation does not manage service state at all.
    #[error("State management is not available on this implementation")]
    NotSupported,

    /// The service binding itself broke before producing a return code.
    #[error("Service link error: {0}")]
    Link(#[from] ServiceCallError),
}

/// Contract violations between the SDK and the service.
///
/// These indicate a bug on one side or the other and are logged loudly at the
/// point of detection; callers are not expected to recover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    /// A service call answered with a code that has no meaning for that call.
    #[error("Unexpected return code {code:?} from service call {call}")]
    UnexpectedReturnCode {
        call: &'static str,
        code: ServiceReturnCode,
    },

    /// The service reported an error message where success was the contract.
    #[error("Eye tracker service reported: {message}")]
    ServiceReported { message: String },

    /// The version handshake payload could not be understood.
    #[error("Malformed version handshake: {0}")]
    Handshake(#[from] HandshakeError),

    /// The service binding itself broke before producing a return code.
    #[error("Service link error: {0}")]
    Link(#[from] ServiceCallError),
}

/// Errors raised by calibration sessions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalibrationError {
    /// Another calibration session is already live.
    #[error("Another calibration is already ongoing")]
    AlreadyOngoing,

    /// This implementation cannot run calibrations.
    #[error("Calibration is not available on this implementation")]
    NotSupported,

    /// The service declined a calibration call with the given code.
    #[error("Calibration call refused with return code {code:?}")]
    Refused { code: ServiceReturnCode },

    /// A point was marked as displayed before readiness was reported.
    #[error("Ready to display points was not reported before marking a point")]
    ReadyNotReported,

    /// Point marks may not outpace the service-driven point index.
    #[error("Marked {marks} point displays but the service point index is {index}")]
    MarkOutpacedPointIndex { marks: u32, index: u32 },

    /// The session already reached a terminal state.
    #[error("Calibration session already finished: {state:?}")]
    SessionFinished { state: CalibrationState },

    /// Connecting to the service for the session failed.
    #[error("Initialization error: {0}")]
    Initialization(#[from] InitializationError),

    /// The SDK/service contract broke while starting the session.
    #[error("Internal error: {0}")]
    Internal(#[from] InternalError),

    /// The service binding itself broke before producing a return code.
    #[error("Service link error: {0}")]
    Link(#[from] ServiceCallError),
}

/// Umbrella error for SDK operations that can fail in more than one domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    #[error("Initialization error: {0}")]
    Initialization(#[from] InitializationError),

    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    #[error("Internal error: {0}")]
    Internal(#[from] InternalError),
}

impl From<SdkError> for CalibrationError {
    fn from(error: SdkError) -> Self {
        match error {
            SdkError::Initialization(error) => Self::Initialization(error),
            SdkError::Internal(error) => Self::Internal(error),
            SdkError::Calibration(error) => error,
        }
    }
}
