use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::availability::Availability;
use crate::eyes::Eyes;
use crate::mailbox::EventSlot;
use crate::sample::GazePoint;
use crate::transport::SampleTransport;
use crate::types::PointIndex;

/// Return codes shared by every service entry point.
///
/// The numeric values are part of the service protocol. A value this SDK does
/// not know becomes [`ServiceReturnCode::Unexpected`] rather than a panic, so
/// a newer service can keep talking to an older SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceReturnCode {
    Successful,
    UnknownErrorCheckErrorMessage,
    NotConnected,
    UnknownError,
    AlreadyConnected,
    FailedToBindToService,
    InitializationTimeout,
    AnotherCalibrationOngoing,
    NoCalibrationOngoing,
    CalibrationTimeout,
    NoValidGazeAvailable,
    AlreadySubscribedToEvents,
    Unexpected(i32),
}

impl ServiceReturnCode {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Successful,
            1 => Self::UnknownErrorCheckErrorMessage,
            2 => Self::NotConnected,
            3 => Self::UnknownError,
            10 => Self::AlreadyConnected,
            11 => Self::FailedToBindToService,
            12 => Self::InitializationTimeout,
            20 => Self::AnotherCalibrationOngoing,
            21 => Self::NoCalibrationOngoing,
            22 => Self::CalibrationTimeout,
            30 => Self::NoValidGazeAvailable,
            40 => Self::AlreadySubscribedToEvents,
            other => Self::Unexpected(other),
        }
    }

    pub fn raw(&self) -> i32 {
        match self {
            Self::Successful => 0,
            Self::UnknownErrorCheckErrorMessage => 1,
            Self::NotConnected => 2,
            Self::UnknownError => 3,
            Self::AlreadyConnected => 10,
            Self::FailedToBindToService => 11,
            Self::InitializationTimeout => 12,
            Self::AnotherCalibrationOngoing => 20,
            Self::NoCalibrationOngoing => 21,
            Self::CalibrationTimeout => 22,
            Self::NoValidGazeAvailable => 30,
            Self::AlreadySubscribedToEvents => 40,
            Self::Unexpected(raw) => *raw,
        }
    }
}

/// The service binding itself failed: the call never produced a return code.
/// Distinct from a call that went through and came back with a non-success
/// [`ServiceReturnCode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Service call {call} failed: {message}")]
pub struct ServiceCallError {
    pub call: &'static str,
    pub message: String,
}

impl ServiceCallError {
    pub fn new(call: &'static str, message: impl Into<String>) -> Self {
        Self {
            call,
            message: message.into(),
        }
    }
}

/// Where availability events from the service land.
///
/// The binding may write from its own callback thread; the SDK drains the
/// slot once per tick on the main context.
pub type AvailabilitySink = Arc<EventSlot<Availability>>;

/// Outcome of asking the service to open the gaze sample stream.
pub enum StreamStart {
    /// The stream is open; samples arrive through this transport.
    Started(Box<dyn SampleTransport>),
    /// The service declined with the given return code.
    Refused(ServiceReturnCode),
}

/// Outcome of asking the service to begin a calibration.
pub enum CalibrationStart {
    /// The service accepted and handed over a per-session channel.
    Started(Box<dyn CalibrationChannel>),
    /// The service declined with the given return code.
    Refused(ServiceReturnCode),
}

/// Calibration session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    /// The session exists but the service has not acknowledged readiness.
    NotStarted,
    /// Points are being displayed and gaze is being collected.
    Ongoing,
    /// The session finished and the user is calibrated.
    FinishedSuccessfully,
    /// The session finished but the user is not calibrated.
    FinishedFailed,
}

impl CalibrationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FinishedSuccessfully | Self::FinishedFailed)
    }
}

/// Synchronous binding to the platform eye tracker service.
///
/// Every method maps onto one service entry point. Calls must come from the
/// SDK main context and are expected to return quickly; only `connect` may
/// block, bounded by its timeout.
pub trait ServiceLink {
    /// Binds to the service, blocking up to `timeout`.
    fn connect(&mut self, timeout: Duration) -> Result<ServiceReturnCode, ServiceCallError>;

    /// Releases the service binding.
    fn disconnect(&mut self) -> Result<ServiceReturnCode, ServiceCallError>;

    /// Requests the version handshake payload; see
    /// [`crate::VersionHandshake::parse`] for the wire format.
    fn version_handshake(&mut self) -> Result<String, ServiceCallError>;

    /// Opens the gaze sample stream.
    fn start_gaze_stream(&mut self) -> Result<StreamStart, ServiceCallError>;

    /// Closes the gaze sample stream.
    fn stop_gaze_stream(&mut self) -> Result<ServiceReturnCode, ServiceCallError>;

    /// Subscribes to service events. Availability changes the service pushes
    /// are written into `sink`.
    fn subscribe_events(
        &mut self,
        sink: AvailabilitySink,
    ) -> Result<ServiceReturnCode, ServiceCallError>;

    /// Cancels the event subscription.
    fn unsubscribe_events(&mut self) -> Result<ServiceReturnCode, ServiceCallError>;

    /// Polls the current eye tracker availability.
    fn availability(&mut self) -> Result<Availability, ServiceCallError>;

    /// Polls which eye the tracker currently considers most accurate.
    fn most_accurate_eye(&mut self) -> Result<Eyes, ServiceCallError>;

    /// Asks the service to begin a calibration session.
    fn begin_calibration(&mut self) -> Result<CalibrationStart, ServiceCallError>;

    /// Human-readable description of the most recent service-side error.
    /// Consulted after a call returns
    /// [`ServiceReturnCode::UnknownErrorCheckErrorMessage`].
    fn last_error_message(&mut self) -> String;
}

/// Per-session channel to an ongoing calibration.
///
/// The service owns the point schedule: it advances `point_index` and
/// `current_point` as the session progresses, while the host reports what it
/// actually displayed through [`CalibrationChannel::mark_point_displayed`].
pub trait CalibrationChannel {
    /// Tells the service the host is ready to display calibration points.
    fn report_ready(&mut self) -> Result<ServiceReturnCode, ServiceCallError>;

    /// Reports that `point` is now visible to the user.
    fn mark_point_displayed(&mut self, point: GazePoint)
        -> Result<ServiceReturnCode, ServiceCallError>;

    /// Index of the point the service currently wants displayed. Starts at
    /// zero before readiness and only ever grows.
    fn point_index(&self) -> PointIndex;

    /// Position of the point the service currently wants displayed.
    fn current_point(&self) -> GazePoint;

    /// Session phase as the service sees it.
    fn status(&self) -> CalibrationState;

    /// Aborts the session service-side.
    fn abort(&mut self) -> Result<ServiceReturnCode, ServiceCallError>;

    /// Service-provided description of the session outcome, once finished.
    fn result_description(&self) -> Option<String>;
}
