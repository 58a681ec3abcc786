/// State of the hardware eye tracker as reported by the platform service.
///
/// Discriminants mirror the service wire values and are not a stable part of
/// the public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Availability {
    /// Fully functional: gaze data can be provided, a calibration can start.
    Available = 0,
    /// The eye tracker is physically disconnected from the headset.
    Disconnected = 1,
    /// Connected, but gaze data is paused while a calibration is in progress.
    Calibrating = 2,
    /// Connected to the headset but not yet available.
    Unavailable = 5,
    /// Connected but not calibrated; gaze data arrives after a calibration.
    NotCalibrated = 6,
    /// Connected but unavailable for a reason this SDK does not know about.
    /// Appears when the client library is behind the service library.
    Unknown = 7,
    /// The SDK cannot reach the eye tracker service at all.
    UnableToConnect = 8,
    /// The service version is incompatible with this SDK version.
    InvalidServiceVersion = 9,
}

impl Availability {
    /// Translates a raw service value. Values this SDK does not know map to
    /// [`Availability::Unknown`].
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Available,
            1 => Self::Disconnected,
            2 => Self::Calibrating,
            5 => Self::Unavailable,
            6 => Self::NotCalibrated,
            7 => Self::Unknown,
            8 => Self::UnableToConnect,
            9 => Self::InvalidServiceVersion,
            _ => Self::Unknown,
        }
    }

    /// True when the eye tracker hardware is physically connected to the
    /// headset, regardless of whether gaze data is currently flowing.
    pub fn is_connected(&self) -> bool {
        matches!(
            self,
            Self::Available
                | Self::Calibrating
                | Self::Unavailable
                | Self::NotCalibrated
                | Self::Unknown
        )
    }
}
