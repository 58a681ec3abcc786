use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Version string is empty")]
    Empty,
    #[error("Failed to parse {input:?} as a component version at the {position} step")]
    InvalidComponent { input: String, position: &'static str },
}

/// Identifies one versioned component of the eye tracking stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdkComponent {
    /// This library.
    Sdk,
    /// The platform service the SDK binds to.
    Service,
    /// The eye tracker board firmware, when the service reports one.
    Firmware,
}

/// Version of a single component in the eye tracking stack.
///
/// Ordering and equality consider only the numeric triple; `extra` is a
/// free-form tag ignored by comparisons.
#[derive(Debug, Clone)]
pub struct ComponentVersion {
    /// Changes in major version are breaking from the API point of view.
    pub major: u32,
    /// Changes in minor version introduce new features in a non-breaking way.
    pub minor: u32,
    /// Changes in patch version introduce bug fixes and minor improvements.
    pub patch: u32,
    /// Optional free-form identifier, e.g. a prerelease tag.
    pub extra: String,
}

impl ComponentVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            extra: String::new(),
        }
    }

    pub fn with_extra(major: u32, minor: u32, patch: u32, extra: &str) -> Self {
        Self {
            major,
            minor,
            patch,
            extra: extra.to_string(),
        }
    }

    /// Parses `{major}`, `{major}.{minor}`, `{major}.{minor}.{patch}` or
    /// `{major}.{minor}.{patch}-{extra}`.
    ///
    /// A bare major component yields `1.0.0` regardless of its value; that is
    /// long-standing service behavior this parser keeps. An extra tag is only
    /// accepted after the patch component.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        if input.is_empty() {
            return Err(VersionError::Empty);
        }
        let (major_text, rest) = match input.split_once('.') {
            None => {
                parse_component(input, input, "major")?;
                return Ok(Self::new(1, 0, 0));
            }
            Some(pair) => pair,
        };
        let major = parse_component(major_text, input, "major")?;
        let (minor_text, rest) = match rest.split_once('.') {
            None => {
                let minor = parse_component(rest, input, "minor")?;
                return Ok(Self::new(major, minor, 0));
            }
            Some(pair) => pair,
        };
        let minor = parse_component(minor_text, input, "minor")?;
        let (patch_text, extra) = match rest.split_once('-') {
            None => (rest, ""),
            Some(pair) => pair,
        };
        let patch = parse_component(patch_text, input, "patch")?;
        Ok(Self::with_extra(major, minor, patch, extra))
    }
}

fn parse_component(text: &str, input: &str, position: &'static str) -> Result<u32, VersionError> {
    text.parse::<u32>().map_err(|_| VersionError::InvalidComponent {
        input: input.to_string(),
        position,
    })
}

impl FromStr for ComponentVersion {
    type Err = VersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl fmt::Display for ComponentVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.extra.is_empty() {
            write!(f, "-{}", self.extra)?;
        }
        Ok(())
    }
}

impl PartialEq for ComponentVersion {
    fn eq(&self, other: &Self) -> bool {
        self.major == other.major && self.minor == other.minor && self.patch == other.patch
    }
}

impl Eq for ComponentVersion {}

impl Hash for ComponentVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
    }
}

impl PartialOrd for ComponentVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComponentVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    #[error("Version handshake payload {payload:?} is missing its newline separator")]
    MissingSeparator { payload: String },
    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Parsed form of the service version handshake.
///
/// The wire format is two version strings separated by a single newline:
/// `serviceVersion\nfirmwareVersion`. A firmware of `0.0.0` is the sentinel
/// for "no firmware reported" and surfaces here as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionHandshake {
    pub service: ComponentVersion,
    pub firmware: Option<ComponentVersion>,
}

impl VersionHandshake {
    pub fn parse(payload: &str) -> Result<Self, HandshakeError> {
        let Some((service_text, firmware_text)) = payload.split_once('\n') else {
            return Err(HandshakeError::MissingSeparator {
                payload: payload.to_string(),
            });
        };
        let service = ComponentVersion::parse(service_text)?;
        let firmware = ComponentVersion::parse(firmware_text.trim_end())?;
        let firmware = if firmware == ComponentVersion::new(0, 0, 0) {
            None
        } else {
            Some(firmware)
        };
        Ok(Self { service, firmware })
    }
}
