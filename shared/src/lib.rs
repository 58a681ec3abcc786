//! # Gazelink Shared
//! Common types shared between the gazelink SDK core and platform service bindings.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod availability;
mod eyes;
mod link_config;
mod mailbox;
mod sample;
mod sdk_state;
mod service;
mod transport;
mod types;
mod version;

pub use availability::Availability;
pub use eyes::Eyes;
pub use link_config::LinkConfig;
pub use mailbox::EventSlot;
pub use sample::{
    decode_raw_sample, encode_raw_sample, GazeEvent, GazePoint, GazeSample, RawGazeSample,
    SampleDecodeError, RAW_SAMPLE_BYTES,
};
pub use sdk_state::SdkState;
pub use service::{
    AvailabilitySink, CalibrationChannel, CalibrationStart, CalibrationState, ServiceCallError,
    ServiceLink, ServiceReturnCode, StreamStart,
};
pub use transport::{RecvError, SampleTransport};
pub use types::{BufferVersion, PointIndex, Tick};
pub use version::{
    ComponentVersion, HandshakeError, SdkComponent, VersionError, VersionHandshake,
};
