//! # Gazelink SDK
//! Host-embedded eye tracker SDK. Consumers declare the service capabilities
//! they need; the SDK keeps the service in the union of all requirements,
//! drains gaze samples once per host tick into a version-stamped buffer, and
//! runs calibration sessions as explicit state machines.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod shared {
    pub use gazelink_shared::{
        Availability, ComponentVersion, Eyes, GazeEvent, GazePoint, GazeSample, LinkConfig,
        SdkComponent, SdkState, ServiceLink, ServiceReturnCode, Tick,
    };
}

mod calibration;
mod error;
mod events;
mod guard;
mod implementation;
mod keepalive;
mod pipeline;
mod provider;
mod sdk;
mod state;

pub use calibration::{CalibrationGrant, CalibrationSession};
pub use error::{CalibrationError, InitializationError, InternalError, SdkError};
pub use events::{ListenerId, SdkEvent};
pub use implementation::{
    max_service_version, min_service_version, DeviceSdk, SdkImplementation, StubSdk,
};
pub use keepalive::KeepaliveHandle;
pub use pipeline::CursorRead;
pub use provider::{GazeProvider, GazeSamples};
pub use sdk::{sdk_version, Sdk};
pub use state::{ConsumerEntry, ConsumerToken, StateHandle};
