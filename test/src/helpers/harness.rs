use gazelink_sdk::{DeviceSdk, Sdk, SdkImplementation};
use gazelink_shared::LinkConfig;

use super::mock_service::MockService;

/// An [`Sdk`] facade over a device implementation driving `service`.
pub fn device_sdk(service: &MockService) -> Sdk {
    Sdk::new(device_implementation(service))
}

/// A boxed device implementation driving `service`, ready to be installed
/// with [`Sdk::swap_implementation`].
pub fn device_implementation(service: &MockService) -> Box<dyn SdkImplementation> {
    Box::new(DeviceSdk::new(
        Box::new(service.clone()),
        LinkConfig::default(),
    ))
}
