pub mod harness;
pub mod samples;

pub use harness::{device_implementation, device_sdk};
pub use mock_calibration::MockCalibration;
pub use mock_service::{MockService, ServiceCall};
pub use mock_transport::MockTransport;
pub use samples::{event_sample, plain_sample, raw_sample_bytes};
