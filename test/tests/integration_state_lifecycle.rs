/// Integration tests for the consumer-driven state lifecycle
/// These tests verify that registering and releasing consumers drives the
/// service through connect/stream/disconnect in dependency order.
use gazelink_sdk::{InitializationError, InternalError, SdkError};
use gazelink_shared::{ComponentVersion, SdkState, ServiceReturnCode};
use gazelink_test::{device_sdk, MockService, ServiceCall};

/// A gaze provider needs the connection and the stream, in that order
#[test]
fn registering_a_provider_connects_then_streams() {
    let service = MockService::new();
    let mut sdk = device_sdk(&service);

    let _provider = sdk.gaze_provider().unwrap();

    assert!(service.is_connected());
    assert!(service.is_streaming());
    assert_eq!(
        sdk.current_state(),
        SdkState::CONNECTED | SdkState::STREAMING_GAZE
    );
    assert_eq!(
        service.calls(),
        vec![
            ServiceCall::Connect,
            ServiceCall::VersionHandshake,
            ServiceCall::StartGazeStream,
        ]
    );
}

/// Releasing the last provider exits the stream before the connection
#[test]
fn releasing_the_last_provider_tears_down_in_reverse_order() {
    let service = MockService::new();
    let mut sdk = device_sdk(&service);

    let provider = sdk.gaze_provider().unwrap();
    provider.release();

    assert!(!service.is_streaming());
    assert!(!service.is_connected());
    assert_eq!(sdk.current_state(), SdkState::empty());

    let calls = service.calls();
    let stop_at = calls
        .iter()
        .position(|call| *call == ServiceCall::StopGazeStream)
        .expect("stream must be stopped");
    let disconnect_at = calls
        .iter()
        .position(|call| *call == ServiceCall::Disconnect)
        .expect("service must be disconnected");
    assert!(
        stop_at < disconnect_at,
        "the stream must stop before the connection closes: {calls:?}"
    );
}

/// Dropping a provider (instead of releasing it) settles on the next tick
#[test]
fn dropped_providers_settle_on_the_next_tick() {
    let service = MockService::new();
    let mut sdk = device_sdk(&service);

    let provider = sdk.gaze_provider().unwrap();
    drop(provider);

    // The drop itself must not touch the service.
    assert!(service.is_connected());
    assert!(service.is_streaming());

    sdk.tick();
    assert!(!service.is_connected());
    assert!(!service.is_streaming());
    assert_eq!(sdk.current_state(), SdkState::empty());
}

/// Overlapping consumers hold the union of their requirements
#[test]
fn overlapping_consumers_keep_the_required_union() {
    let service = MockService::new();
    let mut sdk = device_sdk(&service);

    let provider = sdk.gaze_provider().unwrap();
    let keepalive = sdk.keep_connected().unwrap();
    assert_eq!(service.call_count(ServiceCall::Connect), 1);

    // The keepalive still needs the connection.
    provider.release();
    assert!(service.is_connected());
    assert!(!service.is_streaming());
    assert_eq!(sdk.current_state(), SdkState::CONNECTED);

    keepalive.release();
    sdk.tick();
    assert_eq!(sdk.current_state(), SdkState::empty());
    assert!(!service.is_connected());
}

/// A bind refusal surfaces as UnableToConnect and leaves nothing entered
#[test]
fn bind_refusal_maps_to_unable_to_connect() {
    let service = MockService::new();
    service.script(ServiceCall::Connect, ServiceReturnCode::FailedToBindToService);
    let mut sdk = device_sdk(&service);

    let result = sdk.gaze_provider();
    assert!(matches!(
        result,
        Err(SdkError::Initialization(InitializationError::UnableToConnect))
    ));
    assert!(!service.is_connected());
    assert_eq!(sdk.current_state(), SdkState::empty());
}

/// A connect timeout surfaces as Timeout
#[test]
fn connect_timeout_maps_to_timeout() {
    let service = MockService::new();
    service.script(ServiceCall::Connect, ServiceReturnCode::InitializationTimeout);
    let mut sdk = device_sdk(&service);

    assert!(matches!(
        sdk.gaze_provider(),
        Err(SdkError::Initialization(InitializationError::Timeout))
    ));
}

/// The check-error-message code makes the SDK fetch the service's description
#[test]
fn connect_unknown_error_carries_the_service_message() {
    let service = MockService::new();
    service.script(
        ServiceCall::Connect,
        ServiceReturnCode::UnknownErrorCheckErrorMessage,
    );
    service.set_error_message("ipc buffer poisoned");
    let mut sdk = device_sdk(&service);

    match sdk.gaze_provider() {
        Err(SdkError::Initialization(InitializationError::ServiceReported { message })) => {
            assert_eq!(message, "ipc buffer poisoned");
        }
        other => panic!("expected a service-reported error, got {:?}", other.err()),
    }
}

/// A return code that has no meaning for connect is preserved in the error
#[test]
fn nonsensical_connect_code_is_reported_verbatim() {
    let service = MockService::new();
    service.script(ServiceCall::Connect, ServiceReturnCode::NoValidGazeAvailable);
    let mut sdk = device_sdk(&service);

    assert!(matches!(
        sdk.gaze_provider(),
        Err(SdkError::Initialization(InitializationError::UnexpectedCode {
            code: ServiceReturnCode::NoValidGazeAvailable
        }))
    ));
}

/// AlreadyConnected counts as a successful connect
#[test]
fn already_connected_is_accepted() {
    let service = MockService::new();
    service.script(ServiceCall::Connect, ServiceReturnCode::AlreadyConnected);
    let mut sdk = device_sdk(&service);

    assert!(sdk.gaze_provider().is_ok());
    assert!(service.is_streaming());
}

/// A broken binding surfaces as a link error
#[test]
fn link_failure_on_connect_propagates() {
    let service = MockService::new();
    service.fail_link_once(ServiceCall::Connect);
    let mut sdk = device_sdk(&service);

    assert!(matches!(
        sdk.gaze_provider(),
        Err(SdkError::Initialization(InitializationError::Link(_)))
    ));
}

/// A service older than the supported range is rejected, but the socket
/// stays open: the version gate runs after the connection is entered
#[test]
fn too_old_service_fails_the_version_gate_but_stays_connected() {
    let service = MockService::new();
    service.set_handshake("0.12.9\n1.2.0");
    let mut sdk = device_sdk(&service);

    match sdk.gaze_provider() {
        Err(SdkError::Initialization(InitializationError::ServiceVersionTooLow {
            actual,
            minimum,
        })) => {
            assert_eq!(actual, ComponentVersion::new(0, 12, 9));
            assert_eq!(minimum, gazelink_sdk::min_service_version());
        }
        other => panic!("expected a version gate failure, got {:?}", other.err()),
    }
    assert!(service.is_connected());
    assert_eq!(sdk.current_state(), SdkState::CONNECTED);
    assert!(!service.is_streaming());
}

/// A service newer than the supported range is rejected the same way
#[test]
fn too_new_service_fails_the_version_gate() {
    let service = MockService::new();
    service.set_handshake("1.0.1\n1.2.0");
    let mut sdk = device_sdk(&service);

    match sdk.gaze_provider() {
        Err(SdkError::Initialization(InitializationError::ServiceVersionTooHigh {
            actual,
            maximum,
        })) => {
            assert_eq!(actual, ComponentVersion::new(1, 0, 1));
            assert_eq!(maximum, gazelink_sdk::max_service_version());
        }
        other => panic!("expected a version gate failure, got {:?}", other.err()),
    }
}

/// Both ends of the supported range are inclusive
#[test]
fn boundary_service_versions_pass_the_gate() {
    for handshake in ["0.13.0\n1.0.0", "1.0.0\n1.0.0"] {
        let service = MockService::new();
        service.set_handshake(handshake);
        let mut sdk = device_sdk(&service);
        assert!(
            sdk.gaze_provider().is_ok(),
            "handshake {handshake:?} must pass the version gate"
        );
    }
}

/// A failed enter mid-transition aborts the transition but keeps what was
/// already entered; a later registration picks up from there
#[test]
fn failed_stream_start_keeps_the_connection() {
    let service = MockService::new();
    service.script(ServiceCall::StartGazeStream, ServiceReturnCode::UnknownError);
    let mut sdk = device_sdk(&service);

    assert!(matches!(
        sdk.gaze_provider(),
        Err(SdkError::Internal(InternalError::UnexpectedReturnCode {
            call: "start_gaze_stream",
            ..
        }))
    ));
    assert!(service.is_connected());
    assert_eq!(sdk.current_state(), SdkState::CONNECTED);

    // The connection is reused, not re-entered.
    let _keepalive = sdk.keep_connected().unwrap();
    assert_eq!(service.call_count(ServiceCall::Connect), 1);
}

/// Exit failures are logged, never propagated; the SDK-side state clears
#[test]
fn exit_failures_are_best_effort() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();

    let service = MockService::new();
    let mut sdk = device_sdk(&service);

    let provider = sdk.gaze_provider().unwrap();
    service.script(ServiceCall::StopGazeStream, ServiceReturnCode::UnknownError);
    service.fail_link_once(ServiceCall::Disconnect);

    provider.release();
    assert_eq!(sdk.current_state(), SdkState::empty());
}
