/// Integration tests for swapping the implementation behind the facade
/// Live consumer handles must stay valid across a swap: the replacement
/// adopts them and immediately drives itself to their requirements, while
/// readers from the retired implementation fail closed instead of serving
/// stale frames.
use std::cell::RefCell;
use std::rc::Rc;

use gazelink_sdk::StubSdk;
use gazelink_shared::{Availability, SdkState};
use gazelink_test::{device_implementation, device_sdk, plain_sample, MockService, ServiceCall};

fn recorder<T: Copy + 'static>() -> (Rc<RefCell<Vec<T>>>, impl FnMut(T)) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let writer = Rc::clone(&seen);
    (seen, move |value| writer.borrow_mut().push(value))
}

/// Consumers keep their handles; the replacement re-establishes their state
#[test]
fn consumers_move_to_the_replacement_whole() {
    let service_a = MockService::new();
    let mut sdk = device_sdk(&service_a);
    let mut provider = sdk.gaze_provider().unwrap();

    let service_b = MockService::new();
    sdk.swap_implementation(device_implementation(&service_b));

    assert!(!service_a.is_connected(), "the retired service is torn down");
    assert_eq!(service_a.calls().last(), Some(&ServiceCall::Disconnect));
    assert!(service_b.is_connected() && service_b.is_streaming());
    assert!(service_b.calls().starts_with(&[
        ServiceCall::Connect,
        ServiceCall::VersionHandshake,
        ServiceCall::StartGazeStream,
    ]));

    // The same provider handle now reads from the replacement's stream.
    service_b.push_sample(plain_sample(40));
    sdk.tick();
    let freshest = provider.try_most_recent().unwrap();
    assert_eq!(freshest.timestamp_ms, 40);
}

/// The stub keeps adopted consumers parked until a device comes back
#[test]
fn a_swap_to_the_stub_parks_consumers() {
    let service_a = MockService::new();
    let mut sdk = device_sdk(&service_a);
    let mut provider = sdk.gaze_provider().unwrap();

    sdk.swap_implementation(Box::new(StubSdk::new()));
    assert!(!service_a.is_connected());
    assert_eq!(sdk.current_state(), SdkState::empty());
    assert_eq!(sdk.availability().unwrap(), Availability::Unknown);
    assert_eq!(sdk.versions().len(), 1, "only the SDK's own version remains");

    sdk.tick();
    assert!(provider.try_most_recent().is_none());
    assert!(provider.iter().next().is_none());

    let service_b = MockService::new();
    sdk.swap_implementation(device_implementation(&service_b));
    assert!(service_b.is_connected() && service_b.is_streaming());
}

/// Listeners hear about a swap exactly once, and only when it changes things
#[test]
fn a_swap_announces_its_availability_change_once() {
    let service = MockService::new();
    let mut sdk = device_sdk(&service);
    let (seen, listener) = recorder();
    sdk.on_availability_changed(listener);

    sdk.swap_implementation(Box::new(StubSdk::new()));
    assert_eq!(*seen.borrow(), vec![Availability::Unknown]);

    sdk.swap_implementation(Box::new(StubSdk::new()));
    assert_eq!(
        *seen.borrow(),
        vec![Availability::Unknown],
        "an equal-availability swap crosses silently"
    );
}

/// A device-to-device swap with matching availability is invisible
#[test]
fn matching_availability_crosses_silently() {
    let service_a = MockService::new();
    let mut sdk = device_sdk(&service_a);
    let (seen, listener) = recorder();
    sdk.on_availability_changed(listener);

    let service_b = MockService::new();
    sdk.swap_implementation(device_implementation(&service_b));
    assert!(seen.borrow().is_empty());
    assert!(service_b.is_subscribed(), "the event bridge moved over");

    // Later changes still flow from the replacement's event channel.
    service_b.fire_availability_event(Availability::Calibrating);
    sdk.tick();
    assert_eq!(*seen.borrow(), vec![Availability::Calibrating]);
}

/// A handle minted before the swap cannot free someone else's slot
#[test]
fn stale_handles_resolve_on_the_tick_after_release() {
    let service_a = MockService::new();
    let mut sdk = device_sdk(&service_a);
    let provider = sdk.gaze_provider().unwrap();

    let service_b = MockService::new();
    sdk.swap_implementation(device_implementation(&service_b));

    provider.release();
    assert!(
        service_b.is_connected(),
        "the pre-swap token misses; only the release flag remains"
    );

    sdk.tick();
    assert!(!service_b.is_connected());
    assert!(!service_b.is_streaming());
}

/// An ongoing calibration crosses the swap and winds down afterwards
#[test]
fn a_live_calibration_survives_the_swap() {
    let service_a = MockService::new();
    let mut sdk = device_sdk(&service_a);
    let session = sdk.start_calibration().unwrap();

    let service_b = MockService::new();
    sdk.swap_implementation(device_implementation(&service_b));
    assert!(sdk.current_state().contains(SdkState::CALIBRATING));
    assert!(service_b.is_connected());

    drop(session);
    sdk.tick();
    assert_eq!(sdk.current_state(), SdkState::empty());
    assert_eq!(
        service_a.calibration().aborts(),
        1,
        "the session still aborts through its original channel"
    );
}

/// Readers opened before the swap stop instead of mixing frames
#[test]
fn iterators_from_before_the_swap_fail_closed() {
    let service_a = MockService::new();
    let mut sdk = device_sdk(&service_a);
    let mut provider = sdk.gaze_provider().unwrap();
    service_a.push_samples([plain_sample(10), plain_sample(20)]);
    sdk.tick();

    let mut cursor = provider.iter();
    assert_eq!(cursor.next().unwrap().timestamp_ms, 10);

    sdk.swap_implementation(Box::new(StubSdk::new()));
    assert!(cursor.next().is_none());
}

/// A pre-swap cursor stays dead even once the replacement's own version
/// counter has moved as far as the retired one had
#[test]
fn cursors_do_not_alias_the_replacements_frames() {
    let service_a = MockService::new();
    let mut sdk = device_sdk(&service_a);
    let mut provider = sdk.gaze_provider().unwrap();
    service_a.push_samples([plain_sample(10), plain_sample(20)]);
    sdk.tick();

    let mut cursor = provider.iter();
    assert_eq!(cursor.next().unwrap().timestamp_ms, 10);

    let service_b = MockService::new();
    sdk.swap_implementation(device_implementation(&service_b));
    service_b.push_samples([plain_sample(40), plain_sample(50)]);
    sdk.tick();
    assert_eq!(provider.try_most_recent().unwrap().timestamp_ms, 50);

    assert!(
        cursor.next().is_none(),
        "the cursor must not resume on the replacement's frame"
    );
}
