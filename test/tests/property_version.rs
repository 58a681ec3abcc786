/// PROPERTY-BASED TESTS: Component version invariants
///
/// Uses proptest to verify version parsing and comparison properties across
/// random inputs.
///
/// Key invariants:
/// 1. Display and parse are inverses for any well-formed version
/// 2. Ordering follows the numeric triple, nothing else
/// 3. The extra tag never affects equality, ordering or hashing
/// 4. Service quirks (bare major, short forms) parse the way the service
///    has always reported them
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use proptest::prelude::*;

use gazelink_shared::{ComponentVersion, VersionHandshake};

// Strategy for version number triples
fn version_triple() -> impl Strategy<Value = (u32, u32, u32)> {
    (0u32..1000, 0u32..1000, 0u32..1000)
}

// Strategy for extra tags as the service emits them (may contain dashes)
fn extra_tag() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,8}"
}

fn hash_of(version: &ComponentVersion) -> u64 {
    let mut hasher = DefaultHasher::new();
    version.hash(&mut hasher);
    hasher.finish()
}

proptest! {
    /// Any version survives a display/parse round trip
    #[test]
    fn prop_display_parse_round_trip((major, minor, patch) in version_triple()) {
        let version = ComponentVersion::new(major, minor, patch);
        let reparsed = ComponentVersion::parse(&version.to_string());
        prop_assert!(reparsed.is_ok());
        let reparsed = reparsed.unwrap();
        prop_assert_eq!(&reparsed, &version);
        prop_assert_eq!(reparsed.extra, "");
    }

    /// The extra tag survives the round trip verbatim
    #[test]
    fn prop_extra_tag_round_trips(
        (major, minor, patch) in version_triple(),
        extra in extra_tag(),
    ) {
        let version = ComponentVersion::with_extra(major, minor, patch, &extra);
        let reparsed = ComponentVersion::parse(&version.to_string()).unwrap();
        prop_assert_eq!(reparsed.extra, extra);
    }

    /// Version ordering is exactly the ordering of the numeric triples
    #[test]
    fn prop_ordering_matches_tuple_ordering(
        left in version_triple(),
        right in version_triple(),
    ) {
        let left_version = ComponentVersion::new(left.0, left.1, left.2);
        let right_version = ComponentVersion::new(right.0, right.1, right.2);
        prop_assert_eq!(left_version.cmp(&right_version), left.cmp(&right));
    }

    /// Two versions differing only in their extra tags are the same version
    #[test]
    fn prop_extra_never_affects_comparisons(
        (major, minor, patch) in version_triple(),
        first_extra in extra_tag(),
        second_extra in extra_tag(),
    ) {
        let first = ComponentVersion::with_extra(major, minor, patch, &first_extra);
        let second = ComponentVersion::with_extra(major, minor, patch, &second_extra);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.cmp(&second), std::cmp::Ordering::Equal);
        prop_assert_eq!(hash_of(&first), hash_of(&second));
    }

    /// A bare major component always reports as 1.0.0, whatever its value
    #[test]
    fn prop_bare_major_parses_as_one_zero_zero(major in 0u32..100_000) {
        let version = ComponentVersion::parse(&major.to_string()).unwrap();
        prop_assert_eq!(version, ComponentVersion::new(1, 0, 0));
    }

    /// A two-part version gets a zero patch component
    #[test]
    fn prop_two_part_versions_get_a_zero_patch(major in 0u32..1000, minor in 0u32..1000) {
        let version = ComponentVersion::parse(&format!("{major}.{minor}")).unwrap();
        prop_assert_eq!(version, ComponentVersion::new(major, minor, 0));
    }

    /// Arbitrary input never panics the parser
    #[test]
    fn prop_parsing_never_panics(input in ".*") {
        let _ = ComponentVersion::parse(&input);
    }

    /// The handshake splits service from firmware and maps 0.0.0 to None
    #[test]
    fn prop_handshake_separates_service_and_firmware(
        service in version_triple(),
        firmware in version_triple(),
    ) {
        let payload = format!(
            "{}.{}.{}\n{}.{}.{}",
            service.0, service.1, service.2, firmware.0, firmware.1, firmware.2
        );
        let handshake = VersionHandshake::parse(&payload).unwrap();
        prop_assert_eq!(
            handshake.service,
            ComponentVersion::new(service.0, service.1, service.2)
        );
        if firmware == (0, 0, 0) {
            prop_assert!(handshake.firmware.is_none());
        } else {
            prop_assert_eq!(
                handshake.firmware,
                Some(ComponentVersion::new(firmware.0, firmware.1, firmware.2))
            );
        }
    }
}
