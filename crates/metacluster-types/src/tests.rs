//! Unit tests for metacluster-types

use proptest::prelude::*;
use test_case::test_case;

use crate::{ClusterId, ClusterName, ClusterType, ClusterUsage, NameError, cluster_type_to_string};

// ============================================================================
// ClusterUsage
// ============================================================================

#[test]
fn usage_defaults_to_zero() {
    assert_eq!(ClusterUsage::default(), ClusterUsage::ZERO);
    assert_eq!(ClusterUsage::default().num_tenant_groups, 0);
}

#[test]
fn usage_display_matches_trace_format() {
    assert_eq!(ClusterUsage::new(7).to_string(), "NumTenantGroups: 7");
}

#[test]
fn usage_json_has_tenant_group_count() {
    let json = ClusterUsage::new(3).to_json();
    assert_eq!(json["num_tenant_groups"], 3);
}

#[test]
fn usage_saturating_add_clamps() {
    let big = ClusterUsage::new(u64::MAX - 1);
    assert_eq!(big.saturating_add(ClusterUsage::new(5)), ClusterUsage::new(u64::MAX));
}

proptest! {
    /// Property: ordering of usages follows ordering of counts
    #[test]
    fn prop_usage_order_follows_count(a in any::<u64>(), b in any::<u64>()) {
        let (ua, ub) = (ClusterUsage::new(a), ClusterUsage::new(b));
        prop_assert_eq!(ua < ub, a < b);
        prop_assert_eq!(ua == ub, a == b);
        prop_assert_eq!(ua != ub, a != b);
    }

    /// Property: equality is reflexive, symmetric and transitive
    #[test]
    fn prop_usage_equality_is_an_equivalence(a in 0u64..4, b in 0u64..4, c in 0u64..4) {
        let (ua, ub, uc) = (ClusterUsage::new(a), ClusterUsage::new(b), ClusterUsage::new(c));
        prop_assert_eq!(ua, ua);
        prop_assert_eq!(ua == ub, ub == ua);
        if ua == ub && ub == uc {
            prop_assert_eq!(ua, uc);
        }
    }
}

// ============================================================================
// ClusterId
// ============================================================================

#[test]
fn generated_ids_are_distinct() {
    let a = ClusterId::generate();
    let b = ClusterId::generate();
    assert_ne!(a, b);
    assert!(!a.is_nil());
}

#[test]
fn nil_id_is_nil() {
    assert!(ClusterId::NIL.is_nil());
    assert_eq!(ClusterId::NIL.short_string(), "0000000000000000");
}

#[test]
fn id_parses_from_display_form() {
    let id = ClusterId::generate();
    let parsed: ClusterId = id.to_string().parse().unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn id_rejects_garbage() {
    assert!("not-a-uuid".parse::<ClusterId>().is_err());
}

#[test]
fn id_short_string_uses_high_bits() {
    let id = ClusterId::from_u128(0xdead_beef_0000_0001_ffff_ffff_ffff_ffff);
    assert_eq!(id.short_string(), "deadbeef00000001");
    assert_eq!(format!("{id:?}"), "ClusterId(deadbeef00000001)");
}

// ============================================================================
// ClusterName
// ============================================================================

#[test]
fn valid_name_roundtrips() {
    let name = ClusterName::new("dc1").unwrap();
    assert_eq!(name.as_str(), "dc1");
    assert_eq!(name.to_string(), "dc1");
}

#[test_case("" => NameError::Empty; "empty")]
#[test_case("a/b" => NameError::Separator("a/b".to_string()); "slash")]
#[test_case("\u{ff}system" => NameError::Reserved("\u{ff}system".to_string()); "system prefix")]
fn invalid_names_are_rejected(name: &str) -> NameError {
    ClusterName::new(name).unwrap_err()
}

#[test]
fn overlong_name_is_rejected() {
    let name = "x".repeat(crate::MAX_CLUSTER_NAME_LEN + 1);
    assert!(matches!(
        ClusterName::new(name),
        Err(NameError::TooLong { len: 256, max: 255 })
    ));
}

#[test]
fn name_deserialization_validates() {
    let bytes = postcard::to_allocvec(&"bad/name".to_string()).unwrap();
    assert!(postcard::from_bytes::<ClusterName>(&bytes).is_err());

    let bytes = postcard::to_allocvec(&"good".to_string()).unwrap();
    let name: ClusterName = postcard::from_bytes(&bytes).unwrap();
    assert_eq!(name.as_str(), "good");
}

// ============================================================================
// ClusterType
// ============================================================================

#[test_case(Some(ClusterType::MetaclusterManagement) => "metacluster_management"; "management")]
#[test_case(Some(ClusterType::MetaclusterData) => "metacluster_data"; "data")]
#[test_case(None => "standalone"; "standalone")]
fn cluster_type_strings(cluster_type: Option<ClusterType>) -> &'static str {
    cluster_type_to_string(cluster_type)
}
