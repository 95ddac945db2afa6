//! Tests for server versions.

use super::ServerVersion;

#[test]
fn parses_full_and_short_forms() {
    assert_eq!("10.0.0.0".parse::<ServerVersion>(), Ok(ServerVersion::V10_0));
    assert_eq!("9.3".parse::<ServerVersion>(), Ok(ServerVersion::V9_3));
}

#[test]
fn rejects_garbage() {
    assert!("".parse::<ServerVersion>().is_err());
    assert!("ten".parse::<ServerVersion>().is_err());
    assert!("1.2.3.4.5".parse::<ServerVersion>().is_err());
    assert!("9..1".parse::<ServerVersion>().is_err());
}

#[test]
fn orders_numerically() {
    assert!(ServerVersion::V10_0 > ServerVersion::V9_3);
    assert!(ServerVersion::new(9, 10, 0, 0) > ServerVersion::V9_3);
    assert!(ServerVersion::V9_3.at_least(ServerVersion::V9_3));
    assert!(!ServerVersion::V9_2.at_least(ServerVersion::V9_3));
}

#[test]
fn displays_all_components() {
    assert_eq!(ServerVersion::new(9, 3, 0, 0).to_string(), "9.3.0.0");
}

#[test]
fn supported_list_is_sorted_and_latest_is_last() {
    assert!(ServerVersion::SUPPORTED.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(ServerVersion::latest(), ServerVersion::V10_1);
    assert!(ServerVersion::V9_2.is_supported());
    assert!(!ServerVersion::new(8, 0, 0, 0).is_supported());
}

#[test]
fn parse_error_names_the_input() {
    let err = "9.x".parse::<ServerVersion>().unwrap_err();
    assert!(err.to_string().contains("9.x"));
}

#[test]
fn serializes_as_dotted_string() {
    let json = serde_json::to_value(ServerVersion::V9_3).unwrap();
    assert_eq!(json, "9.3.0.0");
}
