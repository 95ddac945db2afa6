//! Tests for saved obscured values.

use serde_json::json;

use super::{LoadResult, Snapshot, Snapshots};
use crate::model::{ConfigObject, Value};
use crate::registry::{Family, Registry};

fn csp() -> &'static Family {
    Registry::builtin().family("cipher-stream-provider").unwrap()
}

fn hsm(pin: &str) -> ConfigObject {
    ConfigObject::new("hsm", "pkcs11")
        .with("enabled", true)
        .with("ssl_cert_nickname", "server-cert")
        .with("key_store_pin", pin)
}

fn saved(obscured: serde_json::Value) -> Snapshot {
    Snapshot {
        family: "cipher-stream-provider".to_string(),
        id: "hsm".to_string(),
        variant: "pkcs11".to_string(),
        obscured: serde_json::from_value(obscured).unwrap(),
    }
}

mod load_result {
    use super::*;

    #[test]
    fn into_snapshots_returns_loaded_data() {
        let snapshots = Snapshots::from_entries([saved(json!({"key_store_pin": "s3cret"}))]);
        let result = LoadResult::Loaded(snapshots.clone());

        assert!(result.is_loaded());
        assert_eq!(result.into_snapshots(), snapshots);
    }

    #[test]
    fn into_snapshots_is_empty_for_not_found_and_corrupted() {
        assert!(LoadResult::NotFound.into_snapshots().is_empty());
        let corrupted = LoadResult::Corrupted {
            reason: "test".to_string(),
        };
        assert!(!corrupted.is_loaded());
        assert!(corrupted.into_snapshots().is_empty());
    }
}

mod record {
    use super::*;

    #[test]
    fn keeps_only_obscured_values() {
        let mut snapshots = Snapshots::default();

        snapshots.record(csp(), &hsm("s3cret"));

        let snapshot = snapshots.get("cipher-stream-provider", "hsm").unwrap();
        assert_eq!(snapshot.variant, "pkcs11");
        assert_eq!(snapshot.obscured.len(), 1);
        assert_eq!(snapshot.obscured["key_store_pin"], "s3cret");
    }

    #[test]
    fn later_record_replaces_earlier() {
        let mut snapshots = Snapshots::default();

        snapshots.record(csp(), &hsm("first"));
        snapshots.record(csp(), &hsm("second"));

        assert_eq!(snapshots.len(), 1);
        assert_eq!(
            snapshots.get("cipher-stream-provider", "hsm").unwrap().obscured["key_store_pin"],
            "second"
        );
    }

    #[test]
    fn object_without_secrets_drops_its_entry() {
        let mut snapshots = Snapshots::from_entries([saved(json!({"key_store_pin": "old"}))]);
        let file_based = ConfigObject::new("hsm", "file-based")
            .with("enabled", true)
            .with("password_file", "config/passphrase");

        snapshots.record(csp(), &file_based);

        assert!(snapshots.is_empty());
    }

    #[test]
    fn forget_reports_whether_an_entry_existed() {
        let mut snapshots = Snapshots::from_entries([saved(json!({"key_store_pin": "x"}))]);

        assert!(snapshots.forget("cipher-stream-provider", "hsm"));
        assert!(!snapshots.forget("cipher-stream-provider", "hsm"));
    }
}

mod previous {
    use super::*;

    #[test]
    fn rebuilds_typed_object() {
        let snapshots = Snapshots::from_entries([saved(json!({"key_store_pin": "s3cret"}))]);

        let previous = snapshots.previous(csp(), "hsm").unwrap();

        assert_eq!(previous.variant, "pkcs11");
        assert_eq!(previous.get("key_store_pin"), &Value::string("s3cret"));
    }

    #[test]
    fn unknown_object_has_no_previous() {
        assert!(Snapshots::default().previous(csp(), "hsm").is_none());
    }

    #[test]
    fn stale_or_mistyped_values_are_dropped() {
        let snapshots = Snapshots::from_entries([saved(json!({
            "key_store_pin": 42,
            "retired_pin": "x",
            "trust_store_pin": "kept"
        }))]);

        let previous = snapshots.previous(csp(), "hsm").unwrap();

        assert_eq!(previous.attributes.len(), 1);
        assert_eq!(previous.get("trust_store_pin"), &Value::string("kept"));
    }
}
