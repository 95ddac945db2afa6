//! Tests for the variant registry, constructors and decoders.

use serde_json::json;

use super::*;
use crate::model::{ServerVersion, Value, ValueKind};

fn csp(tag: &str) -> Variant<'static> {
    Registry::builtin()
        .resolve("cipher-stream-provider", tag)
        .unwrap()
}

mod lookup {
    use super::*;

    #[test]
    fn cipher_stream_provider_has_nine_variants() {
        let family = Registry::builtin().family("cipher-stream-provider").unwrap();
        let tags: Vec<&str> = family.tags().collect();

        assert_eq!(
            tags,
            [
                "amazon-key-management-service",
                "amazon-secrets-manager",
                "azure-key-vault",
                "file-based",
                "wait-for-passphrase",
                "conjur",
                "pkcs11",
                "vault",
                "third-party",
            ]
        );
    }

    #[test]
    fn unknown_variant_is_rejected_with_known_tags() {
        let err = Registry::builtin()
            .resolve("cipher-stream-provider", "floppy-disk")
            .unwrap_err();

        match err {
            RegistryError::UnknownVariant { tag, known, .. } => {
                assert_eq!(tag, "floppy-disk");
                assert!(known.contains("file-based"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_family_is_rejected() {
        let err = Registry::builtin().family("log-publisher").unwrap_err();
        assert!(matches!(err, RegistryError::UnknownFamily { .. }));
        assert!(err.to_string().contains("uncached-attribute-criteria"));
    }

    #[test]
    fn default_criteria_is_adopt_only() {
        let variant = Registry::builtin()
            .resolve("uncached-attribute-criteria", "default")
            .unwrap();
        assert!(variant.is_adopt_only());
        assert!(!csp("file-based").is_adopt_only());
    }
}

mod tables {
    use super::*;

    fn declared_names(descriptor: &VariantDescriptor) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = descriptor
            .required
            .iter()
            .chain(descriptor.optional)
            .copied()
            .collect();
        names.extend(descriptor.defaults.iter().map(|d| d.attribute));
        for rule in descriptor.rules {
            match rule {
                Rule::Together(attrs) | Rule::Exclusive(attrs) => names.extend(attrs.iter()),
                Rule::Implies(a, b) => names.extend([*a, *b]),
            }
        }
        names
    }

    #[test]
    fn every_referenced_attribute_is_declared_by_its_family() {
        for family in Registry::builtin().families() {
            for descriptor in family.variants {
                for name in declared_names(descriptor) {
                    assert!(
                        family.attribute(name).is_some(),
                        "{}/{} references undeclared attribute {name}",
                        family.name,
                        descriptor.tag
                    );
                }
            }
        }
    }

    #[test]
    fn defaults_and_rules_only_touch_legal_attributes() {
        for family in Registry::builtin().families() {
            for descriptor in family.variants {
                let variant = family.variant(descriptor.tag).unwrap();
                for name in declared_names(descriptor) {
                    assert!(variant.is_legal(name), "{} does not own {name}", descriptor.tag);
                }
            }
        }
    }

    #[test]
    fn default_kinds_match_attribute_kinds() {
        for family in Registry::builtin().families() {
            for descriptor in family.variants {
                for default in descriptor.defaults {
                    let attr = family.attribute(default.attribute).unwrap();
                    assert_eq!(default.value.to_value().kind(), Some(attr.kind));
                }
            }
        }
    }

    #[test]
    fn legal_attributes_follow_family_order() {
        let names: Vec<&str> = csp("file-based").legal_attributes().map(|a| a.name).collect();
        assert_eq!(
            names,
            [
                "description",
                "enabled",
                "password_file",
                "wait_for_password_file",
                "encryption_metadata_file",
                "iteration_count",
            ]
        );
    }

    #[test]
    fn sensitive_attributes_are_flagged() {
        let family = Registry::builtin().family("cipher-stream-provider").unwrap();
        for name in ["aws_secret_access_key", "key_store_pin", "trust_store_pin"] {
            assert!(family.attribute(name).unwrap().sensitive, "{name}");
        }
        assert!(!family.attribute("aws_access_key_id").unwrap().sensitive);
    }
}

mod defaults {
    use super::*;

    #[test]
    fn iteration_count_default_is_version_gated() {
        let variant = csp("file-based");

        assert_eq!(
            variant.default_for("iteration_count", ServerVersion::V10_0),
            Some(Value::Int(600_000))
        );
        assert_eq!(variant.default_for("iteration_count", ServerVersion::V9_2), None);
    }

    #[test]
    fn newest_qualifying_default_wins() {
        static DESCRIPTOR: VariantDescriptor = VariantDescriptor {
            optional: &["iteration_count"],
            defaults: &[
                DefaultValue::always("iteration_count", Literal::Int(1_000)),
                DefaultValue::since("iteration_count", Literal::Int(2_000), ServerVersion::V9_3),
                DefaultValue::since("iteration_count", Literal::Int(3_000), ServerVersion::V10_1),
            ],
            ..VariantDescriptor::new("custom")
        };
        static FAMILY: Family = Family {
            name: "test",
            endpoint: "tests",
            attributes: &[AttributeDef::int("iteration_count")],
            common_required: &[],
            common_optional: &[],
            variants: std::slice::from_ref(&DESCRIPTOR),
        };
        let variant = FAMILY.variant("custom").unwrap();

        assert_eq!(variant.default_for("iteration_count", ServerVersion::V9_1), Some(Value::Int(1_000)));
        assert_eq!(variant.default_for("iteration_count", ServerVersion::V10_0), Some(Value::Int(2_000)));
        assert_eq!(variant.default_for("iteration_count", ServerVersion::V10_1), Some(Value::Int(3_000)));
    }

    #[test]
    fn attribute_version_requirement() {
        let family = Registry::builtin().family("cipher-stream-provider").unwrap();
        let attr = family.attribute("iteration_count").unwrap();

        assert!(attr.supported_on(ServerVersion::V9_3));
        assert!(!attr.supported_on(ServerVersion::V9_2));
        assert!(family.attribute("password_file").unwrap().supported_on(ServerVersion::V9_1));
    }
}

mod constructor {
    use super::*;

    #[test]
    fn create_request_contains_schema_id_and_defined_attributes() {
        let object = ConfigObject::new("pw", "file-based")
            .with("enabled", true)
            .with("password_file", "/secrets/pw")
            .with("wait_for_password_file", true)
            .with("description", Value::Null);

        let payload = csp("file-based").build_create_request(&object);

        assert_eq!(
            payload,
            json!({
                "schemas": ["urn:pingidentity:schemas:configuration:2.0:cipher-stream-provider:file-based"],
                "id": "pw",
                "enabled": true,
                "password-file": "/secrets/pw",
                "wait-for-password-file": true,
            })
        );
    }

    #[test]
    fn create_request_skips_attributes_of_other_variants() {
        let object = ConfigObject::new("pw", "file-based")
            .with("enabled", true)
            .with("password_file", "/secrets/pw")
            .with("vault_secret_path", "kv/ds");

        let payload = csp("file-based").build_create_request(&object);

        assert!(payload.get("vault-secret-path").is_none());
    }
}

mod decoder {
    use super::*;

    fn response() -> serde_json::Value {
        json!({
            "schemas": ["urn:pingidentity:schemas:configuration:2.0:cipher-stream-provider:amazon-secrets-manager"],
            "id": "asm",
            "enabled": true,
            "aws-external-server": "aws",
            "secret-id": "ds/key",
            "secret-field-name": "passphrase",
            "secret-version-id": "v1",
            "iteration-count": 600_000,
            "meta": {"resourceType": "amazon-secrets-manager"},
        })
    }

    #[test]
    fn decodes_legal_attributes_and_tags_variant() {
        let object = csp("amazon-secrets-manager").decode(&response()).unwrap();

        assert_eq!(object.id, "asm");
        assert_eq!(object.variant, "amazon-secrets-manager");
        assert_eq!(object.get("secret_version_id"), &Value::string("v1"));
        assert_eq!(object.get("iteration_count"), &Value::Int(600_000));
        assert_eq!(object.get("secret_version_stage"), &Value::Null);
        assert!(!object.attributes.contains_key("password_file"));
    }

    #[test]
    fn family_decode_dispatches_on_schema() {
        let family = Registry::builtin().family("cipher-stream-provider").unwrap();
        let object = family.decode(&response()).unwrap();

        assert_eq!(object.variant, "amazon-secrets-manager");
    }

    #[test]
    fn decode_rejects_other_variant_schema() {
        let err = csp("vault").decode(&response()).unwrap_err();
        assert!(matches!(err, RegistryError::SchemaMismatch { expected: "vault", .. }));
    }

    #[test]
    fn decode_rejects_wrong_kind() {
        let mut body = response();
        body["iteration-count"] = json!("many");

        let err = csp("amazon-secrets-manager").decode(&body).unwrap_err();
        assert_eq!(
            err,
            RegistryError::WrongKind {
                attribute: "iteration_count",
                expected: ValueKind::Int,
            }
        );
    }

    #[test]
    fn decode_requires_schema_and_id() {
        let family = Registry::builtin().family("cipher-stream-provider").unwrap();
        assert!(matches!(
            family.decode(&json!({"id": "x"})),
            Err(RegistryError::MissingSchema { .. })
        ));

        let mut body = response();
        body.as_object_mut().unwrap().remove("id");
        assert!(matches!(
            family.decode(&body),
            Err(RegistryError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn decode_maps_empty_string_to_null() {
        let mut body = response();
        body["secret-version-id"] = json!("");

        let object = csp("amazon-secrets-manager").decode(&body).unwrap();
        assert_eq!(object.get("secret_version_id"), &Value::Null);
    }
}

mod redaction {
    use super::*;

    #[test]
    fn redact_masks_defined_sensitive_values_only() {
        let object = ConfigObject::new("kms", "amazon-key-management-service")
            .with("aws_access_key_id", "AKIA")
            .with("aws_secret_access_key", "shh")
            .with("key_store_pin", Value::Null);

        let redacted = csp("amazon-key-management-service").redact(&object);

        assert_eq!(redacted.get("aws_access_key_id"), &Value::string("AKIA"));
        assert_eq!(redacted.get("aws_secret_access_key"), &Value::string("***"));
        assert_eq!(redacted.get("key_store_pin"), &Value::Null);
    }
}
