//! Tests for plan-time validation and version gating.

use super::*;
use crate::model::{ConfigObject, Mode, ServerVersion, Value, ValueKind};
use crate::registry::{
    AttributeDef, DefaultValue, Family, Literal, Registry, Variant, VariantDescriptor,
};

const VERSION: ServerVersion = ServerVersion::V10_1;

fn variant(family: &str, tag: &str) -> Variant<'static> {
    Registry::builtin().resolve(family, tag).unwrap()
}

fn csp(tag: &str) -> Variant<'static> {
    variant("cipher-stream-provider", tag)
}

fn errors_of(result: Result<(), ValidationErrors>) -> Vec<ValidationError> {
    result.unwrap_err().iter().cloned().collect()
}

mod required {
    use super::*;

    #[test]
    fn complete_object_passes() {
        let object = ConfigObject::new("pw", "file-based")
            .with("enabled", true)
            .with("password_file", "/secrets/pw");

        assert!(validate(csp("file-based"), &object, Mode::Create, VERSION).is_ok());
    }

    #[test]
    fn missing_required_attributes_are_all_reported() {
        let object = ConfigObject::new("v", "vault").with("enabled", true);

        let errors = errors_of(validate(csp("vault"), &object, Mode::Create, VERSION));

        assert_eq!(
            errors,
            [
                ValidationError::Missing {
                    attribute: "vault_secret_path".to_string(),
                    variant: "vault",
                },
                ValidationError::Missing {
                    attribute: "vault_secret_field_name".to_string(),
                    variant: "vault",
                },
            ]
        );
    }

    #[test]
    fn family_wide_required_attribute_is_enforced() {
        let object = ConfigObject::new("w", "wait-for-passphrase");

        let errors = errors_of(validate(
            csp("wait-for-passphrase"),
            &object,
            Mode::Create,
            VERSION,
        ));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].attributes(), ["enabled"]);
    }

    #[test]
    fn empty_string_does_not_satisfy_required() {
        let object = ConfigObject::new("pw", "file-based")
            .with("enabled", true)
            .with("password_file", "");

        let errors = errors_of(validate(csp("file-based"), &object, Mode::Create, VERSION));

        assert_eq!(errors[0].attributes(), ["password_file"]);
    }

    #[test]
    fn unknown_value_satisfies_required() {
        let object = ConfigObject::new("pw", "file-based")
            .with("enabled", true)
            .with("password_file", Value::Unknown);

        assert!(validate(csp("file-based"), &object, Mode::Create, VERSION).is_ok());
    }

    #[test]
    fn adopt_mode_skips_required_checks() {
        let object = ConfigObject::new("v", "vault");

        assert!(validate(csp("vault"), &object, Mode::Adopt, VERSION).is_ok());
    }

    #[test]
    fn empty_id_is_rejected() {
        let object = ConfigObject::new("  ", "wait-for-passphrase").with("enabled", true);

        let errors = errors_of(validate(
            csp("wait-for-passphrase"),
            &object,
            Mode::Create,
            VERSION,
        ));

        assert_eq!(errors[0].attributes(), ["id"]);
    }

    #[test]
    fn default_satisfies_required_attribute() {
        static DESCRIPTOR: VariantDescriptor = VariantDescriptor {
            required: &["level"],
            defaults: &[DefaultValue::always("level", Literal::Int(3))],
            ..VariantDescriptor::new("leveled")
        };
        static FAMILY: Family = Family {
            name: "test",
            endpoint: "tests",
            attributes: &[AttributeDef::int("level")],
            common_required: &[],
            common_optional: &[],
            variants: std::slice::from_ref(&DESCRIPTOR),
        };
        let variant = FAMILY.variant("leveled").unwrap();

        let object = ConfigObject::new("t", "leveled");

        assert!(validate(variant, &object, Mode::Create, VERSION).is_ok());
    }
}

mod attributes {
    use super::*;

    #[test]
    fn attribute_of_another_variant_is_not_applicable() {
        let object = ConfigObject::new("pw", "file-based")
            .with("enabled", true)
            .with("password_file", "/secrets/pw")
            .with("secret_id", "prod/ds");

        let errors = errors_of(validate(csp("file-based"), &object, Mode::Create, VERSION));

        assert_eq!(
            errors,
            [ValidationError::NotApplicable {
                attribute: "secret_id".to_string(),
                variant: "file-based",
            }]
        );
    }

    #[test]
    fn null_foreign_attribute_is_fine() {
        let object = ConfigObject::new("pw", "file-based")
            .with("enabled", true)
            .with("password_file", "/secrets/pw")
            .with("secret_id", Value::Null);

        assert!(validate(csp("file-based"), &object, Mode::Create, VERSION).is_ok());
    }

    #[test]
    fn undeclared_attribute_is_unknown() {
        let object = ConfigObject::new("w", "wait-for-passphrase")
            .with("enabled", true)
            .with("colour", "blue");

        let errors = errors_of(validate(
            csp("wait-for-passphrase"),
            &object,
            Mode::Create,
            VERSION,
        ));

        assert_eq!(
            errors,
            [ValidationError::UnknownAttribute {
                attribute: "colour".to_string(),
                family: "cipher-stream-provider",
            }]
        );
    }

    #[test]
    fn wrong_kind_is_reported() {
        let object = ConfigObject::new("pw", "file-based")
            .with("enabled", "yes")
            .with("password_file", "/secrets/pw");

        let errors = errors_of(validate(csp("file-based"), &object, Mode::Create, VERSION));

        assert_eq!(
            errors,
            [ValidationError::WrongKind {
                attribute: "enabled".to_string(),
                expected: ValueKind::Bool,
                found: ValueKind::String,
            }]
        );
    }

    #[test]
    fn adopt_only_variant_cannot_be_created() {
        let criteria = variant("uncached-attribute-criteria", "default");
        let object = ConfigObject::new("Default", "default").with("enabled", true);

        let errors = errors_of(validate(criteria, &object, Mode::Create, VERSION));
        assert_eq!(errors, [ValidationError::AdoptOnly { variant: "default" }]);

        assert!(validate(criteria, &object, Mode::Adopt, VERSION).is_ok());
    }

    #[test]
    fn violations_are_collected_not_short_circuited() {
        let object = ConfigObject::new("", "vault")
            .with("enabled", 1_i64)
            .with("password_file", "/stray");

        let errors = errors_of(validate(csp("vault"), &object, Mode::Create, VERSION));

        assert_eq!(errors.len(), 5);
    }
}

mod rules {
    use super::*;

    fn kms() -> ConfigObject {
        ConfigObject::new("kms", "amazon-key-management-service")
            .with("enabled", true)
            .with("kms_encryption_key_arn", "arn:aws:kms:us-east-1:1:key/k")
    }

    #[test]
    fn access_key_without_secret_is_reported_once() {
        let object = kms().with("aws_access_key_id", "AKIA");

        let errors = errors_of(validate(
            csp("amazon-key-management-service"),
            &object,
            Mode::Create,
            VERSION,
        ));

        assert_eq!(
            errors,
            [ValidationError::Requires {
                attribute: "aws_secret_access_key".to_string(),
                because: "aws_access_key_id".to_string(),
            }]
        );
    }

    #[test]
    fn secret_without_access_key_is_reported() {
        let object = kms().with("aws_secret_access_key", "s3cr3t");

        let errors = errors_of(validate(
            csp("amazon-key-management-service"),
            &object,
            Mode::Create,
            VERSION,
        ));

        assert_eq!(errors[0].attributes(), ["aws_access_key_id"]);
    }

    #[test]
    fn both_keys_or_neither_pass() {
        let variant = csp("amazon-key-management-service");
        let both = kms()
            .with("aws_access_key_id", "AKIA")
            .with("aws_secret_access_key", "s3cr3t");

        assert!(validate(variant, &both, Mode::Create, VERSION).is_ok());
        assert!(validate(variant, &kms(), Mode::Create, VERSION).is_ok());
    }

    #[test]
    fn unknown_partner_satisfies_together_rule() {
        let object = kms()
            .with("aws_access_key_id", "AKIA")
            .with("aws_secret_access_key", Value::Unknown);

        assert!(
            validate(
                csp("amazon-key-management-service"),
                &object,
                Mode::Create,
                VERSION
            )
            .is_ok()
        );
    }

    #[test]
    fn exclusive_attributes_conflict() {
        let object = ConfigObject::new("asm", "amazon-secrets-manager")
            .with("enabled", true)
            .with("aws_external_server", "aws")
            .with("secret_id", "prod/ds")
            .with("secret_field_name", "passphrase")
            .with("secret_version_id", "v1")
            .with("secret_version_stage", "AWSCURRENT");

        let errors = errors_of(validate(
            csp("amazon-secrets-manager"),
            &object,
            Mode::Create,
            VERSION,
        ));

        assert_eq!(
            errors,
            [ValidationError::Exclusive {
                attributes: vec![
                    "secret_version_id".to_string(),
                    "secret_version_stage".to_string(),
                ],
            }]
        );
        assert_eq!(
            errors[0].to_string(),
            "Only one of 'secret_version_id', 'secret_version_stage' may be set"
        );
    }

    #[test]
    fn implication_requires_its_target() {
        let object = ConfigObject::new("v", "vault")
            .with("enabled", true)
            .with("vault_secret_path", "kv/ds")
            .with("vault_secret_field_name", "passphrase")
            .with("trust_store_pin", "changeit");

        let errors = errors_of(validate(csp("vault"), &object, Mode::Create, VERSION));

        assert_eq!(
            errors,
            [ValidationError::Requires {
                attribute: "trust_store_file".to_string(),
                because: "trust_store_pin".to_string(),
            }]
        );
    }

    #[test]
    fn rules_apply_in_adopt_mode_too() {
        let object = ConfigObject::new("p", "pkcs11")
            .with("key_store_pin", "1234")
            .with("key_store_pin_file", "/pin");

        let errors = errors_of(validate(csp("pkcs11"), &object, Mode::Adopt, VERSION));

        assert!(matches!(errors[..], [ValidationError::Exclusive { .. }]));
    }
}

mod version_gate {
    use super::*;

    fn with_iterations() -> ConfigObject {
        ConfigObject::new("pw", "file-based")
            .with("enabled", true)
            .with("password_file", "/secrets/pw")
            .with("iteration_count", 100_000_i64)
    }

    #[test]
    fn newer_attribute_is_rejected_on_older_server() {
        let err = check_version(csp("file-based"), &with_iterations(), ServerVersion::V9_2)
            .unwrap_err();

        match err {
            ReconcileError::UnsupportedOnVersion {
                configured,
                attributes,
            } => {
                assert_eq!(configured, ServerVersion::V9_2);
                assert_eq!(
                    attributes,
                    [VersionRequirement {
                        attribute: "iteration_count",
                        minimum: ServerVersion::V9_3,
                    }]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn newer_attribute_is_accepted_from_its_release() {
        for version in [ServerVersion::V9_3, ServerVersion::V10_0, ServerVersion::V10_1] {
            assert!(check_version(csp("file-based"), &with_iterations(), version).is_ok());
        }
    }

    #[test]
    fn unset_newer_attribute_is_not_checked() {
        let object = ConfigObject::new("pw", "file-based")
            .with("enabled", true)
            .with("iteration_count", Value::Null);

        assert!(check_version(csp("file-based"), &object, ServerVersion::V9_1).is_ok());
    }

    #[test]
    fn error_message_names_the_requirement() {
        let err = check_version(csp("file-based"), &with_iterations(), ServerVersion::V9_2)
            .unwrap_err();

        assert!(err.to_string().contains("'iteration_count' (requires 9.3"));
    }
}
