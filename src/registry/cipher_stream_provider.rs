//! Cipher stream providers: where the server gets the key material that
//! protects its encryption settings database.

use crate::model::ServerVersion;

use super::{AttributeDef, DefaultValue, Family, Literal, Rule, VariantDescriptor};

/// Default PBKDF2 iteration count, introduced with 9.3.
pub const DEFAULT_ITERATION_COUNT: i64 = 600_000;

const ITERATION_COUNT: DefaultValue = DefaultValue::since(
    "iteration_count",
    Literal::Int(DEFAULT_ITERATION_COUNT),
    ServerVersion::V9_3,
);

static ATTRIBUTES: [AttributeDef; 40] = [
    AttributeDef::string("description"),
    AttributeDef::bool("enabled"),
    // amazon
    AttributeDef::string("aws_external_server"),
    AttributeDef::string("aws_access_key_id"),
    AttributeDef::string("aws_secret_access_key").sensitive(),
    AttributeDef::string("aws_region_name"),
    AttributeDef::string("kms_encryption_key_arn"),
    AttributeDef::string("secret_id"),
    AttributeDef::string("secret_field_name"),
    AttributeDef::string("secret_version_id"),
    AttributeDef::string("secret_version_stage"),
    // azure
    AttributeDef::string("key_vault_uri"),
    AttributeDef::string("azure_authentication_method"),
    AttributeDef::string("http_proxy_external_server"),
    AttributeDef::string("secret_name"),
    // file-based
    AttributeDef::string("password_file"),
    AttributeDef::bool("wait_for_password_file"),
    // conjur
    AttributeDef::string("conjur_external_server"),
    AttributeDef::string("conjur_secret_relative_path"),
    // pkcs11
    AttributeDef::string("pkcs11_provider_class"),
    AttributeDef::string("pkcs11_provider_configuration_file"),
    AttributeDef::string("key_store_pin").sensitive(),
    AttributeDef::string("key_store_pin_file"),
    AttributeDef::string("key_store_pin_environment_variable"),
    AttributeDef::string("pkcs11_key_store_type"),
    AttributeDef::string("ssl_cert_nickname"),
    // vault
    AttributeDef::string("vault_external_server"),
    AttributeDef::set("vault_server_base_url"),
    AttributeDef::string("vault_authentication_method"),
    AttributeDef::string("vault_secret_path"),
    AttributeDef::string("vault_secret_field_name"),
    AttributeDef::string("vault_encryption_metadata_file"),
    AttributeDef::string("trust_store_file"),
    AttributeDef::string("trust_store_pin").sensitive(),
    AttributeDef::string("trust_store_type"),
    // shared by the key-wrapping variants
    AttributeDef::string("encryption_metadata_file"),
    AttributeDef::string("encrypted_passphrase_file"),
    AttributeDef::int("iteration_count").since(ServerVersion::V9_3),
    // third-party
    AttributeDef::string("extension_class"),
    AttributeDef::set("extension_argument"),
];

static VARIANTS: [VariantDescriptor; 9] = [
    VariantDescriptor {
        required: &["kms_encryption_key_arn"],
        optional: &[
            "encrypted_passphrase_file",
            "aws_external_server",
            "aws_access_key_id",
            "aws_secret_access_key",
            "aws_region_name",
            "iteration_count",
        ],
        defaults: &[
            DefaultValue::always(
                "encrypted_passphrase_file",
                Literal::String("config/encrypted-passphrase"),
            ),
            ITERATION_COUNT,
        ],
        rules: &[
            Rule::Together(&["aws_access_key_id", "aws_secret_access_key"]),
            Rule::Exclusive(&["aws_external_server", "aws_access_key_id"]),
        ],
        ..VariantDescriptor::new("amazon-key-management-service")
    },
    VariantDescriptor {
        required: &["aws_external_server", "secret_id", "secret_field_name"],
        optional: &[
            "secret_version_id",
            "secret_version_stage",
            "encryption_metadata_file",
            "iteration_count",
        ],
        defaults: &[
            DefaultValue::always(
                "encryption_metadata_file",
                Literal::String("config/amazon-secrets-manager-encryption-metadata"),
            ),
            ITERATION_COUNT,
        ],
        rules: &[Rule::Exclusive(&["secret_version_id", "secret_version_stage"])],
        ..VariantDescriptor::new("amazon-secrets-manager")
    },
    VariantDescriptor {
        required: &["key_vault_uri", "azure_authentication_method", "secret_name"],
        optional: &[
            "http_proxy_external_server",
            "encryption_metadata_file",
            "iteration_count",
        ],
        defaults: &[
            DefaultValue::always(
                "encryption_metadata_file",
                Literal::String("config/azure-key-vault-encryption-metadata"),
            ),
            ITERATION_COUNT,
        ],
        ..VariantDescriptor::new("azure-key-vault")
    },
    VariantDescriptor {
        required: &["password_file"],
        optional: &[
            "wait_for_password_file",
            "encryption_metadata_file",
            "iteration_count",
        ],
        defaults: &[
            DefaultValue::always("wait_for_password_file", Literal::Bool(true)),
            DefaultValue::always(
                "encryption_metadata_file",
                Literal::String("config/password-encryption-metadata"),
            ),
            ITERATION_COUNT,
        ],
        ..VariantDescriptor::new("file-based")
    },
    VariantDescriptor::new("wait-for-passphrase"),
    VariantDescriptor {
        required: &["conjur_external_server", "conjur_secret_relative_path"],
        optional: &["encryption_metadata_file", "iteration_count"],
        defaults: &[
            DefaultValue::always(
                "encryption_metadata_file",
                Literal::String("config/conjur-encryption-metadata"),
            ),
            ITERATION_COUNT,
        ],
        ..VariantDescriptor::new("conjur")
    },
    VariantDescriptor {
        required: &["ssl_cert_nickname"],
        optional: &[
            "pkcs11_provider_class",
            "pkcs11_provider_configuration_file",
            "key_store_pin",
            "key_store_pin_file",
            "key_store_pin_environment_variable",
            "pkcs11_key_store_type",
            "encryption_metadata_file",
            "iteration_count",
        ],
        defaults: &[
            DefaultValue::always("pkcs11_key_store_type", Literal::String("PKCS11")),
            DefaultValue::always(
                "encryption_metadata_file",
                Literal::String("config/util-pkcs11-encryption-metadata"),
            ),
            ITERATION_COUNT,
        ],
        rules: &[
            Rule::Exclusive(&[
                "key_store_pin",
                "key_store_pin_file",
                "key_store_pin_environment_variable",
            ]),
            Rule::Implies("pkcs11_provider_configuration_file", "pkcs11_provider_class"),
        ],
        ..VariantDescriptor::new("pkcs11")
    },
    VariantDescriptor {
        required: &["vault_secret_path", "vault_secret_field_name"],
        optional: &[
            "vault_external_server",
            "vault_server_base_url",
            "vault_authentication_method",
            "vault_encryption_metadata_file",
            "trust_store_file",
            "trust_store_pin",
            "trust_store_type",
            "iteration_count",
        ],
        defaults: &[
            DefaultValue::always(
                "vault_encryption_metadata_file",
                Literal::String("config/vault-encryption-metadata"),
            ),
            ITERATION_COUNT,
        ],
        rules: &[
            Rule::Exclusive(&["vault_external_server", "vault_server_base_url"]),
            Rule::Implies("vault_server_base_url", "vault_authentication_method"),
            Rule::Implies("trust_store_pin", "trust_store_file"),
        ],
        ..VariantDescriptor::new("vault")
    },
    VariantDescriptor {
        required: &["extension_class"],
        optional: &["extension_argument"],
        ..VariantDescriptor::new("third-party")
    },
];

/// The cipher stream provider family.
pub static FAMILY: Family = Family {
    name: "cipher-stream-provider",
    endpoint: "cipher-stream-providers",
    attributes: &ATTRIBUTES,
    common_required: &["enabled"],
    common_optional: &["description"],
    variants: &VARIANTS,
};
