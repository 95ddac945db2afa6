//! Uncached attribute criteria: which attribute values the server keeps out
//! of its entry cache.

use super::{AttributeDef, DefaultValue, Family, Literal, VariantDescriptor};

static ATTRIBUTES: [AttributeDef; 9] = [
    AttributeDef::string("description"),
    AttributeDef::bool("enabled"),
    AttributeDef::string("script_class"),
    AttributeDef::set("script_argument"),
    AttributeDef::set("attribute_type"),
    AttributeDef::int("min_value_count"),
    AttributeDef::string("min_total_value_size"),
    AttributeDef::string("extension_class"),
    AttributeDef::set("extension_argument"),
];

static VARIANTS: [VariantDescriptor; 4] = [
    VariantDescriptor {
        adopt_only: true,
        ..VariantDescriptor::new("default")
    },
    VariantDescriptor {
        required: &["script_class"],
        optional: &["script_argument"],
        ..VariantDescriptor::new("groovy-scripted")
    },
    VariantDescriptor {
        required: &["attribute_type"],
        optional: &["min_value_count", "min_total_value_size"],
        defaults: &[
            DefaultValue::always("min_value_count", Literal::Int(0)),
            DefaultValue::always("min_total_value_size", Literal::String("0 bytes")),
        ],
        ..VariantDescriptor::new("simple")
    },
    VariantDescriptor {
        required: &["extension_class"],
        optional: &["extension_argument"],
        ..VariantDescriptor::new("third-party")
    },
];

/// The uncached attribute criteria family.
pub static FAMILY: Family = Family {
    name: "uncached-attribute-criteria",
    endpoint: "uncached-attribute-criteria",
    attributes: &ATTRIBUTES,
    common_required: &["enabled"],
    common_optional: &["description"],
    variants: &VARIANTS,
};
