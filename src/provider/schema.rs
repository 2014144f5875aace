//! Schema building blocks shared by every resource and data source.

use std::collections::HashMap;
use tf_provider::{
    Attribute, AttributeConstraint, AttributeType, Block, Description, NestedBlock, Schema,
};

pub fn attribute(
    attr_type: AttributeType,
    constraint: AttributeConstraint,
    description: &str,
) -> Attribute {
    Attribute {
        attr_type,
        description: Description::plain(description),
        constraint,
        sensitive: false,
        deprecated: false,
        ..Default::default()
    }
}

pub fn required(attr_type: AttributeType, description: &str) -> Attribute {
    attribute(attr_type, AttributeConstraint::Required, description)
}

pub fn optional(attr_type: AttributeType, description: &str) -> Attribute {
    attribute(attr_type, AttributeConstraint::Optional, description)
}

pub fn computed(attr_type: AttributeType, description: &str) -> Attribute {
    attribute(attr_type, AttributeConstraint::Computed, description)
}

pub fn optional_computed(attr_type: AttributeType, description: &str) -> Attribute {
    attribute(attr_type, AttributeConstraint::OptionalComputed, description)
}

pub fn sensitive(mut attr: Attribute) -> Attribute {
    attr.sensitive = true;
    attr
}

pub fn deprecated(mut attr: Attribute) -> Attribute {
    attr.deprecated = true;
    attr
}

pub fn string_list() -> AttributeType {
    AttributeType::List(Box::new(AttributeType::String))
}

pub fn string_map() -> AttributeType {
    AttributeType::Map(Box::new(AttributeType::String))
}

pub fn object(fields: &[(&str, AttributeType)]) -> AttributeType {
    AttributeType::Object(
        fields
            .iter()
            .map(|(name, t)| (name.to_string(), t.clone()))
            .collect(),
    )
}

/// `metadata_read_only` 的 (key, value, read_only) 物件清單
pub fn metadata_read_only() -> Attribute {
    computed(
        AttributeType::List(Box::new(object(&[
            ("key", AttributeType::String),
            ("value", AttributeType::String),
            ("read_only", AttributeType::Bool),
        ]))),
        "A list of read-only metadata items, e.g. tags.",
    )
}

pub fn last_updated() -> Attribute {
    optional_computed(
        AttributeType::String,
        "The timestamp of the last update (use with update context).",
    )
}

/// project / region 四個欄位，id 與名稱二擇一
pub fn scope_attributes() -> Vec<(&'static str, Attribute)> {
    vec![
        (
            "project_id",
            optional(
                AttributeType::Number,
                "The uuid of the project. Either 'project_id' or 'project_name' must be specified.",
            ),
        ),
        (
            "project_name",
            optional(
                AttributeType::String,
                "The name of the project. Either 'project_id' or 'project_name' must be specified.",
            ),
        ),
        (
            "region_id",
            optional(
                AttributeType::Number,
                "The uuid of the region. Either 'region_id' or 'region_name' must be specified.",
            ),
        ),
        (
            "region_name",
            optional(
                AttributeType::String,
                "The name of the region. Either 'region_id' or 'region_name' must be specified.",
            ),
        ),
    ]
}

pub fn block(
    description: &str,
    attributes: Vec<(&str, Attribute)>,
    blocks: Vec<(&str, NestedBlock)>,
) -> Block {
    Block {
        attributes: attributes
            .into_iter()
            .map(|(name, attr)| (name.to_string(), attr))
            .collect::<HashMap<_, _>>(),
        blocks: blocks
            .into_iter()
            .map(|(name, nested)| (name.to_string(), nested))
            .collect::<HashMap<_, _>>(),
        description: Description::plain(description),
        ..Default::default()
    }
}

/// 帶 scope 欄位的頂層 schema
pub fn scoped_schema(
    description: &str,
    mut attributes: Vec<(&str, Attribute)>,
    blocks: Vec<(&str, NestedBlock)>,
) -> Schema {
    attributes.push(("id", computed(AttributeType::String, "The resource id.")));
    attributes.extend(scope_attributes());
    Schema {
        version: 1,
        block: block(description, attributes, blocks),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_schema_has_scope_and_id() {
        let schema = scoped_schema(
            "test",
            vec![("name", required(AttributeType::String, "name"))],
            vec![],
        );
        for name in ["id", "name", "project_id", "project_name", "region_id", "region_name"] {
            assert!(schema.block.attributes.contains_key(name), "missing {}", name);
        }
    }

    #[test]
    fn test_sensitive_flag() {
        let attr = sensitive(optional(AttributeType::String, "password"));
        assert!(attr.sensitive);
        assert!(!attr.deprecated);
    }
}
