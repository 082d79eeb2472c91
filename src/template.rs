//! Declarative template parsing
//!
//! A template is a YAML (or JSON) document with a `resources` map of
//! logical name to `{type, properties}`. Declaration order is preserved
//! so apply can walk resources in order and delete can walk them in
//! reverse. Cross-resource references and dependency ordering belong to
//! the stack engine, not to this crate.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// One declared resource: a registry type key plus raw properties.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default = "empty_properties")]
    pub properties: Value,
}

fn empty_properties() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Parsed template document.
#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "ordered_resources")]
    pub resources: Vec<(String, TemplateResource)>,
}

impl Template {
    /// Parse a YAML or JSON template document.
    pub fn parse(input: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(input)
    }

    /// Find a declared resource by logical name.
    pub fn resource(&self, name: &str) -> Option<&TemplateResource> {
        self.resources
            .iter()
            .find(|(logical, _)| logical == name)
            .map(|(_, resource)| resource)
    }
}

/// Deserialize the `resources` map into a vector preserving declaration
/// order.
fn ordered_resources<'de, D>(deserializer: D) -> Result<Vec<(String, TemplateResource)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedVisitor;

    impl<'de> Visitor<'de> for OrderedVisitor {
        type Value = Vec<(String, TemplateResource)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of logical resource name to resource")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut resources = Vec::new();
            while let Some((name, resource)) = map.next_entry::<String, TemplateResource>()? {
                resources.push((name, resource));
            }
            Ok(resources)
        }
    }

    deserializer.deserialize_map(OrderedVisitor)
}
