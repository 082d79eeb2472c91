//! Resource Registry - Load resource definitions from JSON
//!
//! This module loads the resource definitions from embedded JSON files
//! and provides lookup functions for the rest of the crate. A definition
//! carries the declarative property schema, the readable attributes
//! schema, and the capability flags of the resource type.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded definition JSON files (compiled into the binary)
const DEFINITION_FILES: &[&str] = &[
    include_str!("defs/gateway.json"),
    include_str!("defs/connection.json"),
];

/// Value type of a declared property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Boolean,
    List,
    Map,
}

/// Closed numeric range constraint
#[derive(Debug, Clone, Deserialize)]
pub struct RangeConstraint {
    pub min: i64,
    pub max: i64,
}

/// One property of a resource type's schema
#[derive(Debug, Clone, Deserialize)]
pub struct PropertySpec {
    #[serde(rename = "type")]
    pub kind: PropertyType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub update_allowed: bool,
    /// Closed set of accepted values
    #[serde(default)]
    pub allowed_values: Option<Vec<String>>,
    /// Accepted numeric range (integer properties)
    #[serde(default)]
    pub range: Option<RangeConstraint>,
    /// Element schema for list entries (each entry is a map)
    #[serde(default)]
    pub schema: Option<HashMap<String, PropertySpec>>,
}

/// How a property change is applied to a live resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Mutable fields are re-sent in place via the update call
    InPlace,
    /// Any property change forces replacement of the resource
    Replace,
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    pub update_policy: UpdatePolicy,
    /// Resolve network name-or-id references before calling the service
    #[serde(default)]
    pub resolve_network_refs: bool,
    pub properties: HashMap<String, PropertySpec>,
    /// Readable attribute names with human descriptions
    pub attributes: HashMap<String, String>,
}

impl ResourceDef {
    /// Whether the attributes schema declares the given name
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

/// Root structure of defs/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct DefinitionConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<DefinitionConfig> = OnceLock::new();

/// Get the definition registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static DefinitionConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = DefinitionConfig {
            resources: HashMap::new(),
        };

        for content in DEFINITION_FILES {
            let partial: DefinitionConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded definition JSON: {}", e));
            final_config.resources.extend(partial.resources);
        }

        final_config
    })
}

/// Get a resource definition by type key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// Get all registered type keys
pub fn get_all_resource_keys() -> Vec<&'static str> {
    get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect()
}
