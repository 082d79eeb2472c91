//! Declared-property validation
//!
//! Raw template properties are validated against a resource definition
//! before any lifecycle hook runs: unknown keys, missing required keys,
//! value types, allowed-value sets, numeric ranges and nested element
//! schemas. Cross-field rules (like the segmentation invariant) belong
//! to the owning adapter's `validate`.

use crate::error::{ResourceError, ResourceResult};
use crate::resource::registry::{PropertySpec, PropertyType, ResourceDef};
use serde_json::Value;
use std::collections::HashMap;

/// Validate raw declared properties against a resource definition.
pub fn validate_properties(
    resource_type: &str,
    def: &ResourceDef,
    properties: &Value,
) -> ResourceResult<()> {
    let Some(map) = properties.as_object() else {
        return Err(ResourceError::Validation(format!(
            "properties for {resource_type} must be a map"
        )));
    };

    for key in map.keys() {
        if !def.properties.contains_key(key) {
            return Err(ResourceError::Validation(format!(
                "unknown property {key:?} for resource type {resource_type}"
            )));
        }
    }

    for (name, spec) in &def.properties {
        match map.get(name) {
            None | Some(Value::Null) => {
                if spec.required {
                    return Err(ResourceError::Validation(format!(
                        "property {name:?} is required"
                    )));
                }
            }
            Some(value) => validate_value(name, spec, value)?,
        }
    }

    Ok(())
}

fn validate_value(name: &str, spec: &PropertySpec, value: &Value) -> ResourceResult<()> {
    match spec.kind {
        PropertyType::String => {
            let Some(s) = value.as_str() else {
                return Err(type_error(name, "a string", value));
            };
            if let Some(allowed) = &spec.allowed_values {
                if !allowed.iter().any(|a| a == s) {
                    return Err(ResourceError::Validation(format!(
                        "property {name:?} must be one of {allowed:?}, got {s:?}"
                    )));
                }
            }
        }
        PropertyType::Integer => {
            let Some(n) = value.as_i64() else {
                return Err(type_error(name, "an integer", value));
            };
            if let Some(range) = &spec.range {
                if n < range.min || n > range.max {
                    return Err(ResourceError::Validation(format!(
                        "property {name:?} must be in range {}..={}, got {n}",
                        range.min, range.max
                    )));
                }
            }
        }
        PropertyType::Boolean => {
            if value.as_bool().is_none() {
                return Err(type_error(name, "a boolean", value));
            }
        }
        PropertyType::List => {
            let Some(entries) = value.as_array() else {
                return Err(type_error(name, "a list", value));
            };
            if let Some(schema) = &spec.schema {
                for (index, entry) in entries.iter().enumerate() {
                    let element = format!("{name}[{index}]");
                    validate_element(&element, schema, entry)?;
                }
            }
        }
        PropertyType::Map => {
            if value.as_object().is_none() {
                return Err(type_error(name, "a map", value));
            }
        }
    }

    Ok(())
}

/// Validate one list element against its element schema.
fn validate_element(
    element: &str,
    schema: &HashMap<String, PropertySpec>,
    value: &Value,
) -> ResourceResult<()> {
    let Some(map) = value.as_object() else {
        return Err(type_error(element, "a map", value));
    };

    for key in map.keys() {
        if !schema.contains_key(key) {
            return Err(ResourceError::Validation(format!(
                "unknown key {key:?} in {element}"
            )));
        }
    }

    for (name, spec) in schema {
        let qualified = format!("{element}.{name}");
        match map.get(name) {
            None | Some(Value::Null) => {
                if spec.required {
                    return Err(ResourceError::Validation(format!(
                        "property {qualified:?} is required"
                    )));
                }
            }
            Some(value) => validate_value(&qualified, spec, value)?,
        }
    }

    Ok(())
}

fn type_error(name: &str, expected: &str, value: &Value) -> ResourceError {
    ResourceError::Validation(format!("property {name:?} must be {expected}, got {value}"))
}
