//! Wire structures for the admin API
//!
//! The service speaks JSON with single-key envelopes around each entity
//! (`{"network_gateway": ...}`, `{"connection_info": ...}`). Optional
//! fields that are unset are stripped from request bodies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A device joined into a gateway: device id plus interface name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayDevice {
    pub id: String,
    pub interface_name: String,
}

/// Gateway entity as reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gateway {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub devices: Vec<GatewayDevice>,
    /// The service reports this as true, false or null.
    #[serde(default)]
    pub default: Option<bool>,
}

/// Create-time request body for a gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewaySpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    pub devices: Vec<GatewayDevice>,
}

/// Update request body; carries only the mutable fields. The device list
/// is replaced wholesale, never diffed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<GatewayDevice>>,
}

/// L2 segmentation strategy on the external side of a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentationType {
    /// Untagged traffic.
    Flat,
    /// Tagged traffic with a segment id.
    Vlan,
}

impl fmt::Display for SegmentationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SegmentationType::Flat => "flat",
            SegmentationType::Vlan => "vlan",
        })
    }
}

impl FromStr for SegmentationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(SegmentationType::Flat),
            "vlan" => Ok(SegmentationType::Vlan),
            other => Err(format!("unsupported segmentation type {other:?}")),
        }
    }
}

/// Argument shape shared by connect and disconnect calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub network_id: String,
    pub segmentation_type: SegmentationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segmentation_id: Option<u16>,
}

/// Connect result. The port id is the only field this crate relies on;
/// the rest is echoed context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    #[serde(default)]
    pub network_gateway_id: Option<String>,
    #[serde(default)]
    pub network_id: Option<String>,
    pub port_id: String,
}

/// `{"network_gateway": ...}` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayEnvelope {
    pub network_gateway: Gateway,
}

/// `{"connection_info": ...}` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionEnvelope {
    pub connection_info: ConnectionInfo,
}

/// One entry of a `{"networks": [...]}` listing, as used for name-or-id
/// resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `{"networks": [...]}` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkListEnvelope {
    #[serde(default)]
    pub networks: Vec<NetworkRef>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_optionals_are_stripped_from_spec() {
        let spec = GatewaySpec {
            name: None,
            tenant_id: None,
            devices: vec![GatewayDevice {
                id: "dev-1".to_string(),
                interface_name: "breth1".to_string(),
            }],
        };
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            value,
            json!({"devices": [{"id": "dev-1", "interface_name": "breth1"}]})
        );
    }

    #[test]
    fn connect_request_omits_absent_segmentation_id() {
        let request = ConnectRequest {
            network_id: "net-1".to_string(),
            segmentation_type: SegmentationType::Flat,
            segmentation_id: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"network_id": "net-1", "segmentation_type": "flat"})
        );
    }

    #[test]
    fn connect_request_carries_integer_segmentation_id() {
        let request = ConnectRequest {
            network_id: "net-1".to_string(),
            segmentation_type: SegmentationType::Vlan,
            segmentation_id: Some(10),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["segmentation_id"], json!(10));
    }

    #[test]
    fn segmentation_type_round_trips_through_str() {
        assert_eq!("flat".parse::<SegmentationType>().unwrap(), SegmentationType::Flat);
        assert_eq!("vlan".parse::<SegmentationType>().unwrap(), SegmentationType::Vlan);
        assert!("gre".parse::<SegmentationType>().is_err());
        assert_eq!(SegmentationType::Vlan.to_string(), "vlan");
    }

    #[test]
    fn gateway_tolerates_null_default_flag() {
        let gateway: Gateway = serde_json::from_value(json!({
            "id": "a1349845-80ff-49bf-82bf-6be454d41560",
            "name": "gw",
            "default": null
        }))
        .unwrap();
        assert_eq!(gateway.default, None);
        assert!(gateway.devices.is_empty());
    }
}
