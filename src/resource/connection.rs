//! Network gateway connection resource adapter
//!
//! Binds an internal network to a gateway over a flat or vlan L2
//! segment. The remote service assigns no canonical id to the binding;
//! its identity is the [`ConnectionId`] synthesized after a successful
//! connect call, persisted in colon-joined form and parsed back into the
//! typed record when the resource is restored.

use crate::api::types::{ConnectRequest, SegmentationType};
use crate::api::{DeleteDisposition, GatewayApi};
use crate::error::{ResourceError, ResourceResult};
use crate::resource::lifecycle::{Action, ResourceState, Status};
use crate::resource::properties::validate_properties;
use crate::resource::registry::{self, ResourceDef};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Marker for an absent segmentation id in the persisted form.
const NO_SEGMENTATION_ID: &str = "none";

/// Locally synthesized identity of a gateway connection.
///
/// Serialized to a single colon-joined string only at the persistence
/// boundary; everything else works on the five named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionId {
    pub gateway_id: String,
    pub network_id: String,
    pub segmentation_type: SegmentationType,
    pub segmentation_id: Option<u16>,
    pub port_id: String,
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let segmentation_id = match self.segmentation_id {
            Some(id) => id.to_string(),
            None => NO_SEGMENTATION_ID.to_string(),
        };
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.gateway_id, self.network_id, self.segmentation_type, segmentation_id, self.port_id
        )
    }
}

impl FromStr for ConnectionId {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [gateway_id, network_id, segmentation_type, segmentation_id, port_id]: [&str; 5] =
            parts.try_into().map_err(|_| {
                ResourceError::Validation(format!(
                    "malformed connection identifier {s:?}: expected five colon-joined fields"
                ))
            })?;

        let segmentation_type: SegmentationType = segmentation_type
            .parse()
            .map_err(ResourceError::Validation)?;
        let segmentation_id = match segmentation_id {
            NO_SEGMENTATION_ID => None,
            other => Some(other.parse::<u16>().map_err(|_| {
                ResourceError::Validation(format!(
                    "segmentation id {other:?} in connection identifier is not an integer"
                ))
            })?),
        };

        Ok(Self {
            gateway_id: gateway_id.to_string(),
            network_id: network_id.to_string(),
            segmentation_type,
            segmentation_id,
            port_id: port_id.to_string(),
        })
    }
}

/// Declared properties of a connection, after schema validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionProperties {
    pub network_gateway_id: String,
    /// Network name or id; resolved to the canonical id when the
    /// definition enables reference resolution.
    pub network_id: String,
    pub segmentation_type: SegmentationType,
    #[serde(default)]
    pub segmentation_id: Option<u16>,
}

/// Managed gateway connection resource
pub struct GatewayConnectionResource {
    api: Arc<dyn GatewayApi>,
    logical_name: String,
    properties: ConnectionProperties,
    connection: Option<ConnectionId>,
    state: ResourceState,
}

impl GatewayConnectionResource {
    pub const TYPE: &'static str = "network-gateway-connection";

    /// Build a resource from raw declared properties, validating them
    /// against the schema first.
    pub fn new(
        api: Arc<dyn GatewayApi>,
        logical_name: &str,
        properties: &Value,
    ) -> ResourceResult<Self> {
        validate_properties(Self::TYPE, Self::definition(), properties)?;
        let properties: ConnectionProperties = serde_json::from_value(properties.clone())
            .map_err(|e| ResourceError::Validation(e.to_string()))?;

        Ok(Self {
            api,
            logical_name: logical_name.to_string(),
            properties,
            connection: None,
            state: ResourceState::new(),
        })
    }

    fn definition() -> &'static ResourceDef {
        registry::get_resource(Self::TYPE).expect("connection definition is embedded")
    }

    /// Persistence form of the identifier, if one was assigned.
    pub fn resource_id(&self) -> Option<String> {
        self.connection.as_ref().map(ConnectionId::to_string)
    }

    /// Adopt a previously persisted identifier, parsing it back into the
    /// typed record.
    pub fn set_resource_id(&mut self, id: &str) -> ResourceResult<()> {
        self.connection = Some(id.parse()?);
        Ok(())
    }

    pub fn connection_id(&self) -> Option<&ConnectionId> {
        self.connection.as_ref()
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    /// Re-mark the recorded lifecycle state.
    pub fn state_set(&mut self, action: Action, status: Status, reason: &str) {
        self.state.state_set(action, status, reason);
    }

    /// Enforce the segmentation cross-field invariant. Runs before any
    /// network call.
    pub fn validate(&self) -> ResourceResult<()> {
        match (
            self.properties.segmentation_type,
            self.properties.segmentation_id,
        ) {
            (SegmentationType::Vlan, None) => Err(ResourceError::Validation(
                "segmentation_id must be specified for segmentation_type vlan".to_string(),
            )),
            (SegmentationType::Flat, Some(id)) if id != 0 => Err(ResourceError::Validation(
                "segmentation_id cannot be specified except 0 for segmentation_type flat"
                    .to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Connect the network to the gateway and synthesize the composite
    /// identifier from the request fields plus the returned port id.
    pub async fn create(&mut self) -> ResourceResult<()> {
        if self.state.action != Action::Init {
            return Err(ResourceError::InvalidState {
                attempted: Action::Create,
                action: self.state.action,
                status: self.state.status,
            });
        }
        self.validate()?;

        self.state.begin(Action::Create);
        match self.handle_create().await {
            Ok(connection) => {
                self.connection = Some(connection);
                self.state.complete();
                Ok(())
            }
            Err(err) => {
                self.state.fail(&err.to_string());
                Err(err)
            }
        }
    }

    async fn handle_create(&self) -> ResourceResult<ConnectionId> {
        let network_id = if Self::definition().resolve_network_refs {
            self.api
                .resolve_network(&self.properties.network_id)
                .await?
        } else {
            self.properties.network_id.clone()
        };

        let request = ConnectRequest {
            network_id: network_id.clone(),
            segmentation_type: self.properties.segmentation_type,
            segmentation_id: self.properties.segmentation_id,
        };
        let info = self
            .api
            .connect_gateway(&self.properties.network_gateway_id, &request)
            .await?;

        tracing::info!(
            resource = %self.logical_name,
            gateway_id = %self.properties.network_gateway_id,
            port_id = %info.port_id,
            "connected network to gateway"
        );

        Ok(ConnectionId {
            gateway_id: self.properties.network_gateway_id.clone(),
            network_id,
            segmentation_type: request.segmentation_type,
            segmentation_id: request.segmentation_id,
            port_id: info.port_id,
        })
    }

    /// Disconnect the network from the gateway, rebuilding the
    /// connect-time argument shape from the stored identifier. A
    /// not-found answer from the service counts as deleted.
    pub async fn delete(&mut self) -> ResourceResult<()> {
        let Some(connection) = self.connection.clone() else {
            tracing::debug!(resource = %self.logical_name, "delete with no identifier, nothing to do");
            return Ok(());
        };

        self.state.begin(Action::Delete);
        match self.handle_delete(&connection).await {
            Ok(()) => {
                self.state.complete();
                Ok(())
            }
            Err(err) => {
                self.state.fail(&err.to_string());
                Err(err)
            }
        }
    }

    async fn handle_delete(&self, connection: &ConnectionId) -> ResourceResult<()> {
        let request = ConnectRequest {
            network_id: connection.network_id.clone(),
            segmentation_type: connection.segmentation_type,
            segmentation_id: connection.segmentation_id,
        };

        match self
            .api
            .disconnect_gateway(&connection.gateway_id, &request)
            .await
        {
            Ok(()) => Ok(()),
            Err(err) => match DeleteDisposition::classify(&err) {
                DeleteDisposition::AlreadyGone => {
                    tracing::debug!(
                        gateway_id = %connection.gateway_id,
                        port_id = %connection.port_id,
                        "connection already absent"
                    );
                    Ok(())
                }
                DeleteDisposition::Failed => Err(err.into()),
            },
        }
    }

    /// Read one attribute. The service has no show call for connections,
    /// so the queryable attributes are exactly the fields of the stored
    /// identifier.
    pub fn attribute(&self, name: &str) -> ResourceResult<Value> {
        if !Self::definition().has_attribute(name) {
            return Err(ResourceError::UnknownAttribute {
                resource_type: Self::TYPE.to_string(),
                name: name.to_string(),
            });
        }

        let Some(connection) = &self.connection else {
            return Err(ResourceError::Validation(format!(
                "resource {} has no identifier yet",
                self.logical_name
            )));
        };

        let entity = json!({
            "network_gateway_id": connection.gateway_id,
            "network_id": connection.network_id,
            "segmentation_type": connection.segmentation_type.to_string(),
            "segmentation_id": connection.segmentation_id,
            "port_id": connection.port_id,
        });

        Ok(match name {
            "show" => entity,
            field => entity.get(field).cloned().unwrap_or(Value::Null),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConnectionId {
        ConnectionId {
            gateway_id: "ed4c03b9-8251-4c09-acc4-e59ee9e6aa37".to_string(),
            network_id: "6af055d3-26f6-48dd-a597-7611d7e58d35".to_string(),
            segmentation_type: SegmentationType::Vlan,
            segmentation_id: Some(10),
            port_id: "b22828ff-2abc-453e-9162-e4179240199b".to_string(),
        }
    }

    #[test]
    fn renders_the_colon_joined_persistence_form() {
        assert_eq!(
            sample().to_string(),
            "ed4c03b9-8251-4c09-acc4-e59ee9e6aa37:6af055d3-26f6-48dd-a597-7611d7e58d35:vlan:10:b22828ff-2abc-453e-9162-e4179240199b"
        );
    }

    #[test]
    fn parses_back_into_the_five_fields() {
        let parsed: ConnectionId =
            "ed4c03b9-8251-4c09-acc4-e59ee9e6aa37:6af055d3-26f6-48dd-a597-7611d7e58d35:vlan:10:b22828ff-2abc-453e-9162-e4179240199b"
                .parse()
                .unwrap();
        assert_eq!(parsed, sample());
        assert_eq!(parsed.segmentation_id, Some(10));
    }

    #[test]
    fn absent_segmentation_id_uses_the_none_marker() {
        let id = ConnectionId {
            segmentation_type: SegmentationType::Flat,
            segmentation_id: None,
            ..sample()
        };
        let rendered = id.to_string();
        assert!(rendered.contains(":flat:none:"));
        let parsed: ConnectionId = rendered.parse().unwrap();
        assert_eq!(parsed.segmentation_id, None);
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = "a:b:vlan:10".parse::<ConnectionId>().unwrap_err();
        assert!(matches!(err, ResourceError::Validation(_)));
    }

    #[test]
    fn rejects_unknown_segmentation_type() {
        let err = "a:b:gre:10:c".parse::<ConnectionId>().unwrap_err();
        assert!(matches!(err, ResourceError::Validation(_)));
    }

    #[test]
    fn rejects_non_integer_segmentation_id() {
        let err = "a:b:vlan:ten:c".parse::<ConnectionId>().unwrap_err();
        assert!(matches!(err, ResourceError::Validation(_)));
    }
}
