//! Network gateway resource adapter
//!
//! Owns create/read/update/delete of a gateway device group. The id is
//! assigned by the remote service at create time and stored as the
//! resource's identifier; deletion tolerates an already-absent entity
//! and optionally confirms by polling the show endpoint until the
//! service reports not-found.

use crate::api::types::{GatewayDevice, GatewaySpec, GatewayUpdate};
use crate::api::{DeleteDisposition, GatewayApi};
use crate::error::{ResourceError, ResourceResult};
use crate::resource::lifecycle::{Action, PollPolicy, ResourceState, Status};
use crate::resource::properties::validate_properties;
use crate::resource::registry::{self, ResourceDef, UpdatePolicy};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Declared properties of a gateway, after schema validation.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayProperties {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub devices: Vec<GatewayDevice>,
}

/// Property diff accepted by update; only mutable fields appear.
#[derive(Debug, Clone, Default, Deserialize)]
struct GatewayPropertyDiff {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    devices: Option<Vec<GatewayDevice>>,
}

/// Managed gateway resource
pub struct GatewayResource {
    api: Arc<dyn GatewayApi>,
    logical_name: String,
    properties: GatewayProperties,
    resource_id: Option<String>,
    state: ResourceState,
    poll: PollPolicy,
}

impl GatewayResource {
    pub const TYPE: &'static str = "network-gateway";

    /// Build a resource from raw declared properties, validating them
    /// against the schema first.
    pub fn new(
        api: Arc<dyn GatewayApi>,
        logical_name: &str,
        properties: &Value,
        poll: PollPolicy,
    ) -> ResourceResult<Self> {
        validate_properties(Self::TYPE, Self::definition(), properties)?;
        let properties: GatewayProperties = serde_json::from_value(properties.clone())
            .map_err(|e| ResourceError::Validation(e.to_string()))?;

        Ok(Self {
            api,
            logical_name: logical_name.to_string(),
            properties,
            resource_id: None,
            state: ResourceState::new(),
            poll,
        })
    }

    fn definition() -> &'static ResourceDef {
        registry::get_resource(Self::TYPE).expect("gateway definition is embedded")
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    /// Adopt a previously persisted identifier.
    pub fn set_resource_id(&mut self, id: &str) {
        self.resource_id = Some(id.to_string());
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    /// Re-mark the recorded lifecycle state.
    pub fn state_set(&mut self, action: Action, status: Status, reason: &str) {
        self.state.state_set(action, status, reason);
    }

    /// Entity name sent to the service: the declared name, or one derived
    /// from the logical resource name.
    fn physical_name(&self) -> String {
        match &self.properties.name {
            Some(name) => name.clone(),
            None => {
                let suffix = Uuid::new_v4().simple().to_string();
                format!("{}-{}", self.logical_name, &suffix[..12])
            }
        }
    }

    /// Create the gateway and store the server-assigned id.
    pub async fn create(&mut self) -> ResourceResult<()> {
        if self.state.action != Action::Init {
            return Err(ResourceError::InvalidState {
                attempted: Action::Create,
                action: self.state.action,
                status: self.state.status,
            });
        }

        self.state.begin(Action::Create);
        match self.handle_create().await {
            Ok(id) => {
                self.resource_id = Some(id);
                self.state.complete();
                Ok(())
            }
            Err(err) => {
                self.state.fail(&err.to_string());
                Err(err)
            }
        }
    }

    async fn handle_create(&self) -> ResourceResult<String> {
        let spec = GatewaySpec {
            name: Some(self.physical_name()),
            tenant_id: self.properties.tenant_id.clone(),
            devices: self.properties.devices.clone(),
        };

        let gateway = self.api.create_gateway(&spec).await?;
        tracing::info!(
            resource = %self.logical_name,
            gateway_id = %gateway.id,
            "created network gateway"
        );
        Ok(gateway.id)
    }

    /// Read one attribute back from the service.
    ///
    /// `show` returns the whole entity; `default` is derived as a boolean
    /// even when the service reports it as null.
    pub async fn attribute(&self, name: &str) -> ResourceResult<Value> {
        if !Self::definition().has_attribute(name) {
            return Err(ResourceError::UnknownAttribute {
                resource_type: Self::TYPE.to_string(),
                name: name.to_string(),
            });
        }

        let Some(id) = &self.resource_id else {
            return Err(ResourceError::Validation(format!(
                "resource {} has no identifier yet",
                self.logical_name
            )));
        };

        let gateway = self.api.show_gateway(id).await?;
        let entity = serde_json::to_value(&gateway).unwrap_or(Value::Null);

        Ok(match name {
            "show" => entity,
            "default" => Value::Bool(
                entity
                    .get("default")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            ),
            field => entity.get(field).cloned().unwrap_or(Value::Null),
        })
    }

    /// Delete the gateway. A resource that never got an identifier is a
    /// successful no-op; a not-found answer from the service counts as
    /// deleted.
    pub async fn delete(&mut self) -> ResourceResult<()> {
        let Some(id) = self.resource_id.clone() else {
            tracing::debug!(resource = %self.logical_name, "delete with no identifier, nothing to do");
            return Ok(());
        };

        self.state.begin(Action::Delete);
        match self.handle_delete(&id).await {
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

    async fn handle_delete(&self, id: &str) -> ResourceResult<()> {
        match self.api.delete_gateway(id).await {
            Ok(()) => self.confirm_delete(id).await,
            Err(err) => match DeleteDisposition::classify(&err) {
                DeleteDisposition::AlreadyGone => {
                    tracing::debug!(gateway_id = %id, "gateway already absent");
                    Ok(())
                }
                DeleteDisposition::Failed => Err(err.into()),
            },
        }
    }

    /// Poll the show endpoint until the service reports not-found,
    /// bounded by the poll policy.
    async fn confirm_delete(&self, id: &str) -> ResourceResult<()> {
        if self.poll.is_disabled() {
            return Ok(());
        }

        for attempt in 1..=self.poll.max_attempts {
            match self.api.show_gateway(id).await {
                Err(err) if err.is_not_found() => return Ok(()),
                Err(err) => return Err(err.into()),
                Ok(_) => {
                    tracing::debug!(gateway_id = %id, attempt, "gateway still reported by the service");
                    if attempt < self.poll.max_attempts {
                        tokio::time::sleep(self.poll.delay).await;
                    }
                }
            }
        }

        Err(ResourceError::Timeout(format!(
            "gateway {id} still present after delete"
        )))
    }

    /// Apply a property diff.
    ///
    /// Honors the definition's update policy: `in_place` re-sends the
    /// full mutable property set; `replace` (or a diff touching an
    /// immutable property) signals that the resource must be replaced.
    pub async fn update(&mut self, diff: &Value) -> ResourceResult<()> {
        let def = Self::definition();
        if def.update_policy == UpdatePolicy::Replace {
            return Err(ResourceError::UpdateReplace);
        }

        let Some(map) = diff.as_object() else {
            return Err(ResourceError::Validation(
                "property diff must be a map".to_string(),
            ));
        };
        for key in map.keys() {
            match def.properties.get(key) {
                Some(spec) if spec.update_allowed => {}
                Some(_) => return Err(ResourceError::UpdateReplace),
                None => {
                    return Err(ResourceError::Validation(format!(
                        "unknown property {key:?} for resource type {}",
                        Self::TYPE
                    )))
                }
            }
        }

        let Some(id) = self.resource_id.clone() else {
            return Err(ResourceError::Validation(format!(
                "resource {} has no identifier yet",
                self.logical_name
            )));
        };

        self.state.begin(Action::Update);
        match self.handle_update(&id, diff).await {
            Ok(merged) => {
                self.properties = merged;
                self.state.complete();
                Ok(())
            }
            Err(err) => {
                self.state.fail(&err.to_string());
                Err(err)
            }
        }
    }

    async fn handle_update(&self, id: &str, diff: &Value) -> ResourceResult<GatewayProperties> {
        let diff: GatewayPropertyDiff = serde_json::from_value(diff.clone())
            .map_err(|e| ResourceError::Validation(e.to_string()))?;

        let mut merged = self.properties.clone();
        if let Some(name) = diff.name {
            merged.name = Some(name);
        }
        if let Some(devices) = diff.devices {
            merged.devices = devices;
        }

        let update = GatewayUpdate {
            name: merged.name.clone(),
            devices: Some(merged.devices.clone()),
        };
        self.api.update_gateway(id, &update).await?;
        tracing::info!(resource = %self.logical_name, gateway_id = %id, "updated network gateway");
        Ok(merged)
    }
}
