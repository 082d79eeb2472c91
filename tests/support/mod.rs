//! Shared test support: an in-memory recording implementation of the
//! gateway API capability.

use async_trait::async_trait;
use netgw::api::types::{
    ConnectRequest, ConnectionInfo, Gateway, GatewaySpec, GatewayUpdate,
};
use netgw::api::{ApiError, ApiResult, GatewayApi};
use std::collections::HashMap;
use std::sync::Mutex;

fn status_error(status: u16, message: &str) -> ApiError {
    ApiError::Status {
        status,
        message: message.to_string(),
    }
}

/// In-memory gateway service that records every call it receives.
#[derive(Default)]
pub struct RecordingApi {
    /// Method names in invocation order.
    pub calls: Mutex<Vec<String>>,
    /// (gateway id, request) pairs seen by disconnect.
    pub disconnects: Mutex<Vec<(String, ConnectRequest)>>,
    gateways: Mutex<HashMap<String, Gateway>>,
    created: Mutex<u32>,
    /// When set, every delete fails with this status.
    delete_status: Mutex<Option<u16>>,
    /// When set, every disconnect fails with this status.
    disconnect_status: Mutex<Option<u16>>,
    /// Port id handed out by connect.
    port_id: Mutex<String>,
}

impl RecordingApi {
    pub fn new() -> Self {
        let api = Self::default();
        *api.port_id.lock().unwrap() = "port-1".to_string();
        api
    }

    pub fn with_port_id(self, port_id: &str) -> Self {
        *self.port_id.lock().unwrap() = port_id.to_string();
        self
    }

    pub fn fail_deletes_with(&self, status: u16) {
        *self.delete_status.lock().unwrap() = Some(status);
    }

    pub fn fail_disconnects_with(&self, status: u16) {
        *self.disconnect_status.lock().unwrap() = Some(status);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl GatewayApi for RecordingApi {
    async fn create_gateway(&self, spec: &GatewaySpec) -> ApiResult<Gateway> {
        self.record("create_gateway");
        let mut created = self.created.lock().unwrap();
        *created += 1;
        let gateway = Gateway {
            id: format!("gw-{}", *created),
            name: spec.name.clone(),
            tenant_id: spec.tenant_id.clone(),
            devices: spec.devices.clone(),
            default: None,
        };
        self.gateways
            .lock()
            .unwrap()
            .insert(gateway.id.clone(), gateway.clone());
        Ok(gateway)
    }

    async fn show_gateway(&self, gateway_id: &str) -> ApiResult<Gateway> {
        self.record("show_gateway");
        self.gateways
            .lock()
            .unwrap()
            .get(gateway_id)
            .cloned()
            .ok_or_else(|| status_error(404, "no such gateway"))
    }

    async fn update_gateway(&self, gateway_id: &str, update: &GatewayUpdate) -> ApiResult<Gateway> {
        self.record("update_gateway");
        let mut gateways = self.gateways.lock().unwrap();
        let gateway = gateways
            .get_mut(gateway_id)
            .ok_or_else(|| status_error(404, "no such gateway"))?;
        if let Some(name) = &update.name {
            gateway.name = Some(name.clone());
        }
        if let Some(devices) = &update.devices {
            gateway.devices = devices.clone();
        }
        Ok(gateway.clone())
    }

    async fn delete_gateway(&self, gateway_id: &str) -> ApiResult<()> {
        self.record("delete_gateway");
        if let Some(status) = *self.delete_status.lock().unwrap() {
            return Err(status_error(status, "delete refused"));
        }
        match self.gateways.lock().unwrap().remove(gateway_id) {
            Some(_) => Ok(()),
            None => Err(status_error(404, "no such gateway")),
        }
    }

    async fn connect_gateway(
        &self,
        _gateway_id: &str,
        _request: &ConnectRequest,
    ) -> ApiResult<ConnectionInfo> {
        self.record("connect_gateway");
        Ok(ConnectionInfo {
            network_gateway_id: None,
            network_id: None,
            port_id: self.port_id.lock().unwrap().clone(),
        })
    }

    async fn disconnect_gateway(
        &self,
        gateway_id: &str,
        request: &ConnectRequest,
    ) -> ApiResult<()> {
        self.record("disconnect_gateway");
        self.disconnects
            .lock()
            .unwrap()
            .push((gateway_id.to_string(), request.clone()));
        if let Some(status) = *self.disconnect_status.lock().unwrap() {
            return Err(status_error(status, "disconnect refused"));
        }
        Ok(())
    }

    async fn resolve_network(&self, name_or_id: &str) -> ApiResult<String> {
        self.record("resolve_network");
        Ok(name_or_id.to_string())
    }
}
