//! Admin API client
//!
//! Concrete [`GatewayApi`] implementation over the networking service's
//! REST surface, combining URL building and HTTP plumbing.

use super::http::AdminHttpClient;
use super::types::{
    ConnectRequest, ConnectionEnvelope, ConnectionInfo, Gateway, GatewayEnvelope, GatewaySpec,
    GatewayUpdate, NetworkListEnvelope,
};
use super::{ApiError, ApiResult, GatewayApi};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

/// Client for the networking service admin API
#[derive(Clone)]
pub struct AdminClient {
    base: Url,
    token: String,
    http: AdminHttpClient,
}

impl AdminClient {
    /// Create a new client for the given endpoint and bearer token
    pub fn new(endpoint: &str, token: &str) -> ApiResult<Self> {
        let base = Url::parse(endpoint)
            .map_err(|e| ApiError::Payload(format!("invalid endpoint {endpoint:?}: {e}")))?;

        Ok(Self {
            base,
            token: token.to_string(),
            http: AdminHttpClient::new()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base.as_str().trim_end_matches('/'), path)
    }

    /// Build the gateway collection URL
    fn gateways_url(&self) -> String {
        self.url("v2.0/network-gateways")
    }

    /// Build a gateway member URL
    fn gateway_url(&self, gateway_id: &str) -> String {
        self.url(&format!(
            "v2.0/network-gateways/{}",
            urlencoding::encode(gateway_id)
        ))
    }

    /// Build the connect URL for a gateway
    fn connect_url(&self, gateway_id: &str) -> String {
        self.url(&format!(
            "v2.0/network-gateways/{}/connect_network",
            urlencoding::encode(gateway_id)
        ))
    }

    /// Build the disconnect URL for a gateway
    fn disconnect_url(&self, gateway_id: &str) -> String {
        self.url(&format!(
            "v2.0/network-gateways/{}/disconnect_network",
            urlencoding::encode(gateway_id)
        ))
    }

    /// Build the network listing URL used for name-or-id resolution
    fn networks_url(&self, param: &str, value: &str) -> String {
        self.url(&format!(
            "v2.0/networks?fields=id&{}={}",
            param,
            urlencoding::encode(value)
        ))
    }

    fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
        serde_json::from_value(value).map_err(|e| ApiError::Payload(e.to_string()))
    }
}

#[async_trait]
impl GatewayApi for AdminClient {
    async fn create_gateway(&self, spec: &GatewaySpec) -> ApiResult<Gateway> {
        let body = json!({ "network_gateway": spec });
        let value = self
            .http
            .post(&self.gateways_url(), &self.token, Some(&body))
            .await?;
        let envelope: GatewayEnvelope = Self::decode(value)?;
        Ok(envelope.network_gateway)
    }

    async fn show_gateway(&self, gateway_id: &str) -> ApiResult<Gateway> {
        let value = self
            .http
            .get(&self.gateway_url(gateway_id), &self.token)
            .await?;
        let envelope: GatewayEnvelope = Self::decode(value)?;
        Ok(envelope.network_gateway)
    }

    async fn update_gateway(&self, gateway_id: &str, update: &GatewayUpdate) -> ApiResult<Gateway> {
        let body = json!({ "network_gateway": update });
        let value = self
            .http
            .put(&self.gateway_url(gateway_id), &self.token, Some(&body))
            .await?;
        let envelope: GatewayEnvelope = Self::decode(value)?;
        Ok(envelope.network_gateway)
    }

    async fn delete_gateway(&self, gateway_id: &str) -> ApiResult<()> {
        self.http
            .delete(&self.gateway_url(gateway_id), &self.token)
            .await?;
        Ok(())
    }

    async fn connect_gateway(
        &self,
        gateway_id: &str,
        request: &ConnectRequest,
    ) -> ApiResult<ConnectionInfo> {
        let body = json!(request);
        let value = self
            .http
            .put(&self.connect_url(gateway_id), &self.token, Some(&body))
            .await?;
        let envelope: ConnectionEnvelope = Self::decode(value)?;
        Ok(envelope.connection_info)
    }

    async fn disconnect_gateway(
        &self,
        gateway_id: &str,
        request: &ConnectRequest,
    ) -> ApiResult<()> {
        let body = json!(request);
        self.http
            .put(&self.disconnect_url(gateway_id), &self.token, Some(&body))
            .await?;
        Ok(())
    }

    async fn resolve_network(&self, name_or_id: &str) -> ApiResult<String> {
        // An exact id match wins; otherwise the name must match exactly one
        // network.
        let value = self
            .http
            .get(&self.networks_url("id", name_or_id), &self.token)
            .await?;
        let by_id: NetworkListEnvelope = Self::decode(value)?;
        if let Some(network) = by_id.networks.first() {
            return Ok(network.id.clone());
        }

        let value = self
            .http
            .get(&self.networks_url("name", name_or_id), &self.token)
            .await?;
        let by_name: NetworkListEnvelope = Self::decode(value)?;
        match by_name.networks.as_slice() {
            [] => Err(ApiError::Status {
                status: 404,
                message: format!("no network matches {name_or_id:?}"),
            }),
            [network] => Ok(network.id.clone()),
            matches => Err(ApiError::Payload(format!(
                "{} networks match name {name_or_id:?}",
                matches.len()
            ))),
        }
    }
}
