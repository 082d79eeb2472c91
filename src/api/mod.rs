//! Admin API interaction module
//!
//! This module provides the capability surface for talking to the
//! networking service's administrative REST API.
//!
//! # Module Structure
//!
//! - [`client`] - Concrete [`GatewayApi`] implementation over HTTP
//! - [`http`] - HTTP utilities for REST API calls
//! - [`types`] - Wire structures for gateway and connection payloads
//!
//! The resource adapters depend only on the [`GatewayApi`] trait, so the
//! remote service can be substituted in tests without touching adapter
//! logic.

pub mod client;
pub mod http;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;
use types::{ConnectRequest, ConnectionInfo, Gateway, GatewaySpec, GatewayUpdate};

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure from the admin API client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The service answered with a non-success HTTP status.
    #[error("admin API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded into the expected shape.
    #[error("unexpected payload: {0}")]
    Payload(String),
}

impl ApiError {
    /// HTTP status reported by the service, if the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the service reported the entity as absent.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Outcome of classifying a failed delete or disconnect call.
///
/// The idempotent-delete policy lives here as a single mapping: a 404
/// from the service means the entity is already gone and the delete is
/// complete; every other failure surfaces to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteDisposition {
    /// The entity is already absent; treat the delete as successful.
    AlreadyGone,
    /// The failure is real and must fail the hook.
    Failed,
}

impl DeleteDisposition {
    pub fn classify(err: &ApiError) -> Self {
        if err.is_not_found() {
            DeleteDisposition::AlreadyGone
        } else {
            DeleteDisposition::Failed
        }
    }
}

/// Capability over the networking service's gateway surface.
///
/// Mirrors the admin API verbs one-to-one. All calls are fallible and
/// single-shot; retry policy belongs to the caller.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Create a gateway device group; the service assigns the id.
    async fn create_gateway(&self, spec: &GatewaySpec) -> ApiResult<Gateway>;

    /// Read a gateway back by id.
    async fn show_gateway(&self, gateway_id: &str) -> ApiResult<Gateway>;

    /// Update the mutable fields of a gateway.
    async fn update_gateway(&self, gateway_id: &str, update: &GatewayUpdate) -> ApiResult<Gateway>;

    /// Delete a gateway by id.
    async fn delete_gateway(&self, gateway_id: &str) -> ApiResult<()>;

    /// Bind an internal network to a gateway; returns the port created
    /// for the binding.
    async fn connect_gateway(
        &self,
        gateway_id: &str,
        request: &ConnectRequest,
    ) -> ApiResult<ConnectionInfo>;

    /// Remove a network binding previously made with
    /// [`connect_gateway`](Self::connect_gateway). The request must carry
    /// the same argument shape used at connect time.
    async fn disconnect_gateway(&self, gateway_id: &str, request: &ConnectRequest)
        -> ApiResult<()>;

    /// Resolve a network name-or-id to the service's canonical network id.
    async fn resolve_network(&self, name_or_id: &str) -> ApiResult<String>;
}
