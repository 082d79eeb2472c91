//! Resource abstraction layer
//!
//! This module provides the managed-resource adapters and the contract
//! machinery they share. Resource definitions are loaded from JSON files
//! at compile time, so schema details and capability flags live in data,
//! not in code paths.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches resource definitions from embedded JSON
//! - [`properties`] - Validates declared properties against a definition
//! - [`lifecycle`] - The (action, status) contract and poll policy
//! - [`gateway`] - The network gateway adapter
//! - [`connection`] - The gateway connection adapter

pub mod connection;
pub mod gateway;
pub mod lifecycle;
pub mod properties;
pub mod registry;

use crate::api::GatewayApi;
use crate::error::{ResourceError, ResourceResult};
use crate::resource::lifecycle::{PollPolicy, ResourceState};
use connection::GatewayConnectionResource;
use gateway::GatewayResource;
use serde_json::Value;
use std::sync::Arc;

/// A resource of any registered type, dispatching the shared lifecycle
/// surface to the concrete adapter.
pub enum StackResource {
    Gateway(GatewayResource),
    Connection(GatewayConnectionResource),
}

impl StackResource {
    /// Instantiate a resource by type key from raw declared properties.
    pub fn from_type(
        api: Arc<dyn GatewayApi>,
        resource_type: &str,
        logical_name: &str,
        properties: &Value,
        poll: PollPolicy,
    ) -> ResourceResult<Self> {
        match resource_type {
            GatewayResource::TYPE => Ok(StackResource::Gateway(GatewayResource::new(
                api,
                logical_name,
                properties,
                poll,
            )?)),
            GatewayConnectionResource::TYPE => Ok(StackResource::Connection(
                GatewayConnectionResource::new(api, logical_name, properties)?,
            )),
            other => Err(ResourceError::UnknownResourceType(other.to_string())),
        }
    }

    pub fn validate(&self) -> ResourceResult<()> {
        match self {
            StackResource::Gateway(_) => Ok(()),
            StackResource::Connection(connection) => connection.validate(),
        }
    }

    pub async fn create(&mut self) -> ResourceResult<()> {
        match self {
            StackResource::Gateway(gateway) => gateway.create().await,
            StackResource::Connection(connection) => connection.create().await,
        }
    }

    pub async fn delete(&mut self) -> ResourceResult<()> {
        match self {
            StackResource::Gateway(gateway) => gateway.delete().await,
            StackResource::Connection(connection) => connection.delete().await,
        }
    }

    pub async fn attribute(&self, name: &str) -> ResourceResult<Value> {
        match self {
            StackResource::Gateway(gateway) => gateway.attribute(name).await,
            StackResource::Connection(connection) => connection.attribute(name),
        }
    }

    pub fn resource_id(&self) -> Option<String> {
        match self {
            StackResource::Gateway(gateway) => gateway.resource_id().map(str::to_string),
            StackResource::Connection(connection) => connection.resource_id(),
        }
    }

    /// Adopt a previously persisted identifier.
    pub fn set_resource_id(&mut self, id: &str) -> ResourceResult<()> {
        match self {
            StackResource::Gateway(gateway) => {
                gateway.set_resource_id(id);
                Ok(())
            }
            StackResource::Connection(connection) => connection.set_resource_id(id),
        }
    }

    pub fn state(&self) -> &ResourceState {
        match self {
            StackResource::Gateway(gateway) => gateway.state(),
            StackResource::Connection(connection) => connection.state(),
        }
    }
}
