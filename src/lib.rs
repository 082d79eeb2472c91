//! netgw - declarative resource adapters for network gateways
//!
//! Two managed resource types over a networking service's admin API:
//! a **network gateway** (a device group the service exposes as one
//! addressable entity) and a **network gateway connection** (a binding
//! of an internal network to a gateway over a flat or vlan L2 segment).
//!
//! The adapters translate declared properties into API calls and map
//! responses and errors back into a small lifecycle contract. They
//! depend only on the [`api::GatewayApi`] capability, so the remote
//! service can be substituted in tests.

pub mod api;
pub mod config;
pub mod error;
pub mod resource;
pub mod template;

pub use error::{ResourceError, ResourceResult};
