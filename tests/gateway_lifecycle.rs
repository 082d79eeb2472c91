//! Integration tests for the gateway resource over a mocked admin API
//!
//! These drive the real HTTP client against wiremock endpoints, checking
//! request shapes, identifier handling, the delete-confirmation poll and
//! the idempotent-delete policy.

use netgw::api::client::AdminClient;
use netgw::resource::gateway::GatewayResource;
use netgw::resource::lifecycle::{Action, PollPolicy, Status};
use netgw::ResourceError;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{bearer_token, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GATEWAY_ID: &str = "a1349845-80ff-49bf-82bf-6be454d41560";

fn test_poll() -> PollPolicy {
    PollPolicy::new(3, Duration::from_millis(10))
}

fn resource(server: &MockServer) -> GatewayResource {
    let client = AdminClient::new(&server.uri(), "test-token").expect("client should build");
    let props = json!({
        "name": "NetworkGateway",
        "tenant_id": "abcd1234",
        "devices": [{"id": "e52148ca-7db9-4ec3-abe6-2c7c0ff316eb", "interface_name": "breth1"}]
    });
    GatewayResource::new(Arc::new(client), "test_network_gateway", &props, test_poll())
        .expect("properties should validate")
}

fn gateway_body() -> serde_json::Value {
    json!({
        "network_gateway": {
            "id": GATEWAY_ID,
            "name": "NetworkGateway",
            "tenant_id": "abcd1234",
            "devices": [{"id": "e52148ca-7db9-4ec3-abe6-2c7c0ff316eb", "interface_name": "breth1"}],
            "default": null
        }
    })
}

#[tokio::test]
async fn create_sends_declared_properties_and_stores_the_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2.0/network-gateways"))
        .and(bearer_token("test-token"))
        .and(body_json(json!({
            "network_gateway": {
                "name": "NetworkGateway",
                "tenant_id": "abcd1234",
                "devices": [{"id": "e52148ca-7db9-4ec3-abe6-2c7c0ff316eb", "interface_name": "breth1"}]
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(gateway_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut resource = resource(&server);
    resource.create().await.expect("create should succeed");

    assert_eq!(resource.resource_id(), Some(GATEWAY_ID));
    assert!(resource.state().is(Action::Create, Status::Complete));
}

#[tokio::test]
async fn attributes_reflect_the_remote_response() {
    let server = MockServer::start().await;

    let mut shown = gateway_body();
    shown["network_gateway"]["default"] = json!(true);

    Mock::given(method("GET"))
        .and(path(format!("/v2.0/network-gateways/{GATEWAY_ID}")))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&shown))
        .mount(&server)
        .await;

    let mut resource = resource(&server);
    resource.set_resource_id(GATEWAY_ID);

    assert_eq!(resource.attribute("name").await.unwrap(), json!("NetworkGateway"));
    assert_eq!(resource.attribute("tenant_id").await.unwrap(), json!("abcd1234"));
    assert_eq!(
        resource.attribute("devices").await.unwrap(),
        json!([{"id": "e52148ca-7db9-4ec3-abe6-2c7c0ff316eb", "interface_name": "breth1"}])
    );
    assert_eq!(resource.attribute("default").await.unwrap(), json!(true));

    let all = resource.attribute("show").await.unwrap();
    assert_eq!(all["id"], json!(GATEWAY_ID));

    let err = resource.attribute("Foo").await.unwrap_err();
    assert!(matches!(err, ResourceError::UnknownAttribute { .. }));
}

#[tokio::test]
async fn delete_confirms_until_the_service_reports_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/v2.0/network-gateways/{GATEWAY_ID}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    // Still present on the first poll, gone on the second.
    Mock::given(method("GET"))
        .and(path(format!("/v2.0/network-gateways/{GATEWAY_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(gateway_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v2.0/network-gateways/{GATEWAY_ID}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Network gateway could not be found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut resource = resource(&server);
    resource.set_resource_id(GATEWAY_ID);
    resource.delete().await.expect("delete should succeed");

    assert!(resource.state().is(Action::Delete, Status::Complete));
}

#[tokio::test]
async fn delete_treats_not_found_as_already_deleted() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/v2.0/network-gateways/{GATEWAY_ID}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Network gateway could not be found"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // No confirmation poll runs when the delete itself reports absence.
    Mock::given(method("GET"))
        .and(path(format!("/v2.0/network-gateways/{GATEWAY_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(gateway_body()))
        .expect(0)
        .mount(&server)
        .await;

    let mut resource = resource(&server);
    resource.set_resource_id(GATEWAY_ID);
    resource.delete().await.expect("404 should count as deleted");

    assert!(resource.state().is(Action::Delete, Status::Complete));
}

#[tokio::test]
async fn delete_propagates_other_errors() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/v2.0/network-gateways/{GATEWAY_ID}")))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "gateway still in use"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut resource = resource(&server);
    resource.set_resource_id(GATEWAY_ID);

    let err = resource.delete().await.unwrap_err();
    assert!(err.to_string().contains("gateway still in use"));
    assert!(resource.state().is(Action::Delete, Status::Failed));
    assert!(resource.state().reason.as_deref().unwrap().contains("409"));
}

#[tokio::test]
async fn update_re_sends_the_mutable_property_set() {
    let server = MockServer::start().await;

    let mut updated = gateway_body();
    updated["network_gateway"]["name"] = json!("renamed");

    Mock::given(method("PUT"))
        .and(path(format!("/v2.0/network-gateways/{GATEWAY_ID}")))
        .and(body_json(json!({
            "network_gateway": {
                "name": "renamed",
                "devices": [{"id": "e52148ca-7db9-4ec3-abe6-2c7c0ff316eb", "interface_name": "breth1"}]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&updated))
        .expect(1)
        .mount(&server)
        .await;

    let mut resource = resource(&server);
    resource.set_resource_id(GATEWAY_ID);

    resource
        .update(&json!({"name": "renamed"}))
        .await
        .expect("in-place update should succeed");
    assert!(resource.state().is(Action::Update, Status::Complete));
}
