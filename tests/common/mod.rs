//! Common test utilities for integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use uservoice::{Client, ClientOptions};
use wiremock::MockServer;

/// Creates an unauthenticated client pointed at the mock server
pub fn make_client(server: &MockServer) -> Client {
    Client::new(
        ClientOptions::new("acme", "test-key")
            .with_secret("test-secret")
            .with_base_url(server.uri()),
    )
    .expect("client should build")
}

/// Creates a client already holding an access token
pub fn make_user_client(server: &MockServer) -> Client {
    make_client(server).login_with_access_token("user-token", "user-secret")
}

/// Builds a list envelope holding items `start..start + count`
pub fn page_body(resource: &str, start: usize, count: usize, total: usize) -> Value {
    let items: Vec<Value> = (start..start + count).map(|id| json!({ "id": id })).collect();
    let mut body = serde_json::Map::new();
    body.insert(
        "response_data".to_string(),
        json!({ "total_records": total }),
    );
    body.insert(resource.to_string(), Value::Array(items));
    Value::Object(body)
}

/// Builds an error envelope
pub fn error_body(kind: &str, message: &str) -> Value {
    json!({ "errors": { "type": kind, "message": message } })
}
