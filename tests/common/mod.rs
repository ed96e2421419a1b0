//! Shared test utilities and fixtures
//!
//! A wiremock server stands in for the RabbitRelay backend; clients are
//! built over an in-memory store so tests never touch `~/.rabbit`.

#![allow(dead_code)]

use std::sync::Arc;

use rabbit_client::ApiClient;
use rabbit_config::{BuildEnv, MemoryStore};
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start a mock server that simulates the relay backend
pub async fn start_backend() -> MockServer {
    MockServer::start().await
}

/// Client whose build-time API base points at `server`
pub fn client(server: &MockServer, debug: bool, store: MemoryStore) -> ApiClient {
    ApiClient::new(BuildEnv::new(server.uri(), debug), Arc::new(store))
}

/// Mount a JSON response for `verb path`
pub async fn mount_json(server: &MockServer, verb: &str, route: &str, status: u16, body: Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Header value of the only request the server received
pub async fn single_request_header(server: &MockServer, name: &str) -> Option<String> {
    let requests = server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert_eq!(requests.len(), 1, "expected exactly one request");
    requests[0]
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
