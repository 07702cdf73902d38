//! Mock multiplayer backend built on wiremock.
#![allow(dead_code)]

use std::time::Duration;

use pfmp::core::api::ApiClient;
use pfmp::core::http::build_client;
use pfmp::storage::TitleCredentials;
use pfmp::test_utils::{
    TEST_ENTITY_TOKEN, TEST_SECRET_KEY, TEST_TITLE_ID, entity_token_envelope, ok_envelope,
};
use serde_json::Value;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Start a backend that hands out entity tokens for the test secret key.
pub async fn backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Authentication/GetEntityToken"))
        .and(header("X-SecretKey", TEST_SECRET_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(entity_token_envelope()))
        .named("GetEntityToken")
        .mount(&server)
        .await;
    server
}

/// Mock for `operation` answering with `data` in a success envelope.
pub fn operation(operation: &str, data: Value) -> Mock {
    Mock::given(method("POST"))
        .and(path(format!("/MultiplayerServer/{operation}")))
        .and(header("X-EntityToken", TEST_ENTITY_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(data)))
        .named(operation.to_string())
}

/// Client for the test title pointed at `server`.
pub fn client(server: &MockServer) -> ApiClient {
    let credentials = TitleCredentials::new(TEST_TITLE_ID, TEST_SECRET_KEY).unwrap();
    ApiClient::new(build_client(TIMEOUT).unwrap(), server.uri(), credentials, TIMEOUT)
}

/// Requests received for `operation`, decoded as JSON.
pub async fn bodies(server: &MockServer, operation: &str) -> Vec<Value> {
    let wanted = format!("/MultiplayerServer/{operation}");
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == wanted)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}
