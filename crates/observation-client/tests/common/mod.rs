#![allow(dead_code)]

use observation_client::{ClientCredentials, ClientOptions, ObservationClient};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const REDIRECT_URI: &str = "http://localhost:3000/callback";

pub fn options(server: &MockServer) -> ClientOptions {
    ClientOptions::new()
        .with_base_url(server.uri())
        .with_credentials(ClientCredentials::new(CLIENT_ID, REDIRECT_URI).with_secret(CLIENT_SECRET))
}

pub fn client(server: &MockServer) -> ObservationClient {
    ObservationClient::new(options(server)).unwrap()
}

/// Client holding an (expired) access token and a refresh token
pub fn authenticated_client(server: &MockServer) -> ObservationClient {
    let client = client(server);
    client.set_access_token("old-access");
    client.set_refresh_token("old-refresh");
    client
}

pub fn token_body(access: &str, refresh: &str) -> Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": 36000,
        "token_type": "Bearer",
        "scope": "read write"
    })
}

pub fn countries_body() -> Value {
    json!({
        "count": 2,
        "next": null,
        "previous": null,
        "results": [
            {"code": "NL", "name": "Netherlands"},
            {"code": "BE", "name": "Belgium"}
        ]
    })
}
