mod common;

use std::time::Duration;

use observation_client::{Error, ObservationClient, RequestOptions};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{authenticated_client, options, token_body};

async fn mount_expired_token(server: &MockServer, endpoint: &str) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_401_refreshes_and_replays_once() {
    let server = MockServer::start().await;
    mount_expired_token(&server, "/api/v1/user/info/").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user/info/"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts/oauth2/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("new-access", "new-refresh")))
        .expect(1)
        .mount(&server)
        .await;

    let client = authenticated_client(&server);
    let value: Value = client.request("user/info/", RequestOptions::get()).await.unwrap();

    assert_eq!(value, json!({"id": 7}));
    assert_eq!(client.access_token().as_deref(), Some("new-access"));
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;
    mount_expired_token(&server, "/api/v1/user/info/").await;
    mount_expired_token(&server, "/api/v1/exports/").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user/info/"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/exports/"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts/oauth2/token/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("new-access", "new-refresh"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = authenticated_client(&server);
    let (info, exports) = tokio::join!(
        client.request::<Value>("user/info/", RequestOptions::get()),
        client.request::<Value>("exports/", RequestOptions::get()),
    );

    assert_eq!(info.unwrap(), json!({"id": 7}));
    assert_eq!(exports.unwrap(), json!({"results": []}));
}

#[tokio::test]
async fn test_failed_refresh_surfaces_original_errors() {
    let server = MockServer::start().await;
    mount_expired_token(&server, "/api/v1/user/info/").await;
    mount_expired_token(&server, "/api/v1/exports/").await;
    Mock::given(method("POST"))
        .and(path("/accounts/oauth2/token/"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": "invalid_grant"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = authenticated_client(&server);
    let (info, exports) = tokio::join!(
        client.request::<Value>("user/info/", RequestOptions::get()),
        client.request::<Value>("exports/", RequestOptions::get()),
    );

    for result in [info, exports] {
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
        assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
        assert_eq!(
            err.body().and_then(|b| b.as_json()),
            Some(&json!({"detail": "expired"}))
        );
    }
    assert_eq!(client.access_token().as_deref(), Some("old-access"));
}

#[tokio::test]
async fn test_replayed_request_is_not_retried_twice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user/info/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "nope"})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts/oauth2/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("new-access", "new-refresh")))
        .expect(1)
        .mount(&server)
        .await;

    let client = authenticated_client(&server);
    let err = client
        .request::<Value>("user/info/", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(err.is_authentication());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.last().unwrap().headers["authorization"], "Bearer new-access");
}

#[tokio::test]
async fn test_public_401_is_not_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/terms/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts/oauth2/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("new-access", "new-refresh")))
        .expect(0)
        .mount(&server)
        .await;

    let client = authenticated_client(&server);
    let err = client
        .public_request::<Value>("terms/", RequestOptions::get())
        .await
        .unwrap_err();
    assert!(err.is_authentication());
}

#[tokio::test]
async fn test_auto_refresh_can_be_disabled() {
    let server = MockServer::start().await;
    mount_expired_token(&server, "/api/v1/user/info/").await;
    Mock::given(method("POST"))
        .and(path("/accounts/oauth2/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("new-access", "new-refresh")))
        .expect(0)
        .mount(&server)
        .await;

    let client = ObservationClient::new(options(&server).with_auto_refresh(false)).unwrap();
    client.set_access_token("old-access");
    client.set_refresh_token("old-refresh");

    let err = client
        .request::<Value>("user/info/", RequestOptions::get())
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
}
