//! HTTP-level tests for Gmail send and token refresh

use std::time::Duration;

use integration_gmail::{
    EmailComposition, GmailClient, GmailConfig, GmailError, OAuthClient, build_raw_message,
};
use secrecy::{ExposeSecret, SecretString};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GmailClient {
    GmailClient::new(GmailConfig {
        api_base_url: server.uri(),
        timeout_secs: 2,
    })
    .unwrap()
}

fn raw() -> String {
    build_raw_message(&EmailComposition {
        from: "reader@example.com",
        to: "reader@example.com",
        subject: "Weekly brief",
        text_body: "hello",
        html_body: "<p>hello</p>",
    })
    .unwrap()
}

#[tokio::test]
async fn send_posts_raw_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gmail/v1/users/me/messages/send"))
        .and(header("authorization", "Bearer ya29.token"))
        .and(body_string_contains("\"raw\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "18c2f0a1b2",
            "threadId": "18c2f0a1b2",
            "labelIds": ["SENT"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sent = client_for(&server)
        .send_raw(&SecretString::from("ya29.token"), &raw())
        .await
        .unwrap();

    assert_eq!(sent.id, "18c2f0a1b2");
    assert_eq!(sent.thread_id.as_deref(), Some("18c2f0a1b2"));
}

#[tokio::test]
async fn refused_token_maps_to_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"code": 401, "message": "Request had invalid authentication credentials.", "status": "UNAUTHENTICATED"}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send_raw(&SecretString::from("stale"), &raw())
        .await
        .unwrap_err();
    assert!(err.is_auth());
}

#[tokio::test]
async fn backend_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send_raw(&SecretString::from("t"), &raw())
        .await
        .unwrap_err();
    assert!(matches!(err, GmailError::ServerError { status: 503, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn malformed_success_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send_raw(&SecretString::from("t"), &raw())
        .await
        .unwrap_err();
    assert!(matches!(err, GmailError::InvalidResponse(_)));
}

#[tokio::test]
async fn refresh_posts_form_and_reads_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("client_id=client-123"))
        .and(body_string_contains("client_secret=shh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.fresh",
            "expires_in": 3599,
            "scope": "https://www.googleapis.com/auth/gmail.send",
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let oauth = OAuthClient::new(Duration::from_secs(2)).unwrap();
    let refreshed = oauth
        .refresh(
            &format!("{}/token", server.uri()),
            "client-123",
            Some(&SecretString::from("shh")),
            &SecretString::from("1//refresh"),
        )
        .await
        .unwrap();

    assert_eq!(refreshed.access_token.expose_secret(), "ya29.fresh");
    assert_eq!(refreshed.expires_in, 3599);
}

#[tokio::test]
async fn refresh_without_expires_in_defaults_to_an_hour() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "ya29.x"})),
        )
        .mount(&server)
        .await;

    let oauth = OAuthClient::new(Duration::from_secs(2)).unwrap();
    let refreshed = oauth
        .refresh(&server.uri(), "c", None, &SecretString::from("1//r"))
        .await
        .unwrap();
    assert_eq!(refreshed.expires_in, 3600);
}

#[tokio::test]
async fn revoked_refresh_token_is_auth_expired() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .mount(&server)
        .await;

    let oauth = OAuthClient::new(Duration::from_secs(2)).unwrap();
    let err = oauth
        .refresh(&server.uri(), "c", None, &SecretString::from("1//dead"))
        .await
        .unwrap_err();
    assert!(matches!(err, GmailError::AuthExpired(_)));
}
