//! Publish flow tests against a mock platform.

use buzzmint_publish::{PublishClient, PublishOutcome, TOKEN_ENV_VAR};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_STUB: &[u8] = b"\x89PNG\r\n\x1a\nstub";

fn client_for(server: &MockServer, token: Option<&str>) -> PublishClient {
    PublishClient::with_base_urls(
        token.map(ToString::to_string),
        5,
        &server.uri(),
        &server.uri(),
    )
    .unwrap()
}

#[tokio::test]
async fn unconfigured_client_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let outcome = client.post_image(PNG_STUB, "caption").await;

    assert_eq!(
        outcome,
        PublishOutcome::NotConfigured {
            required_env: vec![TOKEN_ENV_VAR.to_string()],
        }
    );
}

#[tokio::test]
async fn upload_then_post_returns_post_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.1/media/upload.json"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "media_id_string": "711" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({
            "text": "HYPE check",
            "media": { "media_ids": ["711"] },
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "data": { "id": "1455" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-token"));
    let outcome = client.post_image(PNG_STUB, "HYPE check").await;

    assert_eq!(
        outcome,
        PublishOutcome::Posted {
            post_id: "1455".to_string(),
        }
    );
}

#[tokio::test]
async fn rejected_upload_reports_failure_and_skips_posting() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.1/media/upload.json"))
        .respond_with(ResponseTemplate::new(403).set_body_string("token lacks media.write"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-token"));
    let outcome = client.post_image(PNG_STUB, "caption").await;

    let PublishOutcome::Failed { reason } = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert!(reason.contains("403"), "reason was: {reason}");
    assert!(reason.contains("media.write"), "reason was: {reason}");
}

#[tokio::test]
async fn failed_post_creation_reports_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.1/media/upload.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "media_id_string": "711" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-token"));
    let outcome = client.post_image(PNG_STUB, "caption").await;

    let PublishOutcome::Failed { reason } = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert!(reason.contains("500"), "reason was: {reason}");
}

#[tokio::test]
async fn upload_without_media_id_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.1/media/upload.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "expires_after_secs": 3600 })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-token"));
    let outcome = client.post_image(PNG_STUB, "caption").await;

    let PublishOutcome::Failed { reason } = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert!(reason.contains("media_id_string"), "reason was: {reason}");
}
