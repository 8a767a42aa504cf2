//! Integration tests for the feed client against a mocked listing endpoint.

use buzzmint_feed::{FeedClient, FeedError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, max_retries: u32) -> FeedClient {
    FeedClient::with_base_url(5, "buzzmint-test", max_retries, 0, &server.uri())
        .expect("client should build against mock server")
}

fn listing_body(children: Vec<serde_json::Value>) -> serde_json::Value {
    json!({ "data": { "children": children } })
}

fn child(id: &str, title: &str) -> serde_json::Value {
    json!({
        "data": {
            "name": format!("t3_{id}"),
            "id": id,
            "author": "fan123",
            "title": title,
            "selftext": "crowd going wild",
            "score": 250,
            "created_utc": 1_700_000_000.0,
            "permalink": format!("/r/nfl/comments/{id}/slug/"),
        }
    })
}

#[tokio::test]
async fn fetch_posts_parses_a_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/nfl/search.json"))
        .and(query_param("q", "super bowl"))
        .and(query_param("restrict_sr", "1"))
        .and(query_param("sort", "new"))
        .and(query_param("raw_json", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(vec![
            child("abc", "TOUCHDOWN!"),
            child("def", "what a catch"),
        ])))
        .mount(&server)
        .await;

    let posts = client(&server, 0)
        .fetch_posts("nfl", "super bowl", 25)
        .await
        .expect("fetch should succeed");

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, "t3_abc");
    assert_eq!(posts[0].title, "TOUCHDOWN!");
    assert_eq!(posts[0].author.as_deref(), Some("fan123"));
    assert_eq!(posts[0].score, 250);
    assert_eq!(
        posts[0].url.as_deref(),
        Some("https://reddit.com/r/nfl/comments/abc/slug/")
    );
    assert_eq!(posts[1].id, "t3_def");
}

#[tokio::test]
async fn oversized_limit_is_clamped_before_the_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/nfl/search.json"))
        .and(query_param("limit", "50"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_body(vec![child("abc", "hello")])),
        )
        .mount(&server)
        .await;

    let posts = client(&server, 0)
        .fetch_posts("nfl", "super bowl", 5_000)
        .await
        .expect("fetch should succeed");

    assert_eq!(posts.len(), 1, "mock only matches when limit was clamped");
}

#[tokio::test]
async fn hostile_subreddit_is_sanitized_in_the_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/nfl/search.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_body(vec![child("abc", "hi")])),
        )
        .mount(&server)
        .await;

    let posts = client(&server, 0)
        .fetch_posts("../nfl", "super bowl", 25)
        .await
        .expect("fetch should succeed");

    assert_eq!(posts.len(), 1, "path-traversal characters must be stripped");
}

#[tokio::test]
async fn unusable_children_are_skipped_not_fatal() {
    let server = MockServer::start().await;
    let deleted = json!({
        "data": {
            "name": "t3_ghost",
            "title": "[deleted]",
            "score": 0,
        }
    });
    let untitled = json!({ "data": { "name": "t3_blank", "score": 3 } });
    Mock::given(method("GET"))
        .and(path("/r/nfl/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(vec![
            deleted,
            child("keep", "a real post"),
            untitled,
        ])))
        .mount(&server)
        .await;

    let posts = client(&server, 0)
        .fetch_posts("nfl", "super bowl", 25)
        .await
        .expect("fetch should succeed");

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "t3_keep");
}

#[tokio::test]
async fn image_urls_survive_the_round_trip() {
    let server = MockServer::start().await;
    let mut post = child("pic", "look at this");
    post["data"]["preview"] = json!({
        "images": [
            { "source": { "url": "https://preview.redd.it/x.jpg?width=640&amp;s=abc" } }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/r/nfl/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(vec![post])))
        .mount(&server)
        .await;

    let posts = client(&server, 0)
        .fetch_posts("nfl", "super bowl", 25)
        .await
        .expect("fetch should succeed");

    assert_eq!(
        posts[0].image_urls,
        vec!["https://preview.redd.it/x.jpg?width=640&s=abc".to_string()]
    );
}

#[tokio::test]
async fn not_found_fails_without_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/nfl/search.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let error = client(&server, 3)
        .fetch_posts("nfl", "super bowl", 25)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        FeedError::UnexpectedStatus { status: 404, .. }
    ));
}

#[tokio::test]
async fn rate_limit_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    // First response is a 429; once exhausted the mock stops matching and
    // the retry falls through to the success mock below.
    Mock::given(method("GET"))
        .and(path("/r/nfl/search.json"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/nfl/search.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing_body(vec![child("abc", "back up")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let posts = client(&server, 1)
        .fetch_posts("nfl", "super bowl", 25)
        .await
        .expect("retry should recover");

    assert_eq!(posts.len(), 1);
}

#[tokio::test]
async fn exhausted_rate_limit_reports_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/nfl/search.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let error = client(&server, 0)
        .fetch_posts("nfl", "super bowl", 25)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        FeedError::RateLimited {
            retry_after_secs: 7
        }
    ));
}

#[tokio::test]
async fn server_error_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/nfl/search.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/nfl/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let posts = client(&server, 2)
        .fetch_posts("nfl", "super bowl", 25)
        .await
        .expect("retries should recover");

    assert!(posts.is_empty());
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/nfl/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let error = client(&server, 3)
        .fetch_posts("nfl", "super bowl", 25)
        .await
        .unwrap_err();

    assert!(
        matches!(error, FeedError::Deserialize { .. }),
        "bad bodies must not be retried, got: {error:?}"
    );
}
