//! Integration tests for `RedditClient` using wiremock HTTP mocks.

use std::time::Duration;

use subreddit_exporter::config::RedditSettings;
use subreddit_exporter::errors::ScrapeError;
use subreddit_exporter::reddit::RedditClient;
use subreddit_exporter::source::{ListingQuery, PostSource, TimeWindow};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer) -> RedditSettings {
    RedditSettings {
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        user_agent: "exporter-tests/0.1".to_string(),
        subreddit: "technology".to_string(),
        auth_url: format!("{}/api/v1/access_token", server.uri()),
        api_base_url: server.uri(),
        request_timeout: Duration::from_secs(5),
    }
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(header("authorization", "Basic aWQ6c2VjcmV0"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok",
            "token_type": "bearer",
            "expires_in": 86400
        })))
        .mount(server)
        .await;
}

fn listing(ids: &[&str], after: Option<&str>) -> serde_json::Value {
    let children: Vec<_> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "kind": "t3",
                "data": {
                    "id": id,
                    "title": format!("Post {id}"),
                    "score": 12,
                    "upvote_ratio": 0.8,
                    "url": format!("https://example.com/{id}"),
                    "num_comments": 4,
                    "created_utc": 1_700_000_000.0,
                    "author": "writer",
                    "link_flair_text": "Software",
                    "num_crossposts": 1
                }
            })
        })
        .collect();
    serde_json::json!({
        "kind": "Listing",
        "data": { "children": children, "after": after }
    })
}

#[tokio::test]
async fn top_listing_sends_window_and_bearer_token() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/technology/top"))
        .and(query_param("t", "week"))
        .and(query_param("limit", "100"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["a", "b"], Some("t3_b"))))
        .mount(&server)
        .await;

    let client = RedditClient::connect(&settings(&server))
        .await
        .expect("token exchange should succeed");
    let page = client
        .fetch_page(&ListingQuery::Top(TimeWindow::Week), None, 100)
        .await
        .expect("page should parse");

    assert_eq!(page.posts.len(), 2);
    assert_eq!(page.posts[0].id, "a");
    assert_eq!(page.posts[0].link_flair_text.as_deref(), Some("Software"));
    assert_eq!(page.after.as_deref(), Some("t3_b"));
}

#[tokio::test]
async fn search_is_restricted_and_paginates_with_after() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/technology/search"))
        .and(query_param("q", "technology"))
        .and(query_param("sort", "new"))
        .and(query_param("restrict_sr", "true"))
        .and(query_param("after", "t3_x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["y"], None)))
        .mount(&server)
        .await;

    let client = RedditClient::connect(&settings(&server)).await.unwrap();
    let page = client
        .fetch_page(&ListingQuery::search("technology"), Some("t3_x"), 25)
        .await
        .unwrap();

    assert_eq!(page.posts.len(), 1);
    assert!(page.after.is_none());
}

#[tokio::test]
async fn rejected_credentials_are_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = RedditClient::connect(&settings(&server))
        .await
        .err()
        .expect("connect should fail");
    assert!(matches!(err, ScrapeError::Auth(_)), "got {err:?}");
}

#[tokio::test]
async fn listing_error_status_is_fatal() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/technology/hot"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = RedditClient::connect(&settings(&server)).await.unwrap();
    let err = client
        .fetch_page(&ListingQuery::Hot, None, 100)
        .await
        .expect_err("503 should surface");

    match err {
        ScrapeError::Status { status, .. } => assert_eq!(status.as_u16(), 503),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_listing_is_a_decode_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/technology/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = RedditClient::connect(&settings(&server)).await.unwrap();
    let err = client
        .fetch_page(&ListingQuery::New, None, 10)
        .await
        .expect_err("bad body should surface");
    assert!(matches!(err, ScrapeError::Decode(..)), "got {err:?}");
}

#[tokio::test]
async fn api_base_with_path_keeps_its_prefix() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/proxy/r/technology/hot"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&["z"], None)))
        .mount(&server)
        .await;

    let mut cfg = settings(&server);
    cfg.api_base_url = format!("{}/proxy", server.uri());

    let client = RedditClient::connect(&cfg).await.unwrap();
    let page = client
        .fetch_page(&ListingQuery::Hot, None, 10)
        .await
        .expect("prefixed base should route under /proxy");

    assert_eq!(page.posts.len(), 1);
    assert_eq!(page.posts[0].id, "z");
}
