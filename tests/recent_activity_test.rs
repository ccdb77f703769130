//! Integration tests for the combined recent-changes + log-events query.

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fandom_activity_notifier::fandom::endpoint::EndpointClient;
use fandom_activity_notifier::fandom::recent::{
    fetch_recent_activity, fetch_social_activity, RecentActivityQuery,
};

fn client(server: &MockServer) -> EndpointClient {
    EndpointClient::new(reqwest::Client::new(), 177, server.uri())
}

#[tokio::test]
async fn test_one_combined_request_with_both_lists() {
    let server = MockServer::start().await;
    let body = json!({ "query": { "recentchanges": [], "logevents": [] } });
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("action", "query"))
        .and(query_param("list", "recentchanges|logevents"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let response = fetch_recent_activity(&client(&server), &RecentActivityQuery::default())
        .await
        .unwrap();
    // Body passes through undecorated.
    assert_eq!(response, body);
}

#[tokio::test]
async fn test_window_encodes_full_precision_for_both_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("rcend", "2023-01-01T00:00:00.123456Z"))
        .and(query_param("leend", "2023-01-01T00:00:00.123456Z"))
        .and(query_param("rcstart", "2023-01-01T01:00:00.000000Z"))
        .and(query_param("lestart", "2023-01-01T01:00:00.000000Z"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "query": { "recentchanges": [], "logevents": [] } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let after = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
        + Duration::microseconds(123_456);
    let before = Utc.with_ymd_and_hms(2023, 1, 1, 1, 0, 0).unwrap();
    let query = RecentActivityQuery::default().window(Some(after), Some(before));

    fetch_recent_activity(&client(&server), &query).await.unwrap();
}

#[tokio::test]
async fn test_social_activity_goes_through_rpc_surface() {
    let server = MockServer::start().await;
    let body = json!([{ "type": "comment" }]);
    Mock::given(method("GET"))
        .and(path("/wikia.php"))
        .and(query_param("controller", "ActivityApiController"))
        .and(query_param("method", "getSocialActivity"))
        .and(query_param("uselang", "en"))
        .and(query_param("lastUpdateTime", "1672531200"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let after = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let response = fetch_social_activity(&client(&server), Some(after))
        .await
        .unwrap();
    assert_eq!(response, body);
}

#[tokio::test]
async fn test_social_activity_empty_result_is_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wikia.php"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let response = fetch_social_activity(&client(&server), None).await.unwrap();
    assert_eq!(response, json!([]));
}

#[tokio::test]
async fn test_http_error_surfaces_as_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = fetch_recent_activity(&client(&server), &RecentActivityQuery::default()).await;
    assert!(result.is_err());
}
