//! Tests for the HTTP transport

use super::*;
use crate::error::Error;
use crate::types::{BackoffType, JsonValue};
use serde_json::json;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quick_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        backoff: BackoffType::Constant,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
    }
}

fn transport(server: &MockServer, retry: RetryPolicy) -> HttpClient {
    let config = HttpClientConfig::new(&server.uri())
        .unwrap()
        .with_retry(retry)
        .with_rate_limit(None);
    HttpClient::new(config).unwrap()
}

fn no_query() -> Vec<(String, String)> {
    Vec::new()
}

fn query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

// ============================================================================
// Retry policy
// ============================================================================

#[test_case(BackoffType::Constant, 0 => 100)]
#[test_case(BackoffType::Constant, 5 => 100)]
#[test_case(BackoffType::Linear, 0 => 100)]
#[test_case(BackoffType::Linear, 2 => 300)]
#[test_case(BackoffType::Exponential, 0 => 100)]
#[test_case(BackoffType::Exponential, 3 => 800)]
#[test_case(BackoffType::Exponential, 10 => 1000; "exponential capped")]
#[test_case(BackoffType::Exponential, 40 => 1000; "huge attempt capped")]
fn test_retry_delay_ms(backoff: BackoffType, attempt: u32) -> u64 {
    let policy = RetryPolicy {
        max_retries: 5,
        backoff,
        initial_delay: Duration::from_millis(100),
        max_delay: Duration::from_secs(1),
    };
    policy.delay(attempt).as_millis() as u64
}

#[test]
fn test_throttle_delay_honors_hint_up_to_max() {
    let policy = RetryPolicy::default();

    pretty_assertions::assert_eq!(
        policy.throttle_delay(Some(Duration::from_secs(2)), 0),
        Duration::from_secs(2)
    );
    pretty_assertions::assert_eq!(
        policy.throttle_delay(Some(Duration::from_secs(86_400)), 0),
        Duration::from_secs(20)
    );
    pretty_assertions::assert_eq!(policy.throttle_delay(None, 1), policy.delay(1));
}

#[test]
fn test_retry_policy_none() {
    let policy = RetryPolicy::none();
    pretty_assertions::assert_eq!(policy.max_retries, 0);
    pretty_assertions::assert_eq!(policy.max_delay, RetryPolicy::default().max_delay);
}

// ============================================================================
// Config and URLs
// ============================================================================

#[test]
fn test_config_defaults() {
    let config = HttpClientConfig::new("https://dns.example.com/2013-04-01").unwrap();

    pretty_assertions::assert_eq!(config.timeout, Duration::from_secs(30));
    pretty_assertions::assert_eq!(config.retry, RetryPolicy::default());
    pretty_assertions::assert_eq!(config.rate_limit, Some(RateLimiterConfig::default()));
    assert!(config.user_agent.starts_with("zonepager/"));
}

#[test]
fn test_config_rejects_bad_base_url() {
    assert!(matches!(
        HttpClientConfig::new("dns.example.com"),
        Err(Error::InvalidUrl(_))
    ));
}

#[test]
fn test_page_url_keeps_api_prefix() {
    let config = HttpClientConfig::new("https://dns.example.com/2013-04-01/").unwrap();
    let client = HttpClient::new(config).unwrap();

    let url = client.page_url("/hostedzone", &query(&[("marker", "Z2"), ("maxitems", "50")]));
    pretty_assertions::assert_eq!(
        url.as_str(),
        "https://dns.example.com/2013-04-01/hostedzone?marker=Z2&maxitems=50"
    );
}

#[test]
fn test_page_url_keeps_encoded_segment_and_escapes_query() {
    let config = HttpClientConfig::new("http://localhost:9000").unwrap();
    let client = HttpClient::new(config).unwrap();

    let url = client.page_url("/zone%2Fbackups", &query(&[("prefix", "2024/01 db")]));
    pretty_assertions::assert_eq!(url.path(), "/zone%2Fbackups");
    pretty_assertions::assert_eq!(url.query(), Some("prefix=2024%2F01+db"));
}

#[test]
fn test_invalid_header_is_rejected_up_front() {
    let config = HttpClientConfig::new("http://localhost")
        .unwrap()
        .with_header("Authorization", "Bearer\nsplit");
    let err = HttpClient::new(config).unwrap_err();
    assert!(err.to_string().contains("headers.Authorization"));
}

#[test]
fn test_debug_hides_headers() {
    let config = HttpClientConfig::new("http://localhost")
        .unwrap()
        .with_header("Authorization", "Bearer secret");
    let debug = format!("{:?}", HttpClient::new(config).unwrap());

    assert!(debug.contains("HttpClient"));
    assert!(debug.contains("rate_limiter: Some"));
    assert!(!debug.contains("secret"));
}

// ============================================================================
// Page requests
// ============================================================================

#[tokio::test]
async fn test_get_json_sends_query_and_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hostedzone"))
        .and(query_param("marker", "Z2"))
        .and(query_param("maxitems", "50"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "HostedZones": [],
            "IsTruncated": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpClientConfig::new(&server.uri())
        .unwrap()
        .with_header("Authorization", "Bearer secret")
        .with_rate_limit(None);
    let client = HttpClient::new(config).unwrap();

    let body: JsonValue = client
        .get_json("/hostedzone", &query(&[("marker", "Z2"), ("maxitems", "50")]))
        .await
        .unwrap();

    pretty_assertions::assert_eq!(body["IsTruncated"], false);
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/healthcheck"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<ListHealthChecksResponse/>"))
        .mount(&server)
        .await;

    let client = transport(&server, RetryPolicy::none());
    let result = client.get_json::<JsonValue>("/healthcheck", &no_query()).await;

    assert!(matches!(result, Err(Error::Decode { .. })));
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/delegationset"))
        .respond_with(ResponseTemplate::new(400).set_body_string("InvalidInput"))
        .expect(1)
        .mount(&server)
        .await;

    let client = transport(&server, quick_retry(3));
    let err = client
        .get_json::<JsonValue>("/delegationset", &no_query())
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            pretty_assertions::assert_eq!(status, 400);
            pretty_assertions::assert_eq!(body, "InvalidInput");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_is_retried_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trafficpolicies"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/trafficpolicies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "TrafficPolicySummaries": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = transport(&server, quick_retry(2));
    let body: JsonValue = client.get_json("/trafficpolicies", &no_query()).await.unwrap();

    pretty_assertions::assert_eq!(body["TrafficPolicySummaries"], json!([]));
}

#[tokio::test]
async fn test_gives_up_with_last_status_after_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hostedzone"))
        .respond_with(ResponseTemplate::new(503).set_body_string("ServiceUnavailable"))
        .expect(3)
        .mount(&server)
        .await;

    let client = transport(&server, quick_retry(2));
    let err = client
        .get_json::<JsonValue>("/hostedzone", &no_query())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::HttpStatus { status: 503, ref body } if body == "ServiceUnavailable"
    ));
}

#[tokio::test]
async fn test_throttled_request_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/healthcheck"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "0")
                .set_body_string("Throttling"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/healthcheck"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"HealthChecks": []})))
        .mount(&server)
        .await;

    let client = transport(&server, quick_retry(1));
    let body: JsonValue = client.get_json("/healthcheck", &no_query()).await.unwrap();

    pretty_assertions::assert_eq!(body["HealthChecks"], json!([]));
}

#[tokio::test]
async fn test_long_retry_after_is_clamped_to_max_delay() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hostedzone"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "86400"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hostedzone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"HostedZones": []})))
        .mount(&server)
        .await;

    let client = transport(&server, quick_retry(1));
    let body: JsonValue = tokio::time::timeout(
        Duration::from_secs(5),
        client.get_json("/hostedzone", &no_query()),
    )
    .await
    .expect("Retry-After was not clamped")
    .unwrap();

    pretty_assertions::assert_eq!(body["HostedZones"], json!([]));
}

#[tokio::test]
async fn test_throttling_past_retries_reports_server_hint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cidrcollection"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "86400"))
        .expect(2)
        .mount(&server)
        .await;

    let client = transport(&server, quick_retry(1));
    let err = client
        .get_json::<JsonValue>("/cidrcollection", &no_query())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_seconds: 86_400
        }
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_rate_limited_transport_sends_every_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hostedzone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"HostedZones": []})))
        .expect(3)
        .mount(&server)
        .await;

    let config = HttpClientConfig::new(&server.uri())
        .unwrap()
        .with_rate_limit(Some(RateLimiterConfig::new(100, 10).unwrap()));
    let client = HttpClient::new(config).unwrap();
    assert!(client.is_rate_limited());

    for _ in 0..3 {
        let _: JsonValue = client.get_json("/hostedzone", &no_query()).await.unwrap();
    }
}
