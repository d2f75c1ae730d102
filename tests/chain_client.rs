//! Integration tests for the REST-backed chain reader
//!
//! Verifies endpoint paths, response decoding, and the error mapping the
//! snapshot assembler relies on to tell absence apart from broken transport.

use oraclescope::chain::{ChainError, LcdClient, OracleReader};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VALOPER: &str = "umeevaloper1testsubject";

fn client(server: &MockServer) -> LcdClient {
    LcdClient::new(server.uri(), reqwest::Client::new())
}

#[tokio::test]
async fn reads_slash_window_progress() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/umee/oracle/v1/slash_window"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "window_progress": "4123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = client(&server).slash_window().await.unwrap();
    assert_eq!(state.window_progress, 4123);
}

#[tokio::test]
async fn reads_oracle_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/umee/oracle/v1/params"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "params": {
                "vote_period": "5",
                "slash_window": "100800",
                "min_valid_per_window": "0.050000000000000000",
                "slash_fraction": "0.000100000000000000",
                "accept_list": [
                    {"base_denom": "uumee", "symbol_denom": "UMEE"}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let params = client(&server).params().await.unwrap();
    assert_eq!(params.vote_period, 5);
    assert_eq!(params.slash_window, 100800);
    assert_eq!(params.accept_list.len(), 1);
}

#[tokio::test]
async fn reads_miss_counter_for_the_given_validator() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/umee/oracle/v1/validators/{VALOPER}/miss")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "miss_counter": "17"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let count = client(&server).miss_counter(VALOPER).await.unwrap();
    assert_eq!(count, 17);
}

#[tokio::test]
async fn reads_feeder_delegation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/umee/oracle/v1/validators/{VALOPER}/feeder")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "feeder_addr": "umee1feeder"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let feeder = client(&server).feeder_delegation(VALOPER).await.unwrap();
    assert_eq!(feeder, "umee1feeder");
}

#[tokio::test]
async fn reads_aggregate_prevote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/umee/oracle/v1/validators/{VALOPER}/aggregate_prevote"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "aggregate_prevote": {
                "hash": "af6c54b1e86876b7",
                "submit_block": "7602830",
                "voter": "umee1voter"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let prevote = client(&server).aggregate_prevote(VALOPER).await.unwrap();
    assert_eq!(prevote.submit_block, 7602830);
}

#[tokio::test]
async fn reads_aggregate_vote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/umee/oracle/v1/validators/{VALOPER}/aggregate_vote"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "aggregate_vote": {
                "exchange_rate_tuples": [
                    {"denom": "atom", "exchange_rate": "11.28"},
                    {"denom": "umee", "exchange_rate": "0.01"}
                ],
                "voter": "umee1voter"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vote = client(&server).aggregate_vote(VALOPER).await.unwrap();
    assert_eq!(vote.exchange_rate_tuples.len(), 2);
    assert_eq!(vote.exchange_rate_tuples[0].denom, "atom");
}

#[tokio::test]
async fn error_status_maps_to_absence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/umee/oracle/v1/validators/{VALOPER}/aggregate_vote"
        )))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server).aggregate_vote(VALOPER).await.unwrap_err();
    assert!(matches!(err, ChainError::Status { .. }));
    assert!(err.is_absence());
}

#[tokio::test]
async fn undecodable_body_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/umee/oracle/v1/slash_window"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).slash_window().await.unwrap_err();
    assert!(matches!(err, ChainError::Decode { .. }));
    assert!(!err.is_absence());
}

#[tokio::test]
async fn unreachable_node_maps_to_transport_error() {
    // Port 1 on loopback: nothing listens there
    let client = LcdClient::new(
        "http://127.0.0.1:1",
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()
            .unwrap(),
    );

    let err = client.slash_window().await.unwrap_err();
    assert!(matches!(err, ChainError::Transport { .. }));
    assert!(!err.is_absence());
}

#[tokio::test]
async fn error_message_names_the_failing_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/umee/oracle/v1/params"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server).params().await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("/umee/oracle/v1/params"));
    assert!(message.contains("503"));
}
