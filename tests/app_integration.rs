use axum::body::Body;
use axum::http::{Request, StatusCode};
use finboard::core::config::{AppConfig, ProviderConfig};
use finboard::server::create_router;
use finboard::service::QuoteService;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use tracing::info;

// Every upstream is served by one mock server; the routes do not overlap.
mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const RATES: &str = r#"{
        "result": "success",
        "base_code": "USD",
        "rates": {"USD": 1, "KRW": 1380.5, "JPY": 150.0}
    }"#;

    pub const INDEX: &str = r#"{
        "chart": {
            "result": [{"meta": {"regularMarketPrice": 5050.0, "chartPreviousClose": 5000.0}}],
            "error": null
        }
    }"#;

    pub async fn mount_rates(server: &MockServer, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/v6/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RATES))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    pub async fn mount_coingecko(server: &MockServer) {
        let prices = [
            ("pax-gold", 4_000_000.0, 0.8),
            ("bitcoin", 95_000_000.0, 2.5),
            ("ethereum", 4_800_000.0, -1.2),
            ("ripple", 850.0, 0.0),
        ];
        for (id, price, change) in prices {
            let body = format!(r#"{{"{id}": {{"krw": {price}, "krw_24h_change": {change}}}}}"#);
            Mock::given(method("GET"))
                .and(path("/api/v3/simple/price"))
                .and(query_param("ids", id))
                .and(query_param("vs_currencies", "krw"))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(server)
                .await;
        }
    }

    pub async fn mount_index(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/%5EGSPC"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    pub async fn start_all_upstreams() -> MockServer {
        let server = MockServer::start().await;
        mount_rates(&server, 1).await;
        mount_coingecko(&server).await;
        mount_index(&server, ResponseTemplate::new(200).set_body_string(INDEX)).await;
        server
    }
}

fn config_for(base_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    let provider = ProviderConfig {
        base_url: base_url.to_string(),
    };
    config.providers.exchange_rate = provider.clone();
    config.providers.coingecko = provider.clone();
    config.providers.yahoo = provider;
    config
}

async fn get_json(service: &Arc<QuoteService>, uri: &str) -> (StatusCode, Value) {
    info!(uri, "Requesting");
    let response = create_router(Arc::clone(service))
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn history_len(record: &Value) -> usize {
    record["history"].as_array().unwrap().len()
}

fn last_value(record: &Value) -> f64 {
    record["history"].as_array().unwrap().last().unwrap()["value"]
        .as_f64()
        .unwrap()
}

#[test_log::test(tokio::test)]
async fn test_exchange_rate_route_is_cached() {
    let mock_server = test_utils::start_all_upstreams().await;
    let service = Arc::new(QuoteService::from_config(&config_for(&mock_server.uri())));

    let (status, first) = get_json(&service, "/api/exchange-rate?pair=USD/KRW").await;
    let (_, second) = get_json(&service, "/api/exchange-rate?pair=USD/KRW&period=1day").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["current"], 1380.5);
    assert_eq!(history_len(&first), 24);
    assert_eq!(last_value(&first), 1380.5);
    assert!(first["change24h"].is_number());
    assert_eq!(first, second);
    // The rates mock expects exactly one call; verified when the server drops.
}

#[test_log::test(tokio::test)]
async fn test_yen_cross_rate() {
    let mock_server = test_utils::start_all_upstreams().await;
    let service = Arc::new(QuoteService::from_config(&config_for(&mock_server.uri())));

    let (status, record) = get_json(&service, "/api/exchange-rate?pair=JPY/KRW&period=1week").await;

    assert_eq!(status, StatusCode::OK);
    let current = record["current"].as_f64().unwrap();
    assert!((current - 1380.5 / 150.0).abs() < 1e-9);
    assert_eq!(history_len(&record), 28);
}

#[test_log::test(tokio::test)]
async fn test_unknown_pair_is_server_error() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_rates(&mock_server, 0).await;
    let service = Arc::new(QuoteService::from_config(&config_for(&mock_server.uri())));

    let (status, body) = get_json(&service, "/api/exchange-rate?pair=EUR/KRW").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch exchange rate");
}

#[test_log::test(tokio::test)]
async fn test_missing_pair_is_bad_request() {
    let mock_server = test_utils::start_all_upstreams().await;
    let service = Arc::new(QuoteService::from_config(&config_for(&mock_server.uri())));

    let (status, body) = get_json(&service, "/api/exchange-rate").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameter: pair");
    // Nothing reached the rates source, so drop the expectation of one call.
    mock_server.reset().await;
}

#[test_log::test(tokio::test)]
async fn test_gold_and_crypto_routes() {
    let mock_server = test_utils::start_all_upstreams().await;
    let service = Arc::new(QuoteService::from_config(&config_for(&mock_server.uri())));

    let (status, gold) = get_json(&service, "/api/gold?period=1month").await;
    assert_eq!(status, StatusCode::OK);
    // 4,000,000 per troy ounce is 482,260.84 per 3.75 g.
    assert!((gold["current"].as_f64().unwrap() - 482_260.84).abs() < 0.01);
    assert_eq!(gold["change24h"], 0.8);
    assert_eq!(history_len(&gold), 30);

    let (status, btc) = get_json(&service, "/api/crypto/btc?period=6month").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(btc["current"], 95_000_000.0);
    assert_eq!(btc["change24h"], 2.5);
    assert_eq!(history_len(&btc), 180);

    let (status, body) = get_json(&service, "/api/crypto/doge").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch cryptocurrency price");

    mock_server.reset().await;
}

#[test_log::test(tokio::test)]
async fn test_sp500_route() {
    let mock_server = test_utils::start_all_upstreams().await;
    let service = Arc::new(QuoteService::from_config(&config_for(&mock_server.uri())));

    let (status, record) = get_json(&service, "/api/sp500?period=1year").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["current"], 5050.0);
    assert_eq!(record["change24h"], 1.0);
    assert_eq!(history_len(&record), 365);

    mock_server.reset().await;
}

#[test_log::test(tokio::test)]
async fn test_all_route_with_index_outage() {
    let mock_server = wiremock::MockServer::start().await;
    // USD/KRW and JPY/KRW are separate cache entries.
    test_utils::mount_rates(&mock_server, 2).await;
    test_utils::mount_coingecko(&mock_server).await;
    test_utils::mount_index(&mock_server, wiremock::ResponseTemplate::new(503)).await;
    let service = Arc::new(QuoteService::from_config(&config_for(&mock_server.uri())));

    let (status, body) = get_json(
        &service,
        "/api/all?exchangePeriod=1week&goldPeriod=1month&cryptoPeriod=&sp500Period=1year",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(history_len(&body["exchangeRates"]["usdKrw"]), 28);
    assert_eq!(history_len(&body["exchangeRates"]["jpyKrw"]), 28);
    assert_eq!(history_len(&body["gold"]), 30);
    assert_eq!(history_len(&body["crypto"]["btc"]), 24);
    assert_eq!(body["crypto"]["eth"]["change24h"], -1.2);
    assert_eq!(body["crypto"]["xrp"]["current"], 850.0);
    assert_eq!(body["sp500"]["current"], 0.0);
    assert_eq!(body["sp500"]["change24h"], 0.0);
    assert_eq!(history_len(&body["sp500"]), 0);
}

#[test_log::test(tokio::test)]
async fn test_all_route_fails_when_a_source_fails() {
    let mock_server = wiremock::MockServer::start().await;
    test_utils::mount_rates(&mock_server, 1).await;
    test_utils::mount_index(
        &mock_server,
        wiremock::ResponseTemplate::new(200).set_body_string(test_utils::INDEX),
    )
    .await;
    // No CoinGecko mocks: gold and crypto requests get 404.
    let service = Arc::new(QuoteService::from_config(&config_for(&mock_server.uri())));

    let (status, body) = get_json(&service, "/api/all").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch dashboard data");

    mock_server.reset().await;
}

#[test_log::test(tokio::test)]
async fn test_config_file_drives_service() -> anyhow::Result<()> {
    let mock_server = test_utils::start_all_upstreams().await;
    let temp_dir = tempfile::tempdir()?;
    let config_path = temp_dir.path().join("config.yaml");
    let uri = mock_server.uri();
    std::fs::write(
        &config_path,
        format!(
            r#"
cache:
  ttl_seconds: 60
providers:
  exchange_rate:
    base_url: "{uri}"
  coingecko:
    base_url: "{uri}"
  yahoo:
    base_url: "{uri}"
"#
        ),
    )?;

    let config = AppConfig::load_from_path(&config_path)?;
    assert_eq!(config.cache.ttl_seconds, 60);
    assert_eq!(config.server.bind, "127.0.0.1:3001");

    let service = Arc::new(QuoteService::from_config(&config));
    let (status, health) = get_json(&service, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");

    let (status, xrp) = get_json(&service, "/api/crypto/XRP").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(xrp["current"], 850.0);

    mock_server.reset().await;
    Ok(())
}
