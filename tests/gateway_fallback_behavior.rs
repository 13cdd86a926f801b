use std::sync::Arc;
use std::time::Duration;

use stockcast_core::http_client::{
    FailingHttpClient, HttpClient, HttpResponse, ScriptedHttpClient,
};
use stockcast_core::{
    DataOrigin, DataSourceGateway, GatewayConfig, Horizon, Market, ProviderId, RateBudget,
    RequestSequencer, Symbol, TradingDate, ValidationError,
};

fn anchor() -> TradingDate {
    TradingDate::parse("2024-06-28").expect("anchor date")
}

fn symbol(value: &str) -> Symbol {
    Symbol::parse(value).expect("valid symbol")
}

fn live_config() -> GatewayConfig {
    GatewayConfig::default()
        .with_live(true)
        .with_seed(Some(11))
        .with_timeout_ms(250)
}

/// Live gateway with its own free-tier Alpha Vantage budget, so tests in this
/// binary never drain each other's quota.
fn live_gateway(client: Arc<dyn HttpClient>) -> DataSourceGateway {
    DataSourceGateway::with_rate_budget(&live_config(), client, RateBudget::alphavantage_free_tier())
        .anchored_at(anchor())
}

const QUOTE_BODY: &str = r#"{"Global Quote":{"05. price":"1234.50","09. change":"4.50","10. change percent":"0.3659%"}}"#;

const AV_DAILY_BODY: &str = r#"{"Time Series (Daily)":{
    "2024-06-27":{"1. open":"3800.0","2. high":"3850.0","3. low":"3790.0","4. close":"3840.0","5. volume":"120000"},
    "2024-06-28":{"1. open":"3840.0","2. high":"3870.0","3. low":"3820.0","4. close":"3861.5","5. volume":"98000"}
}}"#;

#[tokio::test]
async fn unreachable_upstreams_still_answer_every_call() {
    // Given: live mode with a transport that refuses every connection
    let gateway = live_gateway(Arc::new(FailingHttpClient::default()));
    let horizon = Horizon::new(7).expect("horizon");

    // When: every gateway call is made
    let us_history = gateway.historical(&symbol("AAPL")).await.expect("us history");
    let india_history = gateway
        .historical(&symbol("RELIANCE.BSE"))
        .await
        .expect("india history");
    let prediction = gateway
        .prediction(&symbol("AAPL"), horizon)
        .await
        .expect("prediction");
    let popular_us = gateway.popular(Market::Us).await;
    let popular_india = gateway.popular(Market::India).await;
    let search = gateway.search(".BSE").await.expect("search");
    let chart = gateway
        .chart(&symbol("MSFT"), Some(horizon))
        .await
        .expect("chart");

    // Then: each result is synthetic, non-empty and explains the fallback
    assert_eq!(us_history.data.len(), 91);
    assert_eq!(india_history.data.len(), 91);
    assert_eq!(prediction.data.len(), 7);
    assert_eq!(popular_us.data.len(), 8);
    assert_eq!(popular_india.data.len(), 6);
    assert_eq!(search.data.len(), 5);
    assert!(search.data.iter().all(|stock| stock.market == Market::India));
    assert_eq!(chart.data.len(), 98);

    for (origin, warnings) in [
        (us_history.origin, &us_history.warnings),
        (india_history.origin, &india_history.warnings),
        (prediction.origin, &prediction.warnings),
        (popular_us.origin, &popular_us.warnings),
        (popular_india.origin, &popular_india.warnings),
        (search.origin, &search.warnings),
        (chart.origin, &chart.warnings),
    ] {
        assert_eq!(origin, DataOrigin::Synthetic);
        assert!(!warnings.is_empty());
    }

    // the Indian query tries Alpha Vantage before the backend
    assert_eq!(search.warnings.len(), 2);
    assert!(search.warnings[0].contains("alphavantage"));
    assert!(search.warnings[1].contains("backend"));
}

#[tokio::test]
async fn offline_mode_never_touches_the_network() {
    // Given: live mode disabled over a recording transport
    let client = Arc::new(ScriptedHttpClient::new());
    let config = GatewayConfig::default().with_seed(Some(3));
    let gateway = DataSourceGateway::new(&config, client.clone()).anchored_at(anchor());

    // When: data is requested
    let history = gateway.historical(&symbol("TSLA")).await.expect("history");
    let popular = gateway.popular(Market::Us).await;

    // Then: synthetic data is served silently and no request is sent
    assert_eq!(history.origin, DataOrigin::Synthetic);
    assert!(history.warnings.is_empty());
    assert_eq!(popular.origin, DataOrigin::Synthetic);
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn alpha_vantage_error_payloads_fall_back() {
    // Given: Alpha Vantage answering 200 with an error document
    let client = ScriptedHttpClient::new().route(
        "function=TIME_SERIES_DAILY",
        HttpResponse::ok_json(r#"{"Error Message":"Invalid API call."}"#),
    );
    let gateway = live_gateway(Arc::new(client));

    // When: an Indian symbol's history is requested
    let history = gateway
        .historical(&symbol("TCS.BSE"))
        .await
        .expect("history");

    // Then: the generated series replaces it and the schema problem is reported
    assert_eq!(history.origin, DataOrigin::Synthetic);
    assert_eq!(history.data.len(), 91);
    assert_eq!(history.data.last().map(|point| point.date), Some(anchor()));
    assert!(history.warnings[0].contains("source.schema_mismatch"));
}

#[tokio::test]
async fn healthy_backend_results_are_passed_through() {
    // Given: a backend that serves history and the popular list
    let history_body = r#"[
        {"date":"2024-06-27","open":210.0,"high":212.5,"low":208.1,"close":211.3,"volume":5100000},
        {"date":"2024-06-28","open":211.3,"high":214.0,"low":210.2,"close":213.9,"volume":4800000}
    ]"#;
    let popular_body = r#"[
        {"symbol":"AAPL","name":"Apple Inc.","price":213.9,"change":2.6,"changePercent":1.23}
    ]"#;
    let client = ScriptedHttpClient::new()
        .route("/historical/AAPL", HttpResponse::ok_json(history_body))
        .route("/popular-stocks", HttpResponse::ok_json(popular_body));
    let gateway = DataSourceGateway::new(&live_config(), Arc::new(client)).anchored_at(anchor());

    // When: history, listing and a history-only chart are requested
    let history = gateway.historical(&symbol("AAPL")).await.expect("history");
    let popular = gateway.popular(Market::Us).await;
    let chart = gateway.chart(&symbol("AAPL"), None).await.expect("chart");

    // Then: the live data is returned untouched
    assert_eq!(history.origin, DataOrigin::Live(ProviderId::Backend));
    assert_eq!(history.data.len(), 2);
    assert_eq!(history.data[1].close, 213.9);
    assert!(history.warnings.is_empty());

    assert_eq!(popular.origin, DataOrigin::Live(ProviderId::Backend));
    assert_eq!(popular.data[0].currency, "USD");

    assert_eq!(chart.origin, DataOrigin::Live(ProviderId::Backend));
    assert_eq!(chart.data.len(), 2);
    assert!(chart.data.iter().all(|row| row.predicted.is_none()));
}

#[tokio::test]
async fn chart_prediction_continues_from_live_history_when_prediction_fails() {
    // Given: live history ending the day before the anchor and a failing /predict
    let history_body = r#"[
        {"date":"2024-06-26","open":49.0,"high":50.5,"low":48.7,"close":49.6,"volume":910000},
        {"date":"2024-06-27","open":49.6,"high":50.4,"low":49.2,"close":50.0,"volume":870000}
    ]"#;
    let client = ScriptedHttpClient::new()
        .route("/historical/AAPL", HttpResponse::ok_json(history_body))
        .route("/predict/AAPL", HttpResponse::new(500, "internal error"));
    let gateway = live_gateway(Arc::new(client))
        .anchored_at(TradingDate::parse("2024-06-30").expect("anchor"));
    let horizon = Horizon::new(3).expect("horizon");

    // When: the chart is requested
    let chart = gateway
        .chart(&symbol("AAPL"), Some(horizon))
        .await
        .expect("chart");

    // Then: the prediction picks up right after the served history at its price
    assert_eq!(chart.origin, DataOrigin::Synthetic);
    assert_eq!(chart.data.len(), 5);
    assert_eq!(chart.data[1].actual, Some(50.0));

    let predicted: Vec<_> = chart.data[2..].iter().collect();
    assert!(predicted.iter().all(|row| row.actual.is_none()));
    assert_eq!(predicted[0].date.format_iso(), "2024-06-28");
    assert_eq!(predicted[2].date.format_iso(), "2024-06-30");
    let first = predicted[0].predicted.expect("first prediction");
    assert!((45.0..=55.0).contains(&first), "first prediction {first} drifted from 50.0");
    assert!(chart.warnings.iter().any(|w| w.starts_with("prediction:")));
}

#[tokio::test]
async fn india_listing_stays_within_the_free_tier_budget() {
    // Given: Alpha Vantage answering every quote and daily series request
    let client = Arc::new(
        ScriptedHttpClient::new()
            .route("function=GLOBAL_QUOTE", HttpResponse::ok_json(QUOTE_BODY))
            .route("function=TIME_SERIES_DAILY", HttpResponse::ok_json(AV_DAILY_BODY)),
    );
    let gateway = live_gateway(client.clone());

    // When: the Indian listing is followed by an Indian history request
    let popular = gateway.popular(Market::India).await;
    let history = gateway
        .historical(&symbol("TCS.BSE"))
        .await
        .expect("history");

    // Then: every listing is present, unquoted ones are named, and quota remains
    assert_eq!(popular.origin, DataOrigin::Live(ProviderId::AlphaVantage));
    let symbols: Vec<&str> = popular.data.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(
        symbols,
        [
            "RELIANCE.BSE",
            "TCS.BSE",
            "HDFCBANK.BSE",
            "INFY.BSE",
            "HINDUNILVR.BSE",
            "TATAMOTORS.BSE"
        ]
    );
    assert!(popular.data[..4].iter().all(|stock| stock.price == 1234.50));
    assert_eq!(popular.warnings.len(), 2);
    assert!(popular.warnings[0].contains("HINDUNILVR.BSE"));
    assert!(popular.warnings[1].contains("TATAMOTORS.BSE"));

    assert_eq!(history.origin, DataOrigin::Live(ProviderId::AlphaVantage));
    assert_eq!(history.data.len(), 2);
    assert!(history.warnings.is_empty());

    let quote_requests = client
        .requests()
        .iter()
        .filter(|request| request.url.contains("GLOBAL_QUOTE"))
        .count();
    assert_eq!(quote_requests, 4);
}

#[tokio::test]
async fn roomy_budget_quotes_the_whole_india_listing() {
    let client = ScriptedHttpClient::new()
        .route("function=GLOBAL_QUOTE", HttpResponse::ok_json(QUOTE_BODY));
    let gateway = DataSourceGateway::with_rate_budget(
        &live_config(),
        Arc::new(client),
        RateBudget::new(Duration::from_secs(60), 30),
    );

    let popular = gateway.popular(Market::India).await;

    assert_eq!(popular.origin, DataOrigin::Live(ProviderId::AlphaVantage));
    assert_eq!(popular.data.len(), 6);
    assert!(popular.data.iter().all(|stock| stock.price == 1234.50));
    assert!(popular.warnings.is_empty());
}

#[tokio::test]
async fn gateways_sharing_a_budget_share_the_alpha_vantage_quota() {
    // Given: two gateways built over one single-call budget
    let budget = RateBudget::new(Duration::from_secs(60), 1);
    let client: Arc<dyn HttpClient> = Arc::new(
        ScriptedHttpClient::new()
            .route("function=TIME_SERIES_DAILY", HttpResponse::ok_json(AV_DAILY_BODY)),
    );
    let first = DataSourceGateway::with_rate_budget(&live_config(), client.clone(), budget.clone())
        .anchored_at(anchor());
    let second = DataSourceGateway::with_rate_budget(&live_config(), client, budget)
        .anchored_at(anchor());

    // When: each gateway requests Indian history
    let served = first.historical(&symbol("INFY.BSE")).await.expect("first");
    let limited = second.historical(&symbol("INFY.BSE")).await.expect("second");

    // Then: the second call finds the quota spent and falls back
    assert_eq!(served.origin, DataOrigin::Live(ProviderId::AlphaVantage));
    assert_eq!(limited.origin, DataOrigin::Synthetic);
    assert!(limited.warnings[0].contains("source.rate_limited"));
}

#[tokio::test]
async fn blank_search_is_a_caller_error() {
    let gateway = DataSourceGateway::new(
        &GatewayConfig::default(),
        Arc::new(FailingHttpClient::default()),
    );

    let error = gateway.search("   ").await.expect_err("blank query");
    assert_eq!(error, ValidationError::EmptyQuery);
}

#[tokio::test]
async fn superseded_search_results_can_be_discarded() {
    // Given: an offline gateway and a sequencer keyed by search box
    let gateway = DataSourceGateway::new(
        &GatewayConfig::default(),
        Arc::new(FailingHttpClient::default()),
    );
    let sequencer = RequestSequencer::new();

    // When: a second search is issued before the first one completes
    let first = sequencer.issue("search-box");
    let pending = gateway.search("apple");
    let second = sequencer.issue("search-box");
    let (stale, fresh) = tokio::join!(pending, gateway.search("micro"));

    // Then: only the latest request is still current
    assert_eq!(stale.expect("first search").data[0].symbol.as_str(), "AAPL");
    assert_eq!(fresh.expect("second search").data[0].symbol.as_str(), "MSFT");
    assert!(!sequencer.is_current(&first));
    assert!(sequencer.is_current(&second));
}
