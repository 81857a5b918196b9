use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use pricecheck_catalog::{CatalogError, CatalogFetcher, League, RateLimit, RawListing};
use pricecheck_server::{api::app_router, build_state_with_fetcher, config::Config};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

struct StaticFetcher {
    categories: HashMap<String, Vec<RawListing>>,
    healthy: bool,
    calls: AtomicUsize,
}

impl StaticFetcher {
    fn new(healthy: bool) -> Self {
        let mut categories = HashMap::new();
        categories.insert(
            "UniqueAccessory".to_string(),
            vec![
                RawListing::new("Mageblood", dec!(15000)),
                RawListing::new("Headhunter", dec!(9000)),
                RawListing::new(format!("{}{}", "b".repeat(35), "a".repeat(65)), dec!(1)),
            ],
        );
        categories.insert(
            "Currency".to_string(),
            vec![RawListing::new("Divine Orb", dec!(180))],
        );
        Self {
            categories,
            healthy,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CatalogFetcher for StaticFetcher {
    fn id(&self) -> &'static str {
        "STATIC"
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 60_000,
            burst: 1_000,
        }
    }

    async fn fetch_category(
        &self,
        category: &str,
        _league: &League,
    ) -> Result<Vec<RawListing>, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.healthy {
            return Err(CatalogError::Http {
                category: category.to_string(),
                status: 503,
            });
        }
        Ok(self.categories.get(category).cloned().unwrap_or_default())
    }

    async fn fetch_reference_rate(&self, _league: &League) -> Result<Decimal, CatalogError> {
        Ok(dec!(180))
    }
}

async fn app(fetcher: Arc<StaticFetcher>) -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let mut config = Config::from_vars(|_| None).unwrap();
    config.catalog.categories = vec!["UniqueAccessory".to_string(), "Currency".to_string()];
    config.catalog.snapshot_dir = Some(tmp.path().to_path_buf());
    let state = build_state_with_fetcher(&config, fetcher).await.unwrap();
    (app_router(state, &config).unwrap(), tmp)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

#[tokio::test]
async fn liveness() {
    let (app, _tmp) = app(Arc::new(StaticFetcher::new(true))).await;
    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "API online for !pricecheck");
}

#[tokio::test]
async fn lists_leagues() {
    let (app, _tmp) = app(Arc::new(StaticFetcher::new(true))).await;
    let (status, body) = get(app, "/leagues").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!(["Mercenaries", "Hardcore Mercenaries", "Standard", "Hardcore"])
    );
}

#[tokio::test]
async fn fuzzy_price_check() {
    let (app, _tmp) = app(Arc::new(StaticFetcher::new(true))).await;
    let (status, body) = get(app, "/pricecheck?item=magebl00d").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"], "Mageblood");
    assert_eq!(body["chaosValue"], 15000.0);
    assert_eq!(body["divineValue"], 83.3);
    assert_eq!(body["divineChaosEquivalent"], 180.0);
    assert_eq!(body["league"], "Mercenaries");
    assert_eq!(
        body["message"],
        "Closest match for 'magebl00d'. Mageblood: 15000 chaos (83.3 divine) in Mercenaries"
    );
}

#[tokio::test]
async fn exact_price_check_in_named_league() {
    let (app, _tmp) = app(Arc::new(StaticFetcher::new(true))).await;
    let (status, body) = get(app, "/pricecheck?item=divine%20orb&league=standard").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"], "Divine Orb");
    assert_eq!(body["league"], "Standard");
    assert_eq!(body["exact"], true);
    assert_eq!(body["divineValue"], 1.0);
    assert!(body["message"].as_str().unwrap().starts_with("Divine Orb: 180"));
}

#[tokio::test]
async fn missing_item_is_bad_request() {
    let (app, _tmp) = app(Arc::new(StaticFetcher::new(true))).await;
    let (status, body) = get(app, "/pricecheck").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameter: item");
}

#[tokio::test]
async fn malformed_query_string_is_json_bad_request() {
    let fetcher = Arc::new(StaticFetcher::new(true));
    let (app, _tmp) = app(fetcher.clone()).await;
    let (status, body) = get(app, "/pricecheck?item=Mageblood&item=Headhunter").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Invalid query string:"), "{}", error);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_league_is_rejected_before_fetching() {
    let fetcher = Arc::new(StaticFetcher::new(true));
    let (app, _tmp) = app(fetcher.clone()).await;
    let (status, body) = get(app, "/pricecheck?item=Mageblood&league=Necropolis").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown league: Necropolis");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unrelated_item_is_not_found() {
    let (app, _tmp) = app(Arc::new(StaticFetcher::new(true))).await;
    let (status, body) = get(app, "/pricecheck?item=xyzxyz").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Item 'xyzxyz' not found");
    assert!(body.get("suggestions").is_none());
}

#[tokio::test]
async fn near_miss_returns_suggestions() {
    let (app, _tmp) = app(Arc::new(StaticFetcher::new(true))).await;
    let uri = format!("/pricecheck?item={}", "a".repeat(100));
    let (status, body) = get(app, &uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0]["score"], 65);
}

#[tokio::test]
async fn empty_catalog_is_service_unavailable() {
    let (app, _tmp) = app(Arc::new(StaticFetcher::new(false))).await;
    let (status, body) = get(app, "/pricecheck?item=Mageblood").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("Mercenaries"));
}

#[tokio::test]
async fn status_reflects_refreshed_league() {
    let (app, _tmp) = app(Arc::new(StaticFetcher::new(true))).await;
    let (status, _) = get(app.clone(), "/pricecheck?item=Mageblood").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(app, "/status").await;
    assert_eq!(status, StatusCode::OK);
    let leagues = body.as_array().unwrap();
    assert_eq!(leagues[0]["league"], "Mercenaries");
    assert_eq!(leagues[0]["state"], "fresh");
    assert_eq!(leagues[0]["entities"], 4);
    assert_eq!(leagues[0]["rateSource"], "upstream");
    assert_eq!(leagues[1]["state"], "empty");
}
