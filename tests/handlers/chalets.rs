use chrono::{Duration, Utc};

use crate::common::TestApp;

#[tokio::test]
async fn test_public_catalog_lists_only_approved_live_chalets() {
    let app = TestApp::new().await;

    let response = app.client.get(app.url("/api/v1/chalets")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body: Vec<serde_json::Value> = response.json().await.unwrap();
    let ids: Vec<&str> = body.iter().map(|c| c["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["c-cedars", "c-faraya"]);
}

#[tokio::test]
async fn test_public_catalog_filters_by_location() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url("/api/v1/chalets?location=Faraya"))
        .send()
        .await
        .unwrap();

    let body: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["service_status"], "CLEANING");
}

#[tokio::test]
async fn test_public_catalog_ignores_status_override() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url("/api/v1/chalets?status=PENDING"))
        .send()
        .await
        .unwrap();

    let body: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(body.iter().all(|c| c["status"] == "APPROVED"));
}

#[tokio::test]
async fn test_hidden_chalet_returns_404() {
    let app = TestApp::new().await;

    for id in ["c-laqlouq", "c-ehden", "c-missing"] {
        let response = app
            .client
            .get(app.url(&format!("/api/v1/chalets/{id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 404, "{id} should not be visible");
    }

    let response = app.client.get(app.url("/api/v1/chalets/c-cedars")).send().await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_quote_prices_nights_and_reports_availability() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url("/api/v1/chalets/c-cedars/quote?check_in=2024-06-01&check_out=2024-06-04"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["quote"]["nights"], 3);
    assert_eq!(body["quote"]["total_price"], 600.0);
    assert_eq!(body["available"], true);

    // The seeded confirmed stay occupies early March 2024
    let response = app
        .client
        .get(app.url("/api/v1/chalets/c-cedars/quote?check_in=2024-03-02&check_out=2024-03-05"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["available"], false);
}

#[tokio::test]
async fn test_quote_rejects_inverted_dates() {
    let app = TestApp::new().await;
    let check_in = Utc::now().date_naive() + Duration::days(10);
    let check_out = check_in - Duration::days(2);

    let response = app
        .client
        .get(app.url(&format!(
            "/api/v1/chalets/c-cedars/quote?check_in={check_in}&check_out={check_out}"
        )))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}
