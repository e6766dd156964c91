use chrono::{Duration, Utc};

use crate::common::{login_as, TestApp, GUEST_EMAIL, GUEST_PASSWORD, HOST_EMAIL, HOST_PASSWORD};

#[tokio::test]
async fn test_host_routes_reject_customers() {
    let app = TestApp::new().await;
    let token = login_as(&app, GUEST_EMAIL, GUEST_PASSWORD).await;

    let response = app
        .anonymous_client()
        .get(app.url("/api/v1/host/chalets"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_host_lists_own_chalets() {
    let app = TestApp::new().await;
    let token = login_as(&app, HOST_EMAIL, HOST_PASSWORD).await;

    let response = app
        .anonymous_client()
        .get(app.url("/api/v1/host/chalets"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(body.len(), 3);
    assert!(body.iter().all(|c| c["owner_id"] == "u-host-1"));
}

#[tokio::test]
async fn test_host_creates_pending_chalet_for_self() {
    let app = TestApp::new().await;
    let token = login_as(&app, HOST_EMAIL, HOST_PASSWORD).await;

    let response = app
        .anonymous_client()
        .post(app.url("/api/v1/host/chalets"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "owner_id": "u-host-2",
            "name": "Bcharre Nest",
            "location": "Bcharre",
            "price_per_night": 180.0,
            "status": "APPROVED",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["owner_id"], "u-host-1");
    assert_eq!(body["status"], "PENDING");

    // Not in the public catalog until approved
    let id = body["id"].as_str().unwrap();
    let response = app
        .anonymous_client()
        .get(app.url(&format!("/api/v1/chalets/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_host_updates_only_own_chalets() {
    let app = TestApp::new().await;
    let token = login_as(&app, HOST_EMAIL, HOST_PASSWORD).await;

    let response = app
        .anonymous_client()
        .put(app.url("/api/v1/host/chalets/c-cedars"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "price_per_night": 210.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["price_per_night"], 210.0);
    assert_eq!(body["name"], "Cedars Ridge Chalet");

    let response = app
        .anonymous_client()
        .put(app.url("/api/v1/host/chalets/c-laqlouq"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "price_per_night": 10.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = app
        .anonymous_client()
        .delete(app.url("/api/v1/host/chalets/c-laqlouq"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_host_delete_is_idempotent_and_keeps_bookings() {
    let app = TestApp::new().await;
    let token = login_as(&app, HOST_EMAIL, HOST_PASSWORD).await;

    for _ in 0..2 {
        let response = app
            .anonymous_client()
            .delete(app.url("/api/v1/host/chalets/c-cedars"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 204);
    }

    let response = app
        .anonymous_client()
        .get(app.url("/api/v1/chalets/c-cedars"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // The guest's past stay at the removed chalet is still on record
    let guest = login_as(&app, GUEST_EMAIL, GUEST_PASSWORD).await;
    let response = app
        .anonymous_client()
        .get(app.url("/api/v1/bookings"))
        .bearer_auth(&guest)
        .send()
        .await
        .unwrap();
    let body: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(body.iter().any(|b| b["chalet_id"] == "c-cedars"));
}

#[tokio::test]
async fn test_host_updates_service_status_and_visibility() {
    let app = TestApp::new().await;
    let token = login_as(&app, HOST_EMAIL, HOST_PASSWORD).await;

    let response = app
        .anonymous_client()
        .put(app.url("/api/v1/host/chalets/c-faraya/service-status"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "service_status": "READY" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["service_status"], "READY");

    let response = app
        .anonymous_client()
        .put(app.url("/api/v1/host/chalets/c-faraya/live"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "is_live": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app.anonymous_client().get(app.url("/api/v1/chalets")).send().await.unwrap();
    let body: Vec<serde_json::Value> = response.json().await.unwrap();
    assert!(body.iter().all(|c| c["id"] != "c-faraya"));
}

#[tokio::test]
async fn test_host_confirms_booking_and_sees_earnings() {
    let app = TestApp::new().await;
    let guest = login_as(&app, GUEST_EMAIL, GUEST_PASSWORD).await;
    let host = login_as(&app, HOST_EMAIL, HOST_PASSWORD).await;

    let check_in = Utc::now().date_naive() + Duration::days(15);
    let response = app
        .anonymous_client()
        .post(app.url("/api/v1/bookings"))
        .bearer_auth(&guest)
        .json(&serde_json::json!({
            "chalet_id": "c-faraya",
            "check_in": check_in,
            "check_out": check_in + Duration::days(2),
        }))
        .send()
        .await
        .unwrap();
    let booking: serde_json::Value = response.json().await.unwrap();
    let id = booking["id"].as_str().unwrap();

    let response = app
        .anonymous_client()
        .get(app.url("/api/v1/host/bookings"))
        .bearer_auth(&host)
        .send()
        .await
        .unwrap();
    let body: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(body.len(), 2);

    let response = app
        .anonymous_client()
        .post(app.url(&format!("/api/v1/host/bookings/{id}/confirm")))
        .bearer_auth(&host)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "CONFIRMED");

    let response = app
        .anonymous_client()
        .get(app.url("/api/v1/host/earnings"))
        .bearer_auth(&host)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["confirmed_bookings"], 2);
    assert_eq!(body["gross"], 880.0);
}
