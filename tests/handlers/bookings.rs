use chrono::{Duration, NaiveDate, Utc};

use crate::common::{
    generate_test_email, login_as, TestApp, ADMIN_EMAIL, ADMIN_PASSWORD, GUEST_EMAIL, GUEST_PASSWORD,
};

fn days_from_today(days: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days)
}

async fn create_booking(
    app: &TestApp,
    token: &str,
    chalet_id: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> reqwest::Response {
    app.anonymous_client()
        .post(app.url("/api/v1/bookings"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "chalet_id": chalet_id,
            "check_in": check_in,
            "check_out": check_out,
        }))
        .send()
        .await
        .unwrap()
}

/// Signs up a fresh customer over HTTP and returns their session token.
async fn new_customer(app: &TestApp) -> String {
    let email = generate_test_email();
    app.anonymous_client()
        .post(app.url("/api/v1/auth/signup"))
        .json(&serde_json::json!({
            "name": "Second Guest",
            "email": email,
            "password": "SecurePass123!",
            "role": "CUSTOMER",
        }))
        .send()
        .await
        .unwrap();
    let code = app.notifier.last_code_for(&email).unwrap();
    let response = app
        .anonymous_client()
        .post(app.url("/api/v1/auth/signup/verify"))
        .json(&serde_json::json!({ "email": email, "code": code }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    body["session"]["session_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_booking_requires_session() {
    let app = TestApp::new().await;

    let response = app
        .anonymous_client()
        .post(app.url("/api/v1/bookings"))
        .json(&serde_json::json!({
            "chalet_id": "c-cedars",
            "check_in": days_from_today(10),
            "check_out": days_from_today(13),
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_create_booking_prices_server_side() {
    let app = TestApp::new().await;
    let token = login_as(&app, GUEST_EMAIL, GUEST_PASSWORD).await;

    let response = create_booking(&app, &token, "c-cedars", days_from_today(10), days_from_today(13)).await;

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["total_price"], 600.0);
    assert_eq!(body["commission_fee"], 90.0);
    assert_eq!(body["net_payout"], 510.0);
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["payment_status"], "PENDING");
    assert_eq!(body["user_id"], "u-guest-1");
    assert_eq!(body["guest_name"], "Maya Khoury");
}

#[tokio::test]
async fn test_create_booking_rejects_past_and_inverted_dates() {
    let app = TestApp::new().await;
    let token = login_as(&app, GUEST_EMAIL, GUEST_PASSWORD).await;

    let past = create_booking(&app, &token, "c-cedars", days_from_today(-3), days_from_today(2)).await;
    assert_eq!(past.status(), 400);

    let inverted = create_booking(&app, &token, "c-cedars", days_from_today(5), days_from_today(5)).await;
    assert_eq!(inverted.status(), 400);
}

#[tokio::test]
async fn test_create_booking_on_hidden_chalet_is_404() {
    let app = TestApp::new().await;
    let token = login_as(&app, GUEST_EMAIL, GUEST_PASSWORD).await;

    let response = create_booking(&app, &token, "c-laqlouq", days_from_today(10), days_from_today(12)).await;

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_overlapping_booking_returns_409() {
    let app = TestApp::new().await;
    let token = login_as(&app, GUEST_EMAIL, GUEST_PASSWORD).await;

    let first = create_booking(&app, &token, "c-cedars", days_from_today(20), days_from_today(24)).await;
    assert_eq!(first.status(), 201);

    let overlapping = create_booking(&app, &token, "c-cedars", days_from_today(22), days_from_today(26)).await;
    assert_eq!(overlapping.status(), 409);
    let body: serde_json::Value = overlapping.json().await.unwrap();
    assert_eq!(body["code"], "CONFLICT");

    let back_to_back = create_booking(&app, &token, "c-cedars", days_from_today(24), days_from_today(26)).await;
    assert_eq!(back_to_back.status(), 201);
}

#[tokio::test]
async fn test_list_my_bookings_shows_only_own() {
    let app = TestApp::new().await;
    let guest = login_as(&app, GUEST_EMAIL, GUEST_PASSWORD).await;
    let other = new_customer(&app).await;

    create_booking(&app, &other, "c-faraya", days_from_today(30), days_from_today(32)).await;

    let response = app
        .anonymous_client()
        .get(app.url("/api/v1/bookings"))
        .bearer_auth(&guest)
        .send()
        .await
        .unwrap();
    let body: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(body.len(), 1, "Only the seeded stay belongs to the guest");
    assert_eq!(body[0]["id"], "b-seed-1");

    let response = app
        .anonymous_client()
        .get(app.url("/api/v1/bookings"))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    let body: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["chalet_id"], "c-faraya");
}

#[tokio::test]
async fn test_cancel_own_booking_frees_dates() {
    let app = TestApp::new().await;
    let token = login_as(&app, GUEST_EMAIL, GUEST_PASSWORD).await;

    let response = create_booking(&app, &token, "c-cedars", days_from_today(40), days_from_today(43)).await;
    let booking: serde_json::Value = response.json().await.unwrap();
    let id = booking["id"].as_str().unwrap();

    let response = app
        .anonymous_client()
        .post(app.url(&format!("/api/v1/bookings/{id}/cancel")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "CANCELLED");

    let rebooked = create_booking(&app, &token, "c-cedars", days_from_today(40), days_from_today(43)).await;
    assert_eq!(rebooked.status(), 201);
}

#[tokio::test]
async fn test_cannot_cancel_someone_elses_booking() {
    let app = TestApp::new().await;
    let other = new_customer(&app).await;

    let response = app
        .anonymous_client()
        .post(app.url("/api/v1/bookings/b-seed-1/cancel"))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let admin = login_as(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = app
        .anonymous_client()
        .post(app.url("/api/v1/bookings/b-seed-1/cancel"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["payment_status"], "REFUNDED");
}
