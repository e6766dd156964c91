use crate::common::{
    generate_test_email, login_as, TestApp, GUEST_EMAIL, GUEST_PASSWORD, PENDING_HOST_EMAIL,
    PENDING_HOST_PASSWORD,
};

async fn signup(app: &TestApp, email: &str, role: &str) -> reqwest::Response {
    app.client
        .post(app.url("/api/v1/auth/signup"))
        .json(&serde_json::json!({
            "name": "Test Person",
            "email": email,
            "password": "SecurePass123!",
            "role": role,
        }))
        .send()
        .await
        .unwrap()
}

async fn verify_signup(app: &TestApp, email: &str, code: &str) -> reqwest::Response {
    app.client
        .post(app.url("/api/v1/auth/signup/verify"))
        .json(&serde_json::json!({ "email": email, "code": code }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_login_endpoint_sends_code() {
    let app = TestApp::new().await;

    let response = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&serde_json::json!({ "email": GUEST_EMAIL, "password": GUEST_PASSWORD }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["email"], GUEST_EMAIL);
    assert!(body.get("code").is_none(), "The code must never be echoed back");
    assert!(body.get("session_token").is_none());
    assert_eq!(app.notifier.count(), 1);
}

#[tokio::test]
async fn test_login_endpoint_returns_401_on_wrong_password() {
    let app = TestApp::new().await;

    let response = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&serde_json::json!({ "email": GUEST_EMAIL, "password": "wrong-password" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
    assert_eq!(app.notifier.count(), 0);
}

#[tokio::test]
async fn test_login_endpoint_returns_403_for_unapproved_owner() {
    let app = TestApp::new().await;

    let response = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&serde_json::json!({
            "email": PENDING_HOST_EMAIL,
            "password": PENDING_HOST_PASSWORD
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "NOT_APPROVED");
    assert_eq!(app.notifier.count(), 0);
}

#[tokio::test]
async fn test_verify_login_sets_session_cookie() {
    let app = TestApp::new().await;

    app.client
        .post(app.url("/api/v1/auth/login"))
        .json(&serde_json::json!({ "email": GUEST_EMAIL, "password": GUEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    let code = app.notifier.last_code_for(GUEST_EMAIL).unwrap();

    let response = app
        .client
        .post(app.url("/api/v1/auth/login/verify"))
        .json(&serde_json::json!({ "email": GUEST_EMAIL, "code": code }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let cookie = response
        .headers()
        .get("set-cookie")
        .expect("Session cookie should be set")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session_token="));
    assert!(cookie.contains("HttpOnly"));

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["email"], GUEST_EMAIL);
    assert!(body["user"].get("password_hash").is_none());
    assert_eq!(body["session_token"].as_str().unwrap().len(), 64);

    // The cookie alone authenticates the shared client
    let me = app.client.get(app.url("/api/v1/auth/me")).send().await.unwrap();
    assert_eq!(me.status(), 200);
    let me: serde_json::Value = me.json().await.unwrap();
    assert_eq!(me["user"]["email"], GUEST_EMAIL);
}

#[tokio::test]
async fn test_verify_login_rejects_wrong_code() {
    let app = TestApp::new().await;

    app.client
        .post(app.url("/api/v1/auth/login"))
        .json(&serde_json::json!({ "email": GUEST_EMAIL, "password": GUEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    let code = app.notifier.last_code_for(GUEST_EMAIL).unwrap();
    let wrong = if code == "999999" { "000000" } else { "999999" };

    let response = app
        .client
        .post(app.url("/api/v1/auth/login/verify"))
        .json(&serde_json::json!({ "email": GUEST_EMAIL, "code": wrong }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert!(response.headers().get("set-cookie").is_none());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_CODE");
}

#[tokio::test]
async fn test_me_requires_session() {
    let app = TestApp::new().await;

    let response = app.client.get(app.url("/api/v1/auth/me")).send().await.unwrap();
    assert_eq!(response.status(), 401);

    let response = app
        .client
        .get(app.url("/api/v1/auth/me"))
        .bearer_auth("0".repeat(64))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let app = TestApp::new().await;
    let token = login_as(&app, GUEST_EMAIL, GUEST_PASSWORD).await;

    let response = app
        .anonymous_client()
        .post(app.url("/api/v1/auth/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));

    let response = app
        .anonymous_client()
        .get(app.url("/api/v1/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_customer_signup_flow() {
    let app = TestApp::new().await;
    let email = generate_test_email();

    let response = signup(&app, &email, "CUSTOMER").await;
    assert_eq!(response.status(), 202);

    let code = app.notifier.last_code_for(&email).unwrap();
    let response = verify_signup(&app, &email, &code).await;

    assert_eq!(response.status(), 201);
    assert!(response.headers().get("set-cookie").is_some());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["is_approved"], true);
    assert_eq!(body["user"]["role"], "CUSTOMER");
    assert!(body["session"]["session_token"].is_string());
}

#[tokio::test]
async fn test_owner_signup_flow_has_no_session() {
    let app = TestApp::new().await;
    let email = generate_test_email();

    signup(&app, &email, "OWNER").await;
    let code = app.notifier.last_code_for(&email).unwrap();
    let response = verify_signup(&app, &email, &code).await;

    assert_eq!(response.status(), 201);
    assert!(response.headers().get("set-cookie").is_none());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"]["is_approved"], false);
    assert!(body["session"].is_null());
}

#[tokio::test]
async fn test_signup_returns_409_for_existing_email() {
    let app = TestApp::new().await;

    let response = signup(&app, GUEST_EMAIL, "CUSTOMER").await;

    assert_eq!(response.status(), 409);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "DUPLICATE_IDENTITY");
}

#[tokio::test]
async fn test_signup_returns_400_on_weak_password() {
    let app = TestApp::new().await;

    let response = app
        .client
        .post(app.url("/api/v1/auth/signup"))
        .json(&serde_json::json!({
            "name": "Test Person",
            "email": generate_test_email(),
            "password": "short",
            "role": "CUSTOMER",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
