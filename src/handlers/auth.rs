use axum::{
    extract::{Extension, State},
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};

use crate::{
    error::Result,
    middleware::auth::{AuthenticatedUser, SessionToken},
    models::users::{LoginResult, LoginUser, PublicUser, RegisterUser, VerifyOtp},
    queries,
    services::{
        cookies::{build_clear_session_cookie, build_session_cookie, CookieConfig},
        users,
    },
    state::AppState,
    validation::normalize_email,
};

/// JSON body plus an optional Set-Cookie header
pub struct SessionResponse {
    status: StatusCode,
    json_body: serde_json::Value,
    cookie: Option<String>,
}

impl IntoResponse for SessionResponse {
    fn into_response(self) -> Response {
        let (mut parts, body) = (self.status, Json(self.json_body)).into_response().into_parts();

        if let Some(cookie) = self.cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
            parts.headers.append(SET_COOKIE, cookie);
        }

        Response::from_parts(parts, body)
    }
}

fn session_cookie(state: &AppState, session: &LoginResult) -> String {
    build_session_cookie(
        &session.session_token,
        state.config.auth.session_ttl_seconds,
        &CookieConfig::default(),
    )
}

/// POST /api/v1/auth/login
///
/// First login step: checks email and password and sends a one-time code.
///
/// # HTTP Status Codes
/// - `200 OK`: Credentials accepted, code sent
/// - `401 UNAUTHORIZED`: Unknown email or wrong password
/// - `403 FORBIDDEN`: Account awaiting approval or suspended
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginUser>,
) -> Result<Json<serde_json::Value>> {
    let user = users::login_user(&state.store, state.notifier.as_ref(), &state.config.auth, request).await?;

    Ok(Json(serde_json::json!({
        "message": "Verification code sent",
        "email": user.email,
        "expires_at": user.otp_expires_at,
    })))
}

/// POST /api/v1/auth/login/verify
///
/// Second login step. Returns the session token in the body and as the
/// `session_token` cookie.
///
/// # HTTP Status Codes
/// - `200 OK`: Session established
/// - `401 UNAUTHORIZED`: Wrong or expired code
pub async fn verify_login(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtp>,
) -> Result<SessionResponse> {
    let session = users::verify_login_otp(&state.store, &state.sessions, &state.config.auth, request).await?;
    let cookie = session_cookie(&state, &session);

    Ok(SessionResponse {
        status: StatusCode::OK,
        json_body: serde_json::to_value(&session)?,
        cookie: Some(cookie),
    })
}

/// POST /api/v1/auth/signup
///
/// Validates the signup details and emails a verification code. Nothing is
/// stored in the record store until the code is verified.
///
/// # HTTP Status Codes
/// - `202 ACCEPTED`: Code sent
/// - `400 BAD_REQUEST`: Invalid details
/// - `409 CONFLICT`: Email already registered
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<RegisterUser>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    let email = normalize_email(&request.email);
    users::request_signup_otp(
        &state.store,
        &state.pending_signups,
        state.notifier.as_ref(),
        &state.config.auth,
        request,
    )
    .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "message": "Verification code sent",
            "email": email,
        })),
    ))
}

/// POST /api/v1/auth/signup/verify
///
/// Creates the account. Customers are signed in straight away; owners wait
/// for administrator approval and get no session cookie.
///
/// # HTTP Status Codes
/// - `201 CREATED`: Account created
/// - `401 UNAUTHORIZED`: Wrong, expired or unknown code
/// - `409 CONFLICT`: Email registered in the meantime
pub async fn verify_signup(
    State(state): State<AppState>,
    Json(request): Json<VerifyOtp>,
) -> Result<SessionResponse> {
    let result = users::verify_signup_otp(
        &state.store,
        &state.pending_signups,
        &state.sessions,
        &state.config.auth,
        request,
    )
    .await?;
    let cookie = result.session.as_ref().map(|s| session_cookie(&state, s));

    Ok(SessionResponse {
        status: StatusCode::CREATED,
        json_body: serde_json::to_value(&result)?,
        cookie,
    })
}

/// POST /api/v1/auth/logout
///
/// Ends the current session and clears the cookie. Requires authentication.
pub async fn logout(
    State(state): State<AppState>,
    Extension(token): Extension<SessionToken>,
) -> Result<SessionResponse> {
    users::logout_user(&state.sessions, &token.0).await?;

    Ok(SessionResponse {
        status: StatusCode::OK,
        json_body: serde_json::json!({ "message": "Logged out" }),
        cookie: Some(build_clear_session_cookie(&CookieConfig::default())),
    })
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<serde_json::Value>> {
    let user = queries::users::get_user_by_id_required(&state.store, &user.id).await?;
    let public: PublicUser = user.into();

    Ok(Json(serde_json::json!({ "user": public })))
}
