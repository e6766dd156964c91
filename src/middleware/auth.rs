//! Session authentication middleware
//!
//! Resolves the session token to a user and hands handlers an explicit
//! [`AuthenticatedUser`] context through request extensions.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::{
    error::Result,
    models::users::{User, UserRole},
    services::{
        cookies::{extract_cookie_value, extract_session_token, SESSION_COOKIE},
        users,
    },
    state::AppState,
};

/// Authenticated user added to request extensions by [`session_auth_middleware`]
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// The raw token of the current request's session (needed for logout).
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Session authentication middleware
///
/// # Token Sources
/// - **Authorization header** (API clients): `Bearer <token>`
/// - **Cookie** (browser clients): `session_token=<token>`
///
/// # Behavior
/// 1. Extracts the token (header takes priority)
/// 2. Resolves the session and loads the user from the record store
/// 3. Rejects users that lost approval or were suspended
/// 4. Adds `AuthenticatedUser` and `SessionToken` to request extensions
///
/// Returns 401 when the token is missing, unknown or expired.
///
/// ```ignore
/// Router::new()
///     .route("/bookings", get(list_my_bookings))
///     .route_layer(middleware::from_fn_with_state(state.clone(), session_auth_middleware))
/// ```
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let auth_header = headers.get("authorization").and_then(|h| h.to_str().ok());
    let cookie_token = headers
        .get("cookie")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| extract_cookie_value(h, SESSION_COOKIE));

    let token = extract_session_token(auth_header, cookie_token.as_deref())?;
    let user = users::current_user(&state.store, &state.sessions, &token).await?;

    let authenticated_user: AuthenticatedUser = user.into();
    request.extensions_mut().insert(authenticated_user);
    request.extensions_mut().insert(SessionToken(token));

    Ok(next.run(request).await)
}
