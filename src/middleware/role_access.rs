//! Role-based access control middleware
//!
//! Runs after [`session_auth_middleware`](super::auth::session_auth_middleware)
//! and rejects users whose role does not open the route group.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::{
    error::{Error, Result},
    middleware::auth::AuthenticatedUser,
    models::users::UserRole,
};

fn authenticated(request: &Request) -> Result<&AuthenticatedUser> {
    request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| Error::Authentication("User not authenticated".to_string()))
}

/// Host dashboard routes: owners and administrators.
pub async fn host_only_middleware(request: Request, next: Next) -> Result<Response> {
    let user = authenticated(&request)?;
    if !matches!(user.role, UserRole::Owner | UserRole::Admin) {
        return Err(Error::Forbidden("Host access required".to_string()));
    }
    Ok(next.run(request).await)
}

/// Administration routes.
pub async fn admin_only_middleware(request: Request, next: Next) -> Result<Response> {
    let user = authenticated(&request)?;
    if user.role != UserRole::Admin {
        return Err(Error::Forbidden("Administrator access required".to_string()));
    }
    Ok(next.run(request).await)
}
