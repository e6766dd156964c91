pub mod auth;
pub mod role_access;

pub use auth::{AuthenticatedUser, SessionToken, session_auth_middleware};
pub use role_access::{admin_only_middleware, host_only_middleware};
