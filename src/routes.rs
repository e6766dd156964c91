use axum::{
    http::{header, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{admin, auth, bookings, chalets, health, host},
    middleware::{admin_only_middleware, host_only_middleware, session_auth_middleware},
    state::AppState,
};

/// Build the application router with every route nested under `/api/v1`.
///
/// Layers added later run first, so session authentication resolves the
/// user before the role guards look at it.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/login", post(auth::login))
        .route("/auth/login/verify", post(auth::verify_login))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signup/verify", post(auth::verify_signup))
        .route("/chalets", get(chalets::list_public_chalets))
        .route("/chalets/{id}", get(chalets::get_public_chalet))
        .route("/chalets/{id}/quote", get(chalets::quote_chalet_stay));

    let account_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/bookings", get(bookings::list_my_bookings).post(bookings::create_booking))
        .route("/bookings/{id}/cancel", post(bookings::cancel_booking))
        .route_layer(middleware::from_fn_with_state(state.clone(), session_auth_middleware));

    let host_routes = Router::new()
        .route("/chalets", get(host::list_host_chalets).post(host::create_host_chalet))
        .route(
            "/chalets/{id}",
            put(host::update_host_chalet).delete(host::delete_host_chalet),
        )
        .route("/chalets/{id}/service-status", put(host::update_host_service_status))
        .route("/chalets/{id}/live", put(host::set_host_chalet_live))
        .route("/bookings", get(host::list_host_bookings))
        .route("/bookings/{id}/confirm", post(host::confirm_host_booking))
        .route("/earnings", get(host::host_earnings))
        .route_layer(middleware::from_fn(host_only_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), session_auth_middleware));

    let admin_routes = Router::new()
        .route("/health", get(health::store_health))
        .route("/users", get(admin::list_all_users))
        .route("/users/pending", get(admin::list_pending_owners))
        .route("/users/{id}/approval", put(admin::set_user_approval))
        .route("/users/{id}/status", put(admin::set_user_status))
        .route("/chalets", get(admin::list_all_chalets))
        .route("/chalets/{id}", delete(admin::delete_chalet))
        .route("/chalets/{id}/approval", put(admin::set_chalet_approval))
        .route("/bookings", get(admin::list_all_bookings))
        .route("/bookings/{id}/paid", post(admin::mark_booking_paid))
        .route_layer(middleware::from_fn(admin_only_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), session_auth_middleware));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(account_routes)
        .nest("/host", host_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
