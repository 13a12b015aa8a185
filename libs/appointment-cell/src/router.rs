// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put, delete},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // The public booking form books and pre-checks without a session
    let public_routes = Router::new()
        .route("/", post(handlers::create_appointment))
        .route("/check", get(handlers::check_availability));

    let protected_routes = Router::new()
        .route("/", get(handlers::search_appointments))
        .route("/admin", post(handlers::create_appointment_admin))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}", put(handlers::update_appointment))
        .route("/{appointment_id}", delete(handlers::delete_appointment))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
