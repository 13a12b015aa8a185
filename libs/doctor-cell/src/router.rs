use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put, delete},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::list_doctors));

    let protected_routes = Router::new()
        .route("/", post(handlers::create_doctor))
        .route("/{doctor_id}", get(handlers::get_doctor))
        .route("/{doctor_id}", put(handlers::update_doctor))
        .route("/{doctor_id}", delete(handlers::delete_doctor))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
