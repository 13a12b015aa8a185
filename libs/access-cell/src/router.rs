use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put, delete},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn access_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/users", get(handlers::list_users))
        .route("/users", post(handlers::create_user))
        .route("/users/{user_id}", get(handlers::get_user))
        .route("/users/{user_id}", put(handlers::update_user))
        .route("/users/{user_id}", delete(handlers::delete_user))
        .route("/roles", get(handlers::list_roles))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
