use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put, delete},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn financial_routes(state: Arc<AppConfig>) -> Router {
    // All financial operations require authentication
    let protected_routes = Router::new()
        .route("/", get(handlers::list_records))
        .route("/", post(handlers::create_record))
        .route("/summary", get(handlers::get_summary))
        .route("/{record_id}", put(handlers::update_record))
        .route("/{record_id}", delete(handlers::delete_record))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
