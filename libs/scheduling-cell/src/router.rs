use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put, delete},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn scheduling_routes(state: Arc<AppConfig>) -> Router {
    // The booking form reads these without a session
    let public_routes = Router::new()
        .route("/availability", get(handlers::get_availability))
        .route("/cities", get(handlers::list_cities))
        .route("/dates", get(handlers::list_dates));

    let protected_routes = Router::new()
        .route("/cities", post(handlers::create_city))
        .route("/cities/{city_id}", put(handlers::update_city))
        .route("/cities/{city_id}", delete(handlers::delete_city))
        .route("/dates", post(handlers::create_date))
        .route("/dates/sweep", post(handlers::sweep_dates))
        .route("/dates/{date_id}", put(handlers::update_date))
        .route("/dates/{date_id}", delete(handlers::delete_date))
        .route("/config/{cidade_id}", get(handlers::get_schedule_config))
        .route("/config/{cidade_id}", put(handlers::upsert_schedule_config))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
