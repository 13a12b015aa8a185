use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use access_cell::router::access_routes;
use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use doctor_cell::router::doctor_routes;
use financial_cell::router::financial_routes;
use scheduling_cell::router::scheduling_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Agenda Clinica API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/access", access_routes(state.clone()))
        .nest("/scheduling", scheduling_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/financial", financial_routes(state.clone()))
}
