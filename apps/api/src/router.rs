use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use auth_cell::router::auth_routes;
use consultation_cell::router::consultation_routes;
use patient_cell::router::patient_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Hospital Management API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/consultations", consultation_routes(state.clone()))
        .nest("/patients", patient_routes(state.clone()))
}
