use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn patient_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_patients))
        .route("/complete", post(handlers::complete_registration))
        .route("/search", get(handlers::search_patient))
        .route("/points/balance", get(handlers::points_balance))
        .route("/points/history", get(handlers::points_history))
        .route("/points/transactions", post(handlers::append_transaction))
        .route("/{id}", put(handlers::edit_patient))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
