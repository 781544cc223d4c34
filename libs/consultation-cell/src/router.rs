use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn consultation_routes(state: Arc<AppConfig>) -> Router {
    // Reads are public; every mutation requires a bearer token.
    let public_routes = Router::new()
        .route("/slots", get(handlers::list_slots))
        .route("/slots/period", get(handlers::list_slots_by_period))
        .route("/slots/{code}", get(handlers::get_slot))
        .route("/appointments", get(handlers::list_appointments))
        .route("/appointments/period", get(handlers::list_appointments_by_period))
        .route("/appointments/{id}", get(handlers::get_appointment))
        .route("/doctors", get(handlers::list_doctors))
        .route("/doctors/crm/{crm}", get(handlers::get_doctor_by_crm))
        .route("/doctors/{id}", get(handlers::get_doctor))
        .route("/specialties", get(handlers::list_specialties))
        .route("/specialties/{code}", get(handlers::get_specialty));

    let protected_routes = Router::new()
        .route("/slots", post(handlers::create_slot))
        .route("/slots/{code}", put(handlers::update_slot))
        .route("/slots/{code}", delete(handlers::delete_slot))
        .route("/slots/status/{code}", patch(handlers::update_slot_status))
        .route("/slots/seats/{code}", patch(handlers::set_slot_seats))
        .route("/slots/reserve/{code}", patch(handlers::reserve_seat))
        .route("/slots/release/{code}", patch(handlers::release_seat))
        .route("/appointments", post(handlers::create_appointment))
        .route("/appointments/{id}", put(handlers::update_appointment))
        .route("/appointments/{id}", delete(handlers::delete_appointment))
        .route("/appointments/status/{id}", patch(handlers::update_appointment_status))
        .route("/doctors", post(handlers::create_doctor))
        .route("/doctors/{id}", put(handlers::update_doctor))
        .route("/doctors/{id}", delete(handlers::delete_doctor))
        .route("/specialties", post(handlers::create_specialty))
        .route("/specialties/{code}", put(handlers::update_specialty))
        .route("/specialties/{code}", delete(handlers::delete_specialty))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
