use assert_matches::assert_matches;
use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use consultation_cell::models::{
    AppointmentQuery, AppointmentStatus, ConsultationError, CreateAppointmentRequest,
};
use consultation_cell::services::AppointmentService;
use shared_utils::test_utils::TestConfig;

const APPOINTMENTS: &str = "/rest/v1/appointments";

fn appointment_row(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "slot_code": "CONS-1",
        "patient_code": "PAT-1",
        "scheduled_at": "2026-09-01T10:00:00Z",
        "specialty": "CARDIOLOGY",
        "doctor": "Dr. House",
        "price": 250.0,
        "points_used": 50,
        "amount_paid": 200.0,
        "status": status
    })
}

fn create_request() -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        id: None,
        slot_code: "CONS-1".to_string(),
        patient_code: "PAT-1".to_string(),
        scheduled_at: Utc::now(),
        specialty: "CARDIOLOGY".to_string(),
        doctor: "Dr. House".to_string(),
        price: 250.0,
        points_used: 50,
        amount_paid: 200.0,
        status: None,
    }
}

#[tokio::test]
async fn create_defaults_status_and_assigns_id() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    Mock::given(method("POST"))
        .and(path(APPOINTMENTS))
        .and(body_partial_json(json!({ "status": "created" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([appointment_row("APT-1", "created")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let appointment = AppointmentService::new(&config)
        .create(create_request())
        .await
        .unwrap();

    assert_eq!(appointment.id, "APT-1");
    assert_eq!(appointment.status, AppointmentStatus::Created);
}

#[tokio::test]
async fn create_rejects_blank_patient_code() {
    let config = TestConfig::with_base_url("http://127.0.0.1:1");

    let mut request = create_request();
    request.patient_code = "  ".to_string();

    let result = AppointmentService::new(&config).create(request).await;
    assert_matches!(result, Err(ConsultationError::ValidationError(_)));
}

#[tokio::test]
async fn list_filters_by_patient() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    Mock::given(method("GET"))
        .and(path(APPOINTMENTS))
        .and(query_param("patient_code", "eq.PAT-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([appointment_row("APT-1", "created")])),
        )
        .mount(&server)
        .await;

    let appointments = AppointmentService::new(&config)
        .list(AppointmentQuery {
            patient: Some("PAT-1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0].patient_code, "PAT-1");
}

#[tokio::test]
async fn status_update_checks_existence_first() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    Mock::given(method("GET"))
        .and(path(APPOINTMENTS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = AppointmentService::new(&config)
        .update_status("GHOST", AppointmentStatus::Cancelled)
        .await;

    assert_matches!(result, Err(ConsultationError::AppointmentNotFound));
}

#[tokio::test]
async fn repeated_cancellation_is_idempotent() {
    let server = MockServer::start().await;
    let config = TestConfig::with_base_url(&server.uri());

    Mock::given(method("GET"))
        .and(path(APPOINTMENTS))
        .and(query_param("id", "eq.APT-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([appointment_row("APT-1", "cancelled")])),
        )
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(APPOINTMENTS))
        .and(query_param("id", "eq.APT-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([appointment_row("APT-1", "cancelled")])),
        )
        .mount(&server)
        .await;

    let service = AppointmentService::new(&config);
    let first = service
        .update_status("APT-1", AppointmentStatus::Cancelled)
        .await
        .unwrap();
    let second = service
        .update_status("APT-1", AppointmentStatus::Cancelled)
        .await
        .unwrap();

    assert_eq!(first.status, AppointmentStatus::Cancelled);
    assert_eq!(second.status, AppointmentStatus::Cancelled);
}
