use std::sync::Arc;

use axum::{
    extract::{Extension, OriginalUri, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::AuthUser;
use shared_models::envelope::ApiResponse;
use shared_models::error::AppError;

use crate::models::{
    Appointment, AppointmentQuery, AppointmentStatusQuery, ConsultationSlot,
    CreateAppointmentRequest, CreateDoctorRequest, CreateSlotRequest, CreateSpecialtyRequest,
    Doctor, DoctorQuery, PeriodQuery, SeatsQuery, SlotQuery, SlotStatusQuery, Specialty,
    SpecialtyQuery, UpdateDoctorRequest,
};
use crate::services::{AppointmentService, DoctorService, SlotService, SpecialtyService};

// ---------------------------------------------------------------------------
// Consultation slots
// ---------------------------------------------------------------------------

#[axum::debug_handler]
pub async fn list_slots(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<SlotQuery>,
) -> Result<Json<ApiResponse<Vec<ConsultationSlot>>>, AppError> {
    let slots = SlotService::new(&config).list(query).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Consultation slots returned", slots)))
}

#[axum::debug_handler]
pub async fn get_slot(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<ConsultationSlot>>, AppError> {
    let slot = SlotService::new(&config).find(&code).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Consultation slot found", slot)))
}

#[axum::debug_handler]
pub async fn list_slots_by_period(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ApiResponse<Vec<ConsultationSlot>>>, AppError> {
    let slots = SlotService::new(&config).find_by_period(query).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Consultation slots returned", slots)))
}

#[axum::debug_handler]
pub async fn create_slot(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Json(request): Json<CreateSlotRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ConsultationSlot>>), AppError> {
    let slot = SlotService::new(&config).create(request).await?;
    let response = ApiResponse::created(uri.path(), "Consultation slot created", slot);
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn update_slot(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(code): Path<String>,
    Json(request): Json<CreateSlotRequest>,
) -> Result<Json<ApiResponse<ConsultationSlot>>, AppError> {
    let slot = SlotService::new(&config).update(&code, request).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Consultation slot updated", slot)))
}

#[axum::debug_handler]
pub async fn delete_slot(
    State(config): State<Arc<AppConfig>>,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    SlotService::new(&config).delete(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn update_slot_status(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(code): Path<String>,
    Query(query): Query<SlotStatusQuery>,
) -> Result<Json<ApiResponse<ConsultationSlot>>, AppError> {
    let slot = SlotService::new(&config)
        .update_status(&code, query.status)
        .await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Consultation slot status updated", slot)))
}

#[axum::debug_handler]
pub async fn set_slot_seats(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(code): Path<String>,
    Query(query): Query<SeatsQuery>,
) -> Result<Json<ApiResponse<ConsultationSlot>>, AppError> {
    let slot = SlotService::new(&config)
        .set_available_seats(&code, query.available_seats)
        .await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Available seats updated", slot)))
}

#[axum::debug_handler]
pub async fn reserve_seat(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<ConsultationSlot>>, AppError> {
    let slot = SlotService::new(&config).reserve(&code).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Seat reserved", slot)))
}

#[axum::debug_handler]
pub async fn release_seat(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<ConsultationSlot>>, AppError> {
    let slot = SlotService::new(&config).release(&code).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Seat released", slot)))
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

#[axum::debug_handler]
pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<ApiResponse<Vec<Appointment>>>, AppError> {
    let appointments = AppointmentService::new(&config).list(query).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Appointments returned", appointments)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    let appointment = AppointmentService::new(&config).find(&id).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Appointment found", appointment)))
}

#[axum::debug_handler]
pub async fn list_appointments_by_period(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<ApiResponse<Vec<Appointment>>>, AppError> {
    let appointments = AppointmentService::new(&config).find_by_period(query).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Appointments returned", appointments)))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Appointment>>), AppError> {
    let appointment = AppointmentService::new(&config).create(request).await?;
    let response = ApiResponse::created(uri.path(), "Appointment created", appointment);
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    let appointment = AppointmentService::new(&config).update(&id, request).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Appointment updated", appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Query(query): Query<AppointmentStatusQuery>,
) -> Result<Json<ApiResponse<Appointment>>, AppError> {
    let appointment = AppointmentService::new(&config)
        .update_status(&id, query.status)
        .await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Appointment status updated", appointment)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(config): State<Arc<AppConfig>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    AppointmentService::new(&config).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Doctors
// ---------------------------------------------------------------------------

#[axum::debug_handler]
pub async fn list_doctors(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<DoctorQuery>,
) -> Result<Json<ApiResponse<Vec<Doctor>>>, AppError> {
    let doctors = DoctorService::new(&config).list(query).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Doctors returned", doctors)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Doctor>>, AppError> {
    let doctor = DoctorService::new(&config).find(id).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Doctor found", doctor)))
}

#[axum::debug_handler]
pub async fn get_doctor_by_crm(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(crm): Path<String>,
) -> Result<Json<ApiResponse<Doctor>>, AppError> {
    let doctor = DoctorService::new(&config).find_by_crm(&crm).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Doctor found", doctor)))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Doctor>>), AppError> {
    let doctor = DoctorService::new(&config).create(&user, request).await?;
    let response = ApiResponse::created(uri.path(), "Doctor created", doctor);
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<ApiResponse<Doctor>>, AppError> {
    let doctor = DoctorService::new(&config).update(id, request).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Doctor updated", doctor)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(config): State<Arc<AppConfig>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    DoctorService::new(&config).deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Specialties
// ---------------------------------------------------------------------------

#[axum::debug_handler]
pub async fn list_specialties(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<SpecialtyQuery>,
) -> Result<Json<ApiResponse<Vec<Specialty>>>, AppError> {
    let specialties = SpecialtyService::new(&config).list(query).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Specialties returned", specialties)))
}

#[axum::debug_handler]
pub async fn get_specialty(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<Specialty>>, AppError> {
    let specialty = SpecialtyService::new(&config).find(&code).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Specialty found", specialty)))
}

#[axum::debug_handler]
pub async fn create_specialty(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Json(request): Json<CreateSpecialtyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Specialty>>), AppError> {
    let specialty = SpecialtyService::new(&config).create(request).await?;
    let response = ApiResponse::created(uri.path(), "Specialty created", specialty);
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn update_specialty(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(code): Path<String>,
    Json(request): Json<CreateSpecialtyRequest>,
) -> Result<Json<ApiResponse<Specialty>>, AppError> {
    let specialty = SpecialtyService::new(&config).update(&code, request).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Specialty updated", specialty)))
}

#[axum::debug_handler]
pub async fn delete_specialty(
    State(config): State<Arc<AppConfig>>,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    SpecialtyService::new(&config).delete(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}
