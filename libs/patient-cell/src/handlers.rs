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
    AppendTransactionRequest, Patient, PatientSearchQuery, PatientUpsertRequest, PointsTransaction,
};
use crate::services::{PatientService, PointsLedger};

fn caller_id(user: &AuthUser) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Token subject is not a valid user id".to_string()))
}

#[axum::debug_handler]
pub async fn complete_registration(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<PatientUpsertRequest>,
) -> Result<Json<ApiResponse<Patient>>, AppError> {
    let patient = PatientService::new(&config)
        .complete_registration(&user, request)
        .await?;

    Ok(Json(ApiResponse::ok(uri.path(), "Registration completed", patient)))
}

#[axum::debug_handler]
pub async fn search_patient(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PatientSearchQuery>,
) -> Result<Json<ApiResponse<Patient>>, AppError> {
    let patient = PatientService::new(&config).find_by_id_or_cpf(query).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Patient found", patient)))
}

#[axum::debug_handler]
pub async fn list_patients(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<ApiResponse<Vec<Patient>>>, AppError> {
    let patients = PatientService::new(&config).list_all().await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Patient list returned", patients)))
}

#[axum::debug_handler]
pub async fn edit_patient(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<Uuid>,
    Json(request): Json<PatientUpsertRequest>,
) -> Result<Json<ApiResponse<Patient>>, AppError> {
    let patient = PatientService::new(&config).edit(id, request).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Patient updated", patient)))
}

#[axum::debug_handler]
pub async fn points_balance(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<i32>>, AppError> {
    let patient_id = caller_id(&user)?;
    let balance = PointsLedger::new(&config).balance(patient_id).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Points balance returned", balance)))
}

#[axum::debug_handler]
pub async fn points_history(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<PointsTransaction>>>, AppError> {
    let patient_id = caller_id(&user)?;
    let history = PointsLedger::new(&config).history(patient_id).await?;
    Ok(Json(ApiResponse::ok(uri.path(), "Points history returned", history)))
}

#[axum::debug_handler]
pub async fn append_transaction(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<AppendTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PointsTransaction>>), AppError> {
    let patient_id = caller_id(&user)?;
    let transaction = PointsLedger::new(&config).append(patient_id, request).await?;

    let response = ApiResponse::created(uri.path(), "Points transaction recorded", transaction);
    Ok((StatusCode::CREATED, Json(response)))
}
