use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    Json,
};

use shared_config::AppConfig;
use shared_models::envelope::ApiResponse;
use shared_models::error::AppError;

use crate::models::{AuthRequest, AuthResponse, ForgotPasswordRequest, RegisterRequest};
use crate::services::AccountService;

#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<String>>), AppError> {
    let service = AccountService::new(&config);

    let email = service.register(request).await?;

    let message = format!("User registered. Password sent to e-mail: {}", email);
    let response = ApiResponse::created(uri.path(), &message, email);

    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Json(request): Json<AuthRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let service = AccountService::new(&config);

    let auth = service.authenticate(request).await?;

    Ok(Json(ApiResponse::ok(uri.path(), "Login successful", auth)))
}

#[axum::debug_handler]
pub async fn forgot_password(
    State(config): State<Arc<AppConfig>>,
    OriginalUri(uri): OriginalUri,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let service = AccountService::new(&config);

    let email = service.forgot_password(request).await?;

    let message = format!("New password sent to e-mail: {}", email);
    Ok(Json(ApiResponse::no_data(StatusCode::OK, uri.path(), &message)))
}
