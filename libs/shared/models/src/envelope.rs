use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Uniform success envelope carried by every API response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub path: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(path: &str, message: &str, data: T) -> Self {
        Self::build(StatusCode::OK, path, message, Some(data))
    }

    pub fn created(path: &str, message: &str, data: T) -> Self {
        Self::build(StatusCode::CREATED, path, message, Some(data))
    }

    pub fn no_data(status: StatusCode, path: &str, message: &str) -> Self {
        Self::build(status, path, message, None)
    }

    fn build(status: StatusCode, path: &str, message: &str, data: Option<T>) -> Self {
        Self {
            timestamp: Utc::now(),
            status: status.as_u16(),
            path: path.to_string(),
            message: message.to_string(),
            data,
        }
    }
}
