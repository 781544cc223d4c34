use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub cpf: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub postal_code: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub points: i32,
}

/// Profile fields a patient supplies; identity and address come from the
/// token and the postal lookup respectively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientUpsertRequest {
    pub name: String,
    pub phone: String,
    pub postal_code: String,
    pub number: String,
    pub complement: Option<String>,
}

impl PatientUpsertRequest {
    pub fn validate(&self) -> Result<(), PatientError> {
        for (field, value) in [
            ("name", &self.name),
            ("phone", &self.phone),
            ("postal_code", &self.postal_code),
            ("number", &self.number),
        ] {
            if value.trim().is_empty() {
                return Err(PatientError::ValidationError(format!(
                    "{} is required",
                    field
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientSearchQuery {
    pub id: Option<Uuid>,
    pub cpf: Option<String>,
}

/// Street-level address as resolved from a postal code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViaCepResponse {
    pub cep: Option<String>,
    pub erro: Option<bool>,
    pub logradouro: Option<String>,
    pub bairro: Option<String>,
    pub localidade: Option<String>,
    pub uf: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Entrada,
    Saida,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Entrada => write!(f, "ENTRADA"),
            TransactionKind::Saida => write!(f, "SAIDA"),
        }
    }
}

/// One row of the append-only points ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsTransaction {
    pub id: i64,
    pub patient_id: Uuid,
    pub kind: TransactionKind,
    pub description: String,
    pub points: i32,
    pub amount: f64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendTransactionRequest {
    pub kind: TransactionKind,
    pub description: String,
    pub points: i32,
    pub amount: f64,
}

impl AppendTransactionRequest {
    pub fn validate(&self) -> Result<(), PatientError> {
        if self.points <= 0 {
            return Err(PatientError::ValidationError(
                "points must be positive".to_string(),
            ));
        }
        if self.amount < 0.0 {
            return Err(PatientError::ValidationError(
                "amount must not be negative".to_string(),
            ));
        }
        if self.description.trim().is_empty() {
            return Err(PatientError::ValidationError(
                "description is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Postal code invalid or not found")]
    CepInvalid,

    #[error("Postal code lookup failed: {0}")]
    CepLookupFailed(String),

    #[error("Insufficient points balance: have {balance}, need {requested}")]
    InsufficientPoints { balance: i32, requested: i32 },

    #[error("Points balance is being updated concurrently, try again")]
    ConcurrentUpdate,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound(err.to_string()),
            PatientError::CepInvalid => AppError::BadRequest(err.to_string()),
            PatientError::CepLookupFailed(msg) => {
                AppError::BadRequest(format!("Postal code lookup failed: {}", msg))
            }
            PatientError::InsufficientPoints { .. } => AppError::InvalidState(err.to_string()),
            PatientError::ConcurrentUpdate => AppError::Conflict(err.to_string()),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
