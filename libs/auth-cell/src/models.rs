use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    Admin,
    Employee,
    Patient,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserType::Admin => write!(f, "ADMIN"),
            UserType::Employee => write!(f, "EMPLOYEE"),
            UserType::Patient => write!(f, "PATIENT"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub cpf: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub user_type: UserType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub cpf: String,
    pub email: String,
    pub user_type: UserType,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        let cpf_re = Regex::new(r"^\d{11}$").expect("valid regex");
        if !cpf_re.is_match(&self.cpf) {
            return Err(AuthError::ValidationError(
                "CPF must contain exactly 11 digits".to_string(),
            ));
        }

        let email_re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex");
        if !email_re.is_match(&self.email) {
            return Err(AuthError::ValidationError("Invalid e-mail address".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequest {
    pub identifier: String,
    pub password: String,
}

impl AuthRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.identifier.trim().is_empty() || self.password.trim().is_empty() {
            return Err(AuthError::ValidationError(
                "Identifier and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("E-mail already registered")]
    EmailAlreadyRegistered,

    #[error("CPF already registered")]
    CpfAlreadyRegistered,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("E-mail not found")]
    EmailNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyRegistered | AuthError::CpfAlreadyRegistered => {
                AppError::Conflict(err.to_string())
            }
            AuthError::UserNotFound | AuthError::EmailNotFound => {
                AppError::NotFound(err.to_string())
            }
            AuthError::InvalidPassword => AppError::BadRequest(err.to_string()),
            AuthError::ValidationError(msg) => AppError::ValidationError(msg),
            AuthError::TokenError(msg) => AppError::Internal(msg),
            AuthError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_rejects_short_cpf() {
        let request = RegisterRequest {
            cpf: "123".to_string(),
            email: "a@b.com".to_string(),
            user_type: UserType::Patient,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn register_request_rejects_bad_email() {
        let request = RegisterRequest {
            cpf: "12345678901".to_string(),
            email: "not-an-email".to_string(),
            user_type: UserType::Patient,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn register_request_accepts_valid_input() {
        let request = RegisterRequest {
            cpf: "12345678901".to_string(),
            email: "a@b.com".to_string(),
            user_type: UserType::Employee,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn user_type_wire_format_is_screaming_snake() {
        assert_eq!(serde_json::to_string(&UserType::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(UserType::Patient.to_string(), "PATIENT");
    }

    #[test]
    fn password_is_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            cpf: "12345678901".to_string(),
            email: "a@b.com".to_string(),
            password: "salt:hash".to_string(),
            user_type: UserType::Patient,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
    }
}
