use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Open,
    Cancelled,
    Completed,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotStatus::Open => write!(f, "open"),
            SlotStatus::Cancelled => write!(f, "cancelled"),
            SlotStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A schedulable consultation: one doctor, one specialty, one start time,
/// a finite number of seats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationSlot {
    pub code: String,
    pub scheduled_at: DateTime<Utc>,
    pub specialty: String,
    pub doctor: String,
    pub price: f64,
    pub total_seats: i32,
    pub available_seats: i32,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSlotRequest {
    pub code: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub specialty: String,
    pub doctor: String,
    pub price: f64,
    pub total_seats: i32,
    pub available_seats: Option<i32>,
    pub status: Option<SlotStatus>,
}

impl CreateSlotRequest {
    pub fn validate(&self) -> Result<(), ConsultationError> {
        if self.total_seats < 0 {
            return Err(ConsultationError::ValidationError(
                "total_seats must not be negative".to_string(),
            ));
        }
        if let Some(available) = self.available_seats {
            if available < 0 || available > self.total_seats {
                return Err(ConsultationError::SeatsOutOfRange {
                    available,
                    total: self.total_seats,
                });
            }
        }
        Ok(())
    }

    pub fn into_slot(self) -> ConsultationSlot {
        let total_seats = self.total_seats;
        ConsultationSlot {
            code: self.code.unwrap_or_else(|| Uuid::new_v4().to_string()),
            scheduled_at: self.scheduled_at,
            specialty: self.specialty,
            doctor: self.doctor,
            price: self.price,
            total_seats,
            available_seats: self.available_seats.unwrap_or(total_seats),
            status: self.status.unwrap_or(SlotStatus::Open),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotQuery {
    pub specialty: Option<String>,
    pub doctor: Option<String>,
    pub status: Option<SlotStatus>,
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeriodQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotStatusQuery {
    pub status: SlotStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeatsQuery {
    pub available_seats: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Created,
    CheckedIn,
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Created => write!(f, "created"),
            AppointmentStatus::CheckedIn => write!(f, "checked_in"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A patient's booking against a consultation slot. Slot deletion does not
/// cascade here; an appointment can outlive its slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub slot_code: String,
    pub patient_code: String,
    pub scheduled_at: DateTime<Utc>,
    pub specialty: String,
    pub doctor: String,
    pub price: f64,
    pub points_used: i32,
    pub amount_paid: f64,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub id: Option<String>,
    pub slot_code: String,
    pub patient_code: String,
    pub scheduled_at: DateTime<Utc>,
    pub specialty: String,
    pub doctor: String,
    pub price: f64,
    pub points_used: i32,
    pub amount_paid: f64,
    pub status: Option<AppointmentStatus>,
}

impl CreateAppointmentRequest {
    pub fn validate(&self) -> Result<(), ConsultationError> {
        if self.slot_code.trim().is_empty() || self.patient_code.trim().is_empty() {
            return Err(ConsultationError::ValidationError(
                "slot_code and patient_code are required".to_string(),
            ));
        }
        if self.points_used < 0 {
            return Err(ConsultationError::ValidationError(
                "points_used must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_appointment(self) -> Appointment {
        Appointment {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            slot_code: self.slot_code,
            patient_code: self.patient_code,
            scheduled_at: self.scheduled_at,
            specialty: self.specialty,
            doctor: self.doctor,
            price: self.price,
            points_used: self.points_used,
            amount_paid: self.amount_paid,
            status: self.status.unwrap_or(AppointmentStatus::Created),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentQuery {
    pub status: Option<AppointmentStatus>,
    pub patient: Option<String>,
    pub doctor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentStatusQuery {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub specialty: String,
    pub phone: String,
    pub crm: String,
    pub active: bool,
    pub cpf: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub specialty: String,
    pub phone: String,
    pub crm: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub phone: Option<String>,
    pub crm: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorQuery {
    pub specialty: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specialty {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSpecialtyRequest {
    pub code: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecialtyQuery {
    pub name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConsultationError {
    #[error("Consultation slot not found")]
    SlotNotFound,

    #[error("Appointment not found")]
    AppointmentNotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Specialty not found")]
    SpecialtyNotFound,

    #[error("No seats available for this consultation")]
    NoSeatsAvailable,

    #[error("All seats are already released for this consultation")]
    AllSeatsReleased,

    #[error("Consultation slot is being updated concurrently, try again")]
    ConcurrentUpdate,

    #[error("available_seats {available} is out of range 0..={total}")]
    SeatsOutOfRange { available: i32, total: i32 },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<ConsultationError> for AppError {
    fn from(err: ConsultationError) -> Self {
        match err {
            ConsultationError::SlotNotFound
            | ConsultationError::AppointmentNotFound
            | ConsultationError::DoctorNotFound
            | ConsultationError::SpecialtyNotFound => AppError::NotFound(err.to_string()),
            ConsultationError::NoSeatsAvailable | ConsultationError::AllSeatsReleased => {
                AppError::InvalidState(err.to_string())
            }
            ConsultationError::ConcurrentUpdate => AppError::Conflict(err.to_string()),
            ConsultationError::SeatsOutOfRange { .. } => AppError::ValidationError(err.to_string()),
            ConsultationError::ValidationError(msg) => AppError::ValidationError(msg),
            ConsultationError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
