use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::{return_representation, SupabaseClient};

use crate::models::{
    Appointment, AppointmentQuery, AppointmentStatus, ConsultationError,
    CreateAppointmentRequest, PeriodQuery,
};

pub struct AppointmentService {
    supabase: SupabaseClient,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list(
        &self,
        query: AppointmentQuery,
    ) -> Result<Vec<Appointment>, ConsultationError> {
        let mut filters = vec![];

        if let Some(status) = query.status {
            filters.push(format!("status=eq.{}", status));
        }
        if let Some(patient) = query.patient {
            filters.push(format!("patient_code=eq.{}", urlencoding::encode(&patient)));
        }
        if let Some(doctor) = query.doctor {
            filters.push(format!("doctor=eq.{}", urlencoding::encode(&doctor)));
        }

        let path = if filters.is_empty() {
            "/rest/v1/appointments".to_string()
        } else {
            format!("/rest/v1/appointments?{}", filters.join("&"))
        };

        self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))
    }

    pub async fn find(&self, id: &str) -> Result<Appointment, ConsultationError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", urlencoding::encode(id));
        let result: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .next()
            .ok_or(ConsultationError::AppointmentNotFound)
    }

    pub async fn find_by_period(
        &self,
        query: PeriodQuery,
    ) -> Result<Vec<Appointment>, ConsultationError> {
        let path = format!(
            "/rest/v1/appointments?scheduled_at=gte.{}&scheduled_at=lte.{}",
            urlencoding::encode(&query.start.to_rfc3339()),
            urlencoding::encode(&query.end.to_rfc3339()),
        );

        self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))
    }

    pub async fn create(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, ConsultationError> {
        request.validate()?;
        let appointment = request.into_appointment();
        debug!(
            "Creating appointment {} for patient {} on slot {}",
            appointment.id, appointment.patient_code, appointment.slot_code
        );

        let created: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                None,
                Some(json!(appointment)),
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        created.into_iter().next().ok_or_else(|| {
            ConsultationError::DatabaseError("Failed to create appointment".to_string())
        })
    }

    pub async fn update(
        &self,
        id: &str,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, ConsultationError> {
        request.validate()?;
        self.find(id).await?;

        let mut appointment = request.into_appointment();
        appointment.id = id.to_string();

        let updated: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &format!("/rest/v1/appointments?id=eq.{}", urlencoding::encode(id)),
                None,
                Some(json!(appointment)),
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        updated
            .into_iter()
            .next()
            .ok_or(ConsultationError::AppointmentNotFound)
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, ConsultationError> {
        self.find(id).await?;

        let updated: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &format!("/rest/v1/appointments?id=eq.{}", urlencoding::encode(id)),
                None,
                Some(json!({ "status": status })),
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        updated
            .into_iter()
            .next()
            .ok_or(ConsultationError::AppointmentNotFound)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ConsultationError> {
        self.find(id).await?;

        let _: Vec<serde_json::Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &format!("/rest/v1/appointments?id=eq.{}", urlencoding::encode(id)),
                None,
                None,
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        info!("Appointment {} deleted", id);
        Ok(())
    }
}
