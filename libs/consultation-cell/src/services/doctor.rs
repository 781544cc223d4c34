use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{return_representation, SupabaseClient};
use shared_models::auth::AuthUser;

use crate::models::{ConsultationError, CreateDoctorRequest, Doctor, DoctorQuery, UpdateDoctorRequest};

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list(&self, query: DoctorQuery) -> Result<Vec<Doctor>, ConsultationError> {
        let mut filters = vec![];

        if let Some(specialty) = query.specialty {
            filters.push(format!("specialty=eq.{}", urlencoding::encode(&specialty)));
        }
        if let Some(active) = query.active {
            filters.push(format!("active=eq.{}", active));
        }

        let path = if filters.is_empty() {
            "/rest/v1/doctors".to_string()
        } else {
            format!("/rest/v1/doctors?{}", filters.join("&"))
        };

        self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))
    }

    pub async fn find(&self, id: Uuid) -> Result<Doctor, ConsultationError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", id);
        let result: Vec<Doctor> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        result.into_iter().next().ok_or(ConsultationError::DoctorNotFound)
    }

    pub async fn find_by_crm(&self, crm: &str) -> Result<Doctor, ConsultationError> {
        let path = format!("/rest/v1/doctors?crm=eq.{}", urlencoding::encode(crm));
        let result: Vec<Doctor> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        result.into_iter().next().ok_or(ConsultationError::DoctorNotFound)
    }

    /// Create a doctor profile for the authenticated user. Identity fields
    /// come from the token, not the body.
    pub async fn create(
        &self,
        user: &AuthUser,
        request: CreateDoctorRequest,
    ) -> Result<Doctor, ConsultationError> {
        let id = Uuid::parse_str(&user.id)
            .map_err(|_| ConsultationError::ValidationError("Invalid user id".to_string()))?;

        debug!("Creating doctor profile {}", id);

        let doctor_data = json!({
            "id": id,
            "name": request.name,
            "specialty": request.specialty,
            "phone": request.phone,
            "crm": request.crm,
            "active": true,
            "cpf": user.cpf.clone().unwrap_or_default(),
            "email": user.email.clone().unwrap_or_default(),
        });

        let created: Vec<Doctor> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/doctors",
                None,
                Some(doctor_data),
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        created
            .into_iter()
            .next()
            .ok_or_else(|| ConsultationError::DatabaseError("Failed to create doctor".to_string()))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, ConsultationError> {
        self.find(id).await?;

        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(specialty) = request.specialty {
            update_data.insert("specialty".to_string(), json!(specialty));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(crm) = request.crm {
            update_data.insert("crm".to_string(), json!(crm));
        }
        if let Some(active) = request.active {
            update_data.insert("active".to_string(), json!(active));
        }

        let updated: Vec<Doctor> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &format!("/rest/v1/doctors?id=eq.{}", id),
                None,
                Some(serde_json::Value::Object(update_data)),
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        updated.into_iter().next().ok_or(ConsultationError::DoctorNotFound)
    }

    /// Removal keeps the row and flips `active`; appointments keep pointing
    /// at a deactivated doctor.
    pub async fn deactivate(&self, id: Uuid) -> Result<(), ConsultationError> {
        self.find(id).await?;

        let _updated: Vec<Doctor> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &format!("/rest/v1/doctors?id=eq.{}", id),
                None,
                Some(json!({ "active": false })),
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        info!("Doctor {} deactivated", id);
        Ok(())
    }
}
