use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{return_representation, SupabaseClient};

use crate::models::{ConsultationError, CreateSpecialtyRequest, Specialty, SpecialtyQuery};

pub struct SpecialtyService {
    supabase: SupabaseClient,
}

impl SpecialtyService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list(&self, query: SpecialtyQuery) -> Result<Vec<Specialty>, ConsultationError> {
        let path = match query.name {
            Some(name) => format!(
                "/rest/v1/specialties?name=ilike.*{}*",
                urlencoding::encode(&name)
            ),
            None => "/rest/v1/specialties".to_string(),
        };

        self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))
    }

    pub async fn find(&self, code: &str) -> Result<Specialty, ConsultationError> {
        let path = format!("/rest/v1/specialties?code=eq.{}", urlencoding::encode(code));
        let result: Vec<Specialty> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .next()
            .ok_or(ConsultationError::SpecialtyNotFound)
    }

    pub async fn create(
        &self,
        request: CreateSpecialtyRequest,
    ) -> Result<Specialty, ConsultationError> {
        if request.name.trim().is_empty() {
            return Err(ConsultationError::ValidationError(
                "name is required".to_string(),
            ));
        }

        let specialty = Specialty {
            code: request.code.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: request.name,
        };
        debug!("Creating specialty {}", specialty.code);

        let created: Vec<Specialty> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/specialties",
                None,
                Some(json!(specialty)),
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        created.into_iter().next().ok_or_else(|| {
            ConsultationError::DatabaseError("Failed to create specialty".to_string())
        })
    }

    pub async fn update(
        &self,
        code: &str,
        request: CreateSpecialtyRequest,
    ) -> Result<Specialty, ConsultationError> {
        self.find(code).await?;

        let updated: Vec<Specialty> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &format!("/rest/v1/specialties?code=eq.{}", urlencoding::encode(code)),
                None,
                Some(json!({ "name": request.name })),
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        updated
            .into_iter()
            .next()
            .ok_or(ConsultationError::SpecialtyNotFound)
    }

    pub async fn delete(&self, code: &str) -> Result<(), ConsultationError> {
        self.find(code).await?;

        let _: Vec<serde_json::Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &format!("/rest/v1/specialties?code=eq.{}", urlencoding::encode(code)),
                None,
                None,
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        info!("Specialty {} deleted", code);
        Ok(())
    }
}
