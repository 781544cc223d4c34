use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{return_representation, SupabaseClient};
use shared_models::auth::AuthUser;

use crate::models::{Address, Patient, PatientError, PatientSearchQuery, PatientUpsertRequest};
use crate::services::cep::CepService;

pub struct PatientService {
    supabase: SupabaseClient,
    cep: CepService,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            cep: CepService::new(config),
        }
    }

    /// First profile completion. Identity (id, CPF, e-mail) comes from the
    /// authenticated user; a brand-new profile starts with zero points.
    pub async fn complete_registration(
        &self,
        user: &AuthUser,
        request: PatientUpsertRequest,
    ) -> Result<Patient, PatientError> {
        request.validate()?;

        let id = Uuid::parse_str(&user.id)
            .map_err(|_| PatientError::ValidationError("Invalid user id".to_string()))?;

        let address = self.cep.lookup(&request.postal_code).await?;
        debug!("Completing registration for patient {}", id);

        match self.try_find_by_id(id).await? {
            Some(_) => self.apply_profile(id, &request, &address).await,
            None => {
                let patient_data = json!({
                    "id": id,
                    "cpf": user.cpf.clone().unwrap_or_default(),
                    "email": user.email.clone().unwrap_or_default(),
                    "name": request.name,
                    "phone": request.phone,
                    "postal_code": request.postal_code,
                    "number": request.number,
                    "complement": request.complement,
                    "street": address.street,
                    "district": address.district,
                    "city": address.city,
                    "state": address.state,
                    "points": 0,
                });

                let created: Vec<Patient> = self
                    .supabase
                    .request_with_headers(
                        Method::POST,
                        "/rest/v1/patients",
                        None,
                        Some(patient_data),
                        Some(return_representation()),
                    )
                    .await
                    .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

                let patient = created.into_iter().next().ok_or_else(|| {
                    PatientError::DatabaseError("Failed to create patient".to_string())
                })?;

                info!("Patient profile created for {}", id);
                Ok(patient)
            }
        }
    }

    pub async fn find_by_id_or_cpf(
        &self,
        query: PatientSearchQuery,
    ) -> Result<Patient, PatientError> {
        let patient = if let Some(id) = query.id {
            self.try_find_by_id(id).await?
        } else if let Some(cpf) = query.cpf {
            let path = format!("/rest/v1/patients?cpf=eq.{}", urlencoding::encode(&cpf));
            let result: Vec<Patient> = self
                .supabase
                .request(Method::GET, &path, None, None)
                .await
                .map_err(|e| PatientError::DatabaseError(e.to_string()))?;
            result.into_iter().next()
        } else {
            None
        };

        patient.ok_or(PatientError::NotFound)
    }

    pub async fn list_all(&self) -> Result<Vec<Patient>, PatientError> {
        self.supabase
            .request(Method::GET, "/rest/v1/patients", None, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    /// Edit an existing profile. The address is re-resolved from the given
    /// postal code, exactly like the initial completion.
    pub async fn edit(
        &self,
        id: Uuid,
        request: PatientUpsertRequest,
    ) -> Result<Patient, PatientError> {
        request.validate()?;

        if self.try_find_by_id(id).await?.is_none() {
            return Err(PatientError::NotFound);
        }

        let address = self.cep.lookup(&request.postal_code).await?;
        self.apply_profile(id, &request, &address).await
    }

    pub async fn try_find_by_id(&self, id: Uuid) -> Result<Option<Patient>, PatientError> {
        let path = format!("/rest/v1/patients?id=eq.{}", id);
        let result: Vec<Patient> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        Ok(result.into_iter().next())
    }

    async fn apply_profile(
        &self,
        id: Uuid,
        request: &PatientUpsertRequest,
        address: &Address,
    ) -> Result<Patient, PatientError> {
        let update_data = json!({
            "name": request.name,
            "phone": request.phone,
            "postal_code": request.postal_code,
            "number": request.number,
            "complement": request.complement,
            "street": address.street,
            "district": address.district,
            "city": address.city,
            "state": address.state,
        });

        let updated: Vec<Patient> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &format!("/rest/v1/patients?id=eq.{}", id),
                None,
                Some(update_data),
                Some(return_representation()),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        updated.into_iter().next().ok_or(PatientError::NotFound)
    }
}
