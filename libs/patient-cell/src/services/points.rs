use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{return_representation, SupabaseClient};

use crate::models::{AppendTransactionRequest, Patient, PatientError, PointsTransaction, TransactionKind};

/// Balance writes are compare-and-swap on the value just read, same scheme
/// as the seat allocator, so two concurrent appends cannot both spend the
/// same points.
const MAX_CAS_ATTEMPTS: u32 = 3;

pub struct PointsLedger {
    supabase: SupabaseClient,
}

impl PointsLedger {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn balance(&self, patient_id: Uuid) -> Result<i32, PatientError> {
        let patient = self.find_patient(patient_id).await?;
        Ok(patient.points)
    }

    /// Full ledger for a patient, newest entry first.
    pub async fn history(&self, patient_id: Uuid) -> Result<Vec<PointsTransaction>, PatientError> {
        self.find_patient(patient_id).await?;

        let path = format!(
            "/rest/v1/points_transactions?patient_id=eq.{}&order=occurred_at.desc",
            patient_id
        );

        self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))
    }

    /// Record a transaction and adjust the balance. ENTRADA credits, SAIDA
    /// debits; a debit never drives the balance below zero. The ledger row
    /// is only inserted after the balance swap lands.
    pub async fn append(
        &self,
        patient_id: Uuid,
        request: AppendTransactionRequest,
    ) -> Result<PointsTransaction, PatientError> {
        request.validate()?;

        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let patient = self.find_patient(patient_id).await?;

            let new_balance = match request.kind {
                TransactionKind::Entrada => patient.points + request.points,
                TransactionKind::Saida => {
                    if patient.points < request.points {
                        return Err(PatientError::InsufficientPoints {
                            balance: patient.points,
                            requested: request.points,
                        });
                    }
                    patient.points - request.points
                }
            };

            if self
                .compare_and_swap_balance(patient_id, patient.points, new_balance)
                .await?
            {
                debug!(
                    "Points balance for {}: {} -> {}",
                    patient_id, patient.points, new_balance
                );
                return self.insert_transaction(patient_id, &request).await;
            }

            warn!("Lost points race for {} (attempt {})", patient_id, attempt);
        }

        Err(PatientError::ConcurrentUpdate)
    }

    async fn find_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let result: Vec<Patient> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        result.into_iter().next().ok_or(PatientError::NotFound)
    }

    async fn compare_and_swap_balance(
        &self,
        patient_id: Uuid,
        expected: i32,
        new_balance: i32,
    ) -> Result<bool, PatientError> {
        let path = format!(
            "/rest/v1/patients?id=eq.{}&points=eq.{}",
            patient_id, expected
        );

        let updated: Vec<Patient> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                None,
                Some(json!({ "points": new_balance })),
                Some(return_representation()),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        Ok(!updated.is_empty())
    }

    async fn insert_transaction(
        &self,
        patient_id: Uuid,
        request: &AppendTransactionRequest,
    ) -> Result<PointsTransaction, PatientError> {
        let row = json!({
            "patient_id": patient_id,
            "kind": request.kind,
            "description": request.description,
            "points": request.points,
            "amount": request.amount,
            "occurred_at": Utc::now().to_rfc3339(),
        });

        let created: Vec<PointsTransaction> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/points_transactions",
                None,
                Some(row),
                Some(return_representation()),
            )
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let transaction = created.into_iter().next().ok_or_else(|| {
            PatientError::DatabaseError("Failed to record points transaction".to_string())
        })?;

        info!(
            "Recorded {} of {} points for patient {}",
            transaction.kind, transaction.points, patient_id
        );
        Ok(transaction)
    }
}
