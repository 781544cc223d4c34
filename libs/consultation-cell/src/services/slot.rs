use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::{return_representation, SupabaseClient};

use crate::models::{
    ConsultationSlot, ConsultationError, CreateSlotRequest, PeriodQuery, SlotQuery, SlotStatus,
};

/// One reserve/release decrement is a compare-and-swap: the PATCH is filtered
/// on the counter value we just read, so a concurrent writer makes it match
/// zero rows instead of clobbering. A handful of retries absorbs normal
/// contention; exhaustion surfaces as a conflict.
const MAX_CAS_ATTEMPTS: u32 = 3;

pub struct SlotService {
    supabase: SupabaseClient,
}

impl SlotService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list(&self, query: SlotQuery) -> Result<Vec<ConsultationSlot>, ConsultationError> {
        let mut filters = vec![];

        if let Some(specialty) = query.specialty {
            filters.push(format!("specialty=eq.{}", urlencoding::encode(&specialty)));
        }
        if let Some(doctor) = query.doctor {
            filters.push(format!("doctor=eq.{}", urlencoding::encode(&doctor)));
        }
        if let Some(status) = query.status {
            filters.push(format!("status=eq.{}", status));
        }
        if query.available.unwrap_or(false) {
            filters.push("available_seats=gt.0".to_string());
        }

        let path = if filters.is_empty() {
            "/rest/v1/consultation_slots".to_string()
        } else {
            format!("/rest/v1/consultation_slots?{}", filters.join("&"))
        };

        self.supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))
    }

    pub async fn find(&self, code: &str) -> Result<ConsultationSlot, ConsultationError> {
        let path = format!(
            "/rest/v1/consultation_slots?code=eq.{}",
            urlencoding::encode(code)
        );
        let result: Vec<ConsultationSlot> = self
            .supabase
            .request(Method::GET, &path, None, None)
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        result.into_iter().next().ok_or(ConsultationError::SlotNotFound)
    }

    pub async fn find_by_period(
        &self,
        query: PeriodQuery,
    ) -> Result<Vec<ConsultationSlot>, ConsultationError> {
        let path = format!(
            "/rest/v1/consultation_slots?scheduled_at=gte.{}&scheduled_at=lte.{}",
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
        request: CreateSlotRequest,
    ) -> Result<ConsultationSlot, ConsultationError> {
        request.validate()?;
        let slot = request.into_slot();
        debug!("Creating consultation slot {}", slot.code);

        let created: Vec<ConsultationSlot> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/consultation_slots",
                None,
                Some(json!(slot)),
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        created
            .into_iter()
            .next()
            .ok_or_else(|| ConsultationError::DatabaseError("Failed to create slot".to_string()))
    }

    pub async fn update(
        &self,
        code: &str,
        request: CreateSlotRequest,
    ) -> Result<ConsultationSlot, ConsultationError> {
        request.validate()?;
        self.find(code).await?;

        let mut slot = request.into_slot();
        slot.code = code.to_string();

        let updated: Vec<ConsultationSlot> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &format!(
                    "/rest/v1/consultation_slots?code=eq.{}",
                    urlencoding::encode(code)
                ),
                None,
                Some(json!(slot)),
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        updated
            .into_iter()
            .next()
            .ok_or(ConsultationError::SlotNotFound)
    }

    pub async fn delete(&self, code: &str) -> Result<(), ConsultationError> {
        self.find(code).await?;

        let _: Vec<serde_json::Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &format!(
                    "/rest/v1/consultation_slots?code=eq.{}",
                    urlencoding::encode(code)
                ),
                None,
                None,
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        info!("Consultation slot {} deleted", code);
        Ok(())
    }

    /// Overwrite the status. Repeating the same overwrite is a no-op by
    /// construction, so cancellation is idempotent.
    pub async fn update_status(
        &self,
        code: &str,
        status: SlotStatus,
    ) -> Result<ConsultationSlot, ConsultationError> {
        self.find(code).await?;

        let updated: Vec<ConsultationSlot> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &format!(
                    "/rest/v1/consultation_slots?code=eq.{}",
                    urlencoding::encode(code)
                ),
                None,
                Some(json!({ "status": status })),
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        updated
            .into_iter()
            .next()
            .ok_or(ConsultationError::SlotNotFound)
    }

    /// Overwrite the available-seat counter. Values outside the slot's
    /// capacity are rejected rather than stored.
    pub async fn set_available_seats(
        &self,
        code: &str,
        available_seats: i32,
    ) -> Result<ConsultationSlot, ConsultationError> {
        let slot = self.find(code).await?;

        if available_seats < 0 || available_seats > slot.total_seats {
            return Err(ConsultationError::SeatsOutOfRange {
                available: available_seats,
                total: slot.total_seats,
            });
        }

        let updated: Vec<ConsultationSlot> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &format!(
                    "/rest/v1/consultation_slots?code=eq.{}",
                    urlencoding::encode(code)
                ),
                None,
                Some(json!({ "available_seats": available_seats })),
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        updated
            .into_iter()
            .next()
            .ok_or(ConsultationError::SlotNotFound)
    }

    /// Take one seat. Fails with `NoSeatsAvailable` when the counter is at
    /// zero; never drives it negative.
    pub async fn reserve(&self, code: &str) -> Result<ConsultationSlot, ConsultationError> {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let slot = self.find(code).await?;

            if slot.available_seats <= 0 {
                return Err(ConsultationError::NoSeatsAvailable);
            }

            if let Some(updated) = self
                .compare_and_swap_seats(code, slot.available_seats, slot.available_seats - 1)
                .await?
            {
                debug!(
                    "Reserved seat on {}: {} -> {}",
                    code, slot.available_seats, updated.available_seats
                );
                return Ok(updated);
            }

            warn!("Lost seat race on {} (attempt {})", code, attempt);
        }

        Err(ConsultationError::ConcurrentUpdate)
    }

    /// Give one seat back. Fails with `AllSeatsReleased` at full capacity;
    /// never exceeds `total_seats`.
    pub async fn release(&self, code: &str) -> Result<ConsultationSlot, ConsultationError> {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let slot = self.find(code).await?;

            if slot.available_seats >= slot.total_seats {
                return Err(ConsultationError::AllSeatsReleased);
            }

            if let Some(updated) = self
                .compare_and_swap_seats(code, slot.available_seats, slot.available_seats + 1)
                .await?
            {
                debug!(
                    "Released seat on {}: {} -> {}",
                    code, slot.available_seats, updated.available_seats
                );
                return Ok(updated);
            }

            warn!("Lost seat race on {} (attempt {})", code, attempt);
        }

        Err(ConsultationError::ConcurrentUpdate)
    }

    /// Conditional counter write: matches only while the row still holds
    /// `expected`, so a concurrent mutation yields zero affected rows.
    async fn compare_and_swap_seats(
        &self,
        code: &str,
        expected: i32,
        new_value: i32,
    ) -> Result<Option<ConsultationSlot>, ConsultationError> {
        let path = format!(
            "/rest/v1/consultation_slots?code=eq.{}&available_seats=eq.{}",
            urlencoding::encode(code),
            expected,
        );

        let updated: Vec<ConsultationSlot> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                None,
                Some(json!({ "available_seats": new_value })),
                Some(return_representation()),
            )
            .await
            .map_err(|e| ConsultationError::DatabaseError(e.to_string()))?;

        Ok(updated.into_iter().next())
    }
}
