use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::{StoreError, SupabaseClient};
use shared_models::clinic::Specialty;

use crate::models::{ConsultationRequest, NewConsultationRequest, RequestStatus};

#[async_trait]
pub trait ConsultationStore: Send + Sync {
    async fn create_request(&self, new: NewConsultationRequest) -> Result<ConsultationRequest, StoreError>;

    async fn find_request(&self, id: Uuid) -> Result<Option<ConsultationRequest>, StoreError>;

    /// Oldest first.
    async fn find_pending_by_specialty(&self, specialty: Specialty) -> Result<Vec<ConsultationRequest>, StoreError>;

    /// Moves a pending request to `status`. `None` when the request was no
    /// longer pending at write time.
    async fn decide_request(
        &self,
        id: Uuid,
        status: RequestStatus,
        doctor_id: Uuid,
    ) -> Result<Option<ConsultationRequest>, StoreError>;
}

pub struct SupabaseConsultationStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseConsultationStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl ConsultationStore for SupabaseConsultationStore {
    async fn create_request(&self, new: NewConsultationRequest) -> Result<ConsultationRequest, StoreError> {
        let request = new.into_request();
        debug!("Creating consultation request {} ({})", request.id, request.specialty);

        let rows: Vec<ConsultationRequest> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/demandes_consultation",
            None,
            Some(serde_json::to_value(&request)?),
            Some(SupabaseClient::return_representation()),
        ).await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))
    }

    async fn find_request(&self, id: Uuid) -> Result<Option<ConsultationRequest>, StoreError> {
        let path = format!("/rest/v1/demandes_consultation?id=eq.{}", id);
        let rows: Vec<ConsultationRequest> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_pending_by_specialty(&self, specialty: Specialty) -> Result<Vec<ConsultationRequest>, StoreError> {
        let path = format!(
            "/rest/v1/demandes_consultation?statut=eq.{}&specialite=eq.{}&order=created_at.asc",
            RequestStatus::Pending, specialty
        );
        self.supabase.request(Method::GET, &path, None, None).await
    }

    async fn decide_request(
        &self,
        id: Uuid,
        status: RequestStatus,
        doctor_id: Uuid,
    ) -> Result<Option<ConsultationRequest>, StoreError> {
        let path = format!(
            "/rest/v1/demandes_consultation?id=eq.{}&statut=eq.{}",
            id, RequestStatus::Pending
        );
        let rows: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            None,
            Some(json!({ "statut": status, "medecin_id": doctor_id })),
            Some(SupabaseClient::return_representation()),
        ).await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }
}
