use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use tracing::debug;

use shared_database::{StoreError, SupabaseClient};

use crate::models::{Appointment, AppointmentStatus};

/// Read side of the appointment table plus the session lifecycle the
/// reminder job drives around each scan.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn connect(&self) -> Result<(), StoreError>;

    async fn disconnect(&self);

    async fn reconnect(&self) -> Result<(), StoreError>;

    /// Appointments in `status` whose date is in `[from, to)`, with patient
    /// and doctor embedded.
    async fn find_appointments_by_status_and_date_range(
        &self,
        status: AppointmentStatus,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError>;
}

pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn connect(&self) -> Result<(), StoreError> {
        self.supabase.connect().await
    }

    async fn disconnect(&self) {
        self.supabase.disconnect().await
    }

    async fn reconnect(&self) -> Result<(), StoreError> {
        self.supabase.reconnect().await
    }

    async fn find_appointments_by_status_and_date_range(
        &self,
        status: AppointmentStatus,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        let path = format!(
            "/rest/v1/rendezvous?select=*,patient:patients(*),medecin:medecins(*)&statut=eq.{}&date=gte.{}&date=lt.{}&order=heure.asc",
            status, from, to
        );
        debug!("Scanning {} appointments from {} to {}", status, from, to);

        self.supabase.request(Method::GET, &path, None, None).await
    }
}
