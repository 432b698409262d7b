use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use uuid::Uuid;

use shared_database::{StoreError, SupabaseClient};
use shared_models::clinic::Specialty;

use crate::error::NotificationError;
use crate::models::{Recipient, RecipientKind};

/// Resolves users of one kind by id.
#[async_trait]
pub trait RecipientLookup: Send + Sync {
    fn kind(&self) -> RecipientKind;

    async fn find(&self, id: Uuid) -> Result<Option<Recipient>, StoreError>;
}

/// Doctors addressable by specialty, the source of new-request fan-out.
#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn find_by_specialty(&self, specialty: Specialty) -> Result<Vec<Recipient>, StoreError>;
}

#[derive(Deserialize)]
struct PersonRow {
    id: Uuid,
    prenom: String,
    nom: String,
    #[serde(default)]
    specialite: Option<Specialty>,
}

impl PersonRow {
    fn into_recipient(self, kind: RecipientKind) -> Recipient {
        Recipient {
            id: self.id,
            kind,
            first_name: self.prenom,
            last_name: self.nom,
            specialty: self.specialite,
        }
    }
}

async fn find_in_table(
    supabase: &SupabaseClient,
    table: &str,
    kind: RecipientKind,
    id: Uuid,
) -> Result<Option<Recipient>, StoreError> {
    let path = format!("/rest/v1/{}?id=eq.{}", table, id);
    let rows: Vec<PersonRow> = supabase.request(Method::GET, &path, None, None).await?;
    Ok(rows.into_iter().next().map(|row| row.into_recipient(kind)))
}

pub struct PatientLookup {
    supabase: Arc<SupabaseClient>,
}

impl PatientLookup {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl RecipientLookup for PatientLookup {
    fn kind(&self) -> RecipientKind {
        RecipientKind::Patient
    }

    async fn find(&self, id: Uuid) -> Result<Option<Recipient>, StoreError> {
        find_in_table(&self.supabase, "patients", RecipientKind::Patient, id).await
    }
}

pub struct DoctorLookup {
    supabase: Arc<SupabaseClient>,
}

impl DoctorLookup {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl RecipientLookup for DoctorLookup {
    fn kind(&self) -> RecipientKind {
        RecipientKind::Medecin
    }

    async fn find(&self, id: Uuid) -> Result<Option<Recipient>, StoreError> {
        find_in_table(&self.supabase, "medecins", RecipientKind::Medecin, id).await
    }
}

#[async_trait]
impl DoctorDirectory for DoctorLookup {
    async fn find_by_specialty(&self, specialty: Specialty) -> Result<Vec<Recipient>, StoreError> {
        let path = format!("/rest/v1/medecins?specialite=eq.{}", specialty);
        let rows: Vec<PersonRow> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_recipient(RecipientKind::Medecin))
            .collect())
    }
}

pub struct AdminLookup {
    supabase: Arc<SupabaseClient>,
}

impl AdminLookup {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl RecipientLookup for AdminLookup {
    fn kind(&self) -> RecipientKind {
        RecipientKind::Admin
    }

    async fn find(&self, id: Uuid) -> Result<Option<Recipient>, StoreError> {
        find_in_table(&self.supabase, "admins", RecipientKind::Admin, id).await
    }
}

/// One lookup per recipient kind.
#[derive(Clone, Default)]
pub struct RecipientDirectory {
    lookups: HashMap<RecipientKind, Arc<dyn RecipientLookup>>,
}

impl RecipientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn supabase(supabase: Arc<SupabaseClient>) -> Self {
        Self::new()
            .with_lookup(Arc::new(PatientLookup::new(supabase.clone())))
            .with_lookup(Arc::new(DoctorLookup::new(supabase.clone())))
            .with_lookup(Arc::new(AdminLookup::new(supabase)))
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn RecipientLookup>) -> Self {
        self.lookups.insert(lookup.kind(), lookup);
        self
    }

    pub async fn find(&self, kind: RecipientKind, id: Uuid) -> Result<Option<Recipient>, NotificationError> {
        let lookup = self
            .lookups
            .get(&kind)
            .ok_or(NotificationError::UnsupportedKind(kind))?;
        Ok(lookup.find(id).await?)
    }

    /// Like `find`, but absence is an error.
    pub async fn require(&self, kind: RecipientKind, id: Uuid) -> Result<Recipient, NotificationError> {
        self.find(kind, id)
            .await?
            .ok_or(NotificationError::UnknownRecipient { id, kind })
    }
}
