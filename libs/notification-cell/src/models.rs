use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use realtime_cell::NotificationPayload;
use shared_models::auth::UserRole;
use shared_models::clinic::{Person, Specialty};

// ==============================================================================
// RECIPIENTS
// ==============================================================================

/// Which user table a notification target lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipientKind {
    Patient,
    Medecin,
    Admin,
}

impl RecipientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientKind::Patient => "PATIENT",
            RecipientKind::Medecin => "MEDECIN",
            RecipientKind::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for RecipientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<UserRole> for RecipientKind {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Patient => RecipientKind::Patient,
            UserRole::Medecin => RecipientKind::Medecin,
            UserRole::Admin => RecipientKind::Admin,
        }
    }
}

/// A resolved user of any kind. `specialty` is only set for doctors.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    pub id: Uuid,
    pub kind: RecipientKind,
    pub first_name: String,
    pub last_name: String,
    pub specialty: Option<Specialty>,
}

impl Recipient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ==============================================================================
// NOTIFICATIONS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationCategory {
    #[serde(rename = "NOUVELLE_DEMANDE")]
    NewRequest,
    #[serde(rename = "DEMANDE_ACCEPTEE")]
    RequestAccepted,
    #[serde(rename = "RDV_IMMINENT")]
    AppointmentImminent,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::NewRequest => "NOUVELLE_DEMANDE",
            NotificationCategory::RequestAccepted => "DEMANDE_ACCEPTEE",
            NotificationCategory::AppointmentImminent => "RDV_IMMINENT",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted notification row. Field names on the wire are the store columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "destinataire_id")]
    pub recipient_id: Uuid,
    #[serde(rename = "type_destinataire")]
    pub recipient_kind: RecipientKind,
    #[serde(rename = "type")]
    pub category: NotificationCategory,
    #[serde(rename = "contenu")]
    pub body: String,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "lue")]
    pub read: bool,
}

impl Notification {
    pub fn is_owned_by(&self, recipient_id: Uuid, kind: RecipientKind) -> bool {
        self.recipient_id == recipient_id && self.recipient_kind == kind
    }

    pub fn to_payload(&self) -> NotificationPayload {
        NotificationPayload {
            id: self.id,
            kind: self.category.as_str().to_string(),
            contenu: self.body.clone(),
            date: self.created_at,
            lue: self.read,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub recipient_id: Uuid,
    pub recipient_kind: RecipientKind,
    pub category: NotificationCategory,
    pub body: String,
}

impl NewNotification {
    /// Row to insert. Id and timestamp are assigned here so the record is
    /// complete before it reaches the store.
    pub fn into_notification(self) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            recipient_id: self.recipient_id,
            recipient_kind: self.recipient_kind,
            category: self.category,
            body: self.body,
            created_at: Utc::now(),
            read: false,
        }
    }
}

/// Outcome of a bounded fan-out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FanOutSummary {
    pub requested: usize,
    pub delivered: usize,
    pub failed: usize,
    pub failed_recipients: Vec<Uuid>,
}

impl FanOutSummary {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// The two participants of an appointment about to start.
#[derive(Debug, Clone, PartialEq)]
pub struct ImminentAppointment {
    pub appointment_id: Uuid,
    pub patient: Person,
    pub doctor: Person,
}

// ==============================================================================
// MESSAGE BODIES
// ==============================================================================

pub fn new_request_body(patient_name: &str, specialty: Specialty) -> String {
    format!(
        "Nouvelle demande de consultation de {} pour {}.",
        patient_name,
        specialty.as_str().to_lowercase()
    )
}

pub fn request_accepted_body(doctor_name: &str, specialty: Specialty) -> String {
    format!(
        "Bonne nouvelle ! Le Dr. {} a accepté votre demande de consultation pour {}.",
        doctor_name,
        specialty.as_str().to_lowercase()
    )
}

pub fn patient_imminent_body(doctor: &Person) -> String {
    format!("Votre rendez-vous avec le Dr. {} commence maintenant !", doctor.full_name())
}

pub fn doctor_imminent_body(patient: &Person) -> String {
    format!("Votre rendez-vous avec {} commence maintenant !", patient.full_name())
}
