use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::clinic::Specialty;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsultationRequest {
    pub id: Uuid,
    pub patient_id: Uuid,
    #[serde(rename = "specialite")]
    pub specialty: Specialty,
    #[serde(rename = "motif")]
    pub reason: String,
    #[serde(rename = "statut")]
    pub status: RequestStatus,
    /// Doctor who accepted or refused the request.
    #[serde(rename = "medecin_id", default)]
    pub doctor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    #[serde(rename = "EN_ATTENTE")]
    Pending,
    #[serde(rename = "ACCEPTE")]
    Accepted,
    #[serde(rename = "REFUSE")]
    Rejected,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "EN_ATTENTE"),
            RequestStatus::Accepted => write!(f, "ACCEPTE"),
            RequestStatus::Rejected => write!(f, "REFUSE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewConsultationRequest {
    pub patient_id: Uuid,
    pub specialty: Specialty,
    pub reason: String,
}

impl NewConsultationRequest {
    pub fn into_request(self) -> ConsultationRequest {
        ConsultationRequest {
            id: Uuid::new_v4(),
            patient_id: self.patient_id,
            specialty: self.specialty,
            reason: self.reason,
            status: RequestStatus::Pending,
            doctor_id: None,
            created_at: Utc::now(),
        }
    }
}

/// Body of `POST /consultations`. Both fields are checked by the service so
/// a missing one gets the same message as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitConsultationBody {
    #[serde(default)]
    pub specialite: Option<String>,
    #[serde(default)]
    pub motif: Option<String>,
}
