use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use notification_cell::ImminentAppointment;
use shared_models::clinic::{Person, Specialty};

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// An appointment row with its patient and doctor embedded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    #[serde(rename = "medecin_id")]
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    /// Wall-clock start, `HH:MM` or `HH:MM:SS`.
    #[serde(rename = "heure")]
    pub time: String,
    #[serde(rename = "motif", default)]
    pub reason: Option<String>,
    #[serde(rename = "statut")]
    pub status: AppointmentStatus,
    #[serde(rename = "specialite")]
    pub specialty: Specialty,
    #[serde(rename = "type", default)]
    pub consultation_type: Option<ConsultationType>,
    #[serde(rename = "demande_id", default)]
    pub request_id: Option<Uuid>,
    pub patient: Person,
    #[serde(rename = "medecin")]
    pub doctor: Person,
}

impl Appointment {
    /// Hour and minute of `time`; a seconds part is accepted and dropped.
    pub fn start_time(&self) -> Option<NaiveTime> {
        let time = self.time.trim();
        NaiveTime::parse_from_str(time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
            .ok()
            .and_then(|t| t.with_second(0))
    }

    /// Local date and time the appointment starts, if `time` is well formed.
    pub fn scheduled_start(&self) -> Option<NaiveDateTime> {
        self.start_time().map(|time| self.date.and_time(time))
    }

    pub fn participants(&self) -> ImminentAppointment {
        ImminentAppointment {
            appointment_id: self.id,
            patient: self.patient.clone(),
            doctor: self.doctor.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    #[serde(rename = "PLANIFIE")]
    Planned,
    #[serde(rename = "REALISE")]
    Done,
    #[serde(rename = "ANNULE")]
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Planned => write!(f, "PLANIFIE"),
            AppointmentStatus::Done => write!(f, "REALISE"),
            AppointmentStatus::Cancelled => write!(f, "ANNULE"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ConsultationType {
    #[serde(rename = "EN_PERSONNE")]
    InPerson,
    #[serde(rename = "TELECONSULTATION")]
    Teleconsultation,
}
