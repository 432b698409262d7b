use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use notification_cell::{NotificationService, Recipient, RecipientKind};
use shared_models::clinic::Specialty;

use crate::error::ConsultationError;
use crate::models::{ConsultationRequest, NewConsultationRequest, RequestStatus};
use crate::services::store::ConsultationStore;

pub(crate) const PATIENTS_ONLY: &str = "Seuls les patients peuvent soumettre une demande de consultation.";
pub(crate) const DOCTORS_ONLY: &str = "Accès interdit. Seuls les médecins peuvent effectuer cette action.";

/// Consultation request workflow. Submitting and accepting a request are
/// the two events that notify people.
pub struct ConsultationService {
    store: Arc<dyn ConsultationStore>,
    notifications: Arc<NotificationService>,
}

impl ConsultationService {
    pub fn new(store: Arc<dyn ConsultationStore>, notifications: Arc<NotificationService>) -> Self {
        Self { store, notifications }
    }

    #[instrument(skip(self, patient, reason), fields(patient = %patient.id))]
    pub async fn submit(
        &self,
        patient: &Recipient,
        specialty: Option<&str>,
        reason: Option<&str>,
    ) -> Result<ConsultationRequest, ConsultationError> {
        if patient.kind != RecipientKind::Patient {
            return Err(ConsultationError::Forbidden(PATIENTS_ONLY.to_string()));
        }

        let (specialty, reason) = match (specialty.map(str::trim), reason.map(str::trim)) {
            (Some(s), Some(r)) if !s.is_empty() && !r.is_empty() => (s, r),
            _ => {
                return Err(ConsultationError::Validation(
                    "Les champs spécialité et motif sont obligatoires.".to_string(),
                ))
            }
        };
        let specialty: Specialty = specialty
            .parse()
            .map_err(|_| ConsultationError::Validation("Spécialité invalide.".to_string()))?;

        let request = self
            .store
            .create_request(NewConsultationRequest {
                patient_id: patient.id,
                specialty,
                reason: reason.to_string(),
            })
            .await?;
        info!("Consultation request {} submitted for {}", request.id, specialty);

        match self
            .notifications
            .notify_doctors_new_request(specialty, &patient.full_name(), request.id)
            .await
        {
            Ok(summary) if !summary.is_complete() => {
                warn!("Request {} reached {}/{} doctors", request.id, summary.delivered, summary.requested)
            }
            Ok(_) => {}
            Err(e) => error!("Doctors were not told about request {}: {}", request.id, e),
        }

        Ok(request)
    }

    pub async fn list_pending_for_doctor(
        &self,
        doctor: &Recipient,
    ) -> Result<Vec<ConsultationRequest>, ConsultationError> {
        let specialty = Self::doctor_specialty(doctor)?;
        Ok(self.store.find_pending_by_specialty(specialty).await?)
    }

    #[instrument(skip(self, doctor), fields(doctor = %doctor.id))]
    pub async fn accept(
        &self,
        doctor: &Recipient,
        request_id: Uuid,
    ) -> Result<ConsultationRequest, ConsultationError> {
        let accepted = self.decide(doctor, request_id, RequestStatus::Accepted).await?;

        // The acceptance is already stored; a lost notification does not undo it.
        if let Err(e) = self
            .notifications
            .notify_patient_request_accepted(accepted.patient_id, &doctor.full_name(), accepted.specialty)
            .await
        {
            error!("Patient {} was not told about acceptance of {}: {}", accepted.patient_id, request_id, e);
        }

        Ok(accepted)
    }

    #[instrument(skip(self, doctor), fields(doctor = %doctor.id))]
    pub async fn reject(
        &self,
        doctor: &Recipient,
        request_id: Uuid,
    ) -> Result<ConsultationRequest, ConsultationError> {
        self.decide(doctor, request_id, RequestStatus::Rejected).await
    }

    async fn decide(
        &self,
        doctor: &Recipient,
        request_id: Uuid,
        status: RequestStatus,
    ) -> Result<ConsultationRequest, ConsultationError> {
        let specialty = Self::doctor_specialty(doctor)?;

        let request = self
            .store
            .find_request(request_id)
            .await?
            .ok_or(ConsultationError::NotFound(request_id))?;

        if request.specialty != specialty {
            return Err(ConsultationError::SpecialtyMismatch);
        }
        if request.status != RequestStatus::Pending {
            return Err(ConsultationError::AlreadyProcessed(request_id));
        }

        let decided = self
            .store
            .decide_request(request_id, status, doctor.id)
            .await?
            .ok_or(ConsultationError::AlreadyProcessed(request_id))?;

        info!("Consultation request {} is now {}", request_id, status);
        Ok(decided)
    }

    fn doctor_specialty(doctor: &Recipient) -> Result<Specialty, ConsultationError> {
        if doctor.kind != RecipientKind::Medecin {
            return Err(ConsultationError::Forbidden(DOCTORS_ONLY.to_string()));
        }
        doctor
            .specialty
            .ok_or_else(|| ConsultationError::Validation("Aucune spécialité n'est associée à ce médecin.".to_string()))
    }
}
