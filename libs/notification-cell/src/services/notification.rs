use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use realtime_cell::{ChannelRegistry, PushError, RdvReadyPayload, RealtimeEvent};
use shared_models::clinic::Specialty;

use crate::error::NotificationError;
use crate::models::{
    doctor_imminent_body, new_request_body, patient_imminent_body, request_accepted_body,
    FanOutSummary, ImminentAppointment, NewNotification, Notification, NotificationCategory,
    RecipientKind,
};
use crate::services::recipients::DoctorDirectory;
use crate::services::store::NotificationStore;

/// Writes notification records and pushes them to live connections.
///
/// A record is always persisted before anything is pushed; a failed write
/// is returned to the caller and no event leaves the process. Push failures
/// are logged and never surface.
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    registry: ChannelRegistry,
    doctors: Arc<dyn DoctorDirectory>,
    fanout_limit: usize,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        registry: ChannelRegistry,
        doctors: Arc<dyn DoctorDirectory>,
        fanout_limit: usize,
    ) -> Self {
        Self {
            store,
            registry,
            doctors,
            fanout_limit: fanout_limit.max(1),
        }
    }

    #[instrument(skip(self, body), fields(recipient = %recipient_id, kind = %kind, category = %category))]
    pub async fn send(
        &self,
        recipient_id: Uuid,
        kind: RecipientKind,
        category: NotificationCategory,
        body: String,
    ) -> Result<Notification, NotificationError> {
        let notification = self
            .store
            .create_notification(NewNotification {
                recipient_id,
                recipient_kind: kind,
                category,
                body,
            })
            .await
            .map_err(|e| {
                error!("Failed to persist notification: {}", e);
                NotificationError::Persistence(e)
            })?;

        debug!("Notification {} persisted", notification.id);
        self.push(recipient_id, RealtimeEvent::Notification(notification.to_payload()))
            .await;

        Ok(notification)
    }

    /// One `send` per distinct recipient, at most `fanout_limit` in flight.
    /// Every outcome is collected; one failure never cancels the others.
    #[instrument(skip(self, recipients, body), fields(count = recipients.len(), category = %category))]
    pub async fn send_to_many(
        &self,
        recipients: &[Uuid],
        kind: RecipientKind,
        category: NotificationCategory,
        body: &str,
    ) -> FanOutSummary {
        let mut seen = HashSet::new();
        let targets: Vec<Uuid> = recipients
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        let outcomes: Vec<(Uuid, Result<Notification, NotificationError>)> = stream::iter(targets)
            .map(|recipient_id| async move {
                let outcome = self.send(recipient_id, kind, category, body.to_string()).await;
                (recipient_id, outcome)
            })
            .buffer_unordered(self.fanout_limit)
            .collect()
            .await;

        let mut summary = FanOutSummary {
            requested: outcomes.len(),
            ..FanOutSummary::default()
        };
        for (recipient_id, outcome) in outcomes {
            match outcome {
                Ok(_) => summary.delivered += 1,
                Err(e) => {
                    warn!("Fan-out to {} failed: {}", recipient_id, e);
                    summary.failed += 1;
                    summary.failed_recipients.push(recipient_id);
                }
            }
        }

        info!(
            "Fan-out {}: {}/{} delivered, {} failed",
            category, summary.delivered, summary.requested, summary.failed
        );
        summary
    }

    /// Tells every doctor of `specialty` that a patient asked for a consultation.
    #[instrument(skip(self, patient_name))]
    pub async fn notify_doctors_new_request(
        &self,
        specialty: Specialty,
        patient_name: &str,
        request_id: Uuid,
    ) -> Result<FanOutSummary, NotificationError> {
        let doctors = self.doctors.find_by_specialty(specialty).await?;
        if doctors.is_empty() {
            info!("No doctor practises {}, request {} notifies nobody", specialty, request_id);
            return Ok(FanOutSummary::default());
        }

        let ids: Vec<Uuid> = doctors.iter().map(|doctor| doctor.id).collect();
        let body = new_request_body(patient_name, specialty);
        Ok(self
            .send_to_many(&ids, RecipientKind::Medecin, NotificationCategory::NewRequest, &body)
            .await)
    }

    #[instrument(skip(self, doctor_name))]
    pub async fn notify_patient_request_accepted(
        &self,
        patient_id: Uuid,
        doctor_name: &str,
        specialty: Specialty,
    ) -> Result<Notification, NotificationError> {
        self.send(
            patient_id,
            RecipientKind::Patient,
            NotificationCategory::RequestAccepted,
            request_accepted_body(doctor_name, specialty),
        )
        .await
    }

    /// Persists an imminent-appointment notice for the patient, then the
    /// doctor, then pushes the room hint to both.
    #[instrument(skip(self, appointment), fields(appointment = %appointment.appointment_id))]
    pub async fn notify_appointment_imminent(
        &self,
        appointment: &ImminentAppointment,
    ) -> Result<(), NotificationError> {
        self.send(
            appointment.patient.id,
            RecipientKind::Patient,
            NotificationCategory::AppointmentImminent,
            patient_imminent_body(&appointment.doctor),
        )
        .await?;

        self.send(
            appointment.doctor.id,
            RecipientKind::Medecin,
            NotificationCategory::AppointmentImminent,
            doctor_imminent_body(&appointment.patient),
        )
        .await?;

        let ready = RealtimeEvent::RdvReady(RdvReadyPayload::join_room(appointment.appointment_id));
        self.push(appointment.patient.id, ready.clone()).await;
        self.push(appointment.doctor.id, ready).await;

        info!("Imminent reminders sent for appointment {}", appointment.appointment_id);
        Ok(())
    }

    pub async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        kind: RecipientKind,
    ) -> Result<Vec<Notification>, NotificationError> {
        Ok(self.store.find_notifications_by_recipient(recipient_id, kind).await?)
    }

    #[instrument(skip(self))]
    pub async fn mark_as_read(
        &self,
        id: Uuid,
        recipient_id: Uuid,
        kind: RecipientKind,
    ) -> Result<Notification, NotificationError> {
        self.owned(id, recipient_id, kind).await?;
        Ok(self.store.update_notification_read_flag(id, true).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        id: Uuid,
        recipient_id: Uuid,
        kind: RecipientKind,
    ) -> Result<(), NotificationError> {
        self.owned(id, recipient_id, kind).await?;
        Ok(self.store.delete_notification(id).await?)
    }

    async fn owned(
        &self,
        id: Uuid,
        recipient_id: Uuid,
        kind: RecipientKind,
    ) -> Result<Notification, NotificationError> {
        self.store
            .find_notification_for_recipient(id, recipient_id, kind)
            .await?
            .filter(|notification| notification.is_owned_by(recipient_id, kind))
            .ok_or(NotificationError::NotFound(id))
    }

    async fn push(&self, user_id: Uuid, event: RealtimeEvent) {
        let name = event.name();
        match self.registry.publish(user_id, event).await {
            Ok(reached) => debug!("Pushed {} to {} connection(s) of {}", name, reached, user_id),
            Err(PushError::NoActiveConnections(_)) => {
                debug!("{} is offline, {} not pushed", user_id, name)
            }
            Err(e) => warn!("Push of {} failed: {}", name, e),
        }
    }
}
