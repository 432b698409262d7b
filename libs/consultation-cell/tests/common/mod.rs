#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use consultation_cell::*;
use notification_cell::*;
use realtime_cell::ChannelRegistry;
use shared_database::StoreError;
use shared_models::clinic::Specialty;

#[derive(Default)]
pub struct FakeConsultationStore {
    requests: Mutex<HashMap<Uuid, ConsultationRequest>>,
}

impl FakeConsultationStore {
    pub fn seed(&self, patient_id: Uuid, specialty: Specialty, status: RequestStatus) -> ConsultationRequest {
        let mut request = NewConsultationRequest {
            patient_id,
            specialty,
            reason: "Douleurs thoraciques".to_string(),
        }
        .into_request();
        request.status = status;
        self.requests.lock().unwrap().insert(request.id, request.clone());
        request
    }

    pub fn get(&self, id: Uuid) -> Option<ConsultationRequest> {
        self.requests.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ConsultationStore for FakeConsultationStore {
    async fn create_request(&self, new: NewConsultationRequest) -> Result<ConsultationRequest, StoreError> {
        let request = new.into_request();
        self.requests.lock().unwrap().insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_request(&self, id: Uuid) -> Result<Option<ConsultationRequest>, StoreError> {
        Ok(self.get(id))
    }

    async fn find_pending_by_specialty(&self, specialty: Specialty) -> Result<Vec<ConsultationRequest>, StoreError> {
        let mut pending: Vec<ConsultationRequest> = self
            .requests
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.status == RequestStatus::Pending && r.specialty == specialty)
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.created_at);
        Ok(pending)
    }

    async fn decide_request(
        &self,
        id: Uuid,
        status: RequestStatus,
        doctor_id: Uuid,
    ) -> Result<Option<ConsultationRequest>, StoreError> {
        let mut requests = self.requests.lock().unwrap();
        match requests.get_mut(&id) {
            Some(request) if request.status == RequestStatus::Pending => {
                request.status = status;
                request.doctor_id = Some(doctor_id);
                Ok(Some(request.clone()))
            }
            _ => Ok(None),
        }
    }
}

/// Notification table that can be switched off.
#[derive(Default)]
pub struct FakeNotificationStore {
    rows: Mutex<Vec<Notification>>,
    down: AtomicBool,
}

impl FakeNotificationStore {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn rows_for(&self, recipient_id: Uuid) -> Vec<Notification> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationStore for FakeNotificationStore {
    async fn create_notification(&self, new: NewNotification) -> Result<Notification, StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("down".to_string()));
        }
        let notification = new.into_notification();
        self.rows.lock().unwrap().push(notification.clone());
        Ok(notification)
    }

    async fn find_notifications_by_recipient(&self, recipient_id: Uuid, kind: RecipientKind) -> Result<Vec<Notification>, StoreError> {
        Ok(self
            .rows_for(recipient_id)
            .into_iter()
            .filter(|n| n.recipient_kind == kind)
            .collect())
    }

    async fn find_notification_for_recipient(&self, id: Uuid, recipient_id: Uuid, kind: RecipientKind) -> Result<Option<Notification>, StoreError> {
        Ok(self
            .rows_for(recipient_id)
            .into_iter()
            .find(|n| n.id == id && n.recipient_kind == kind))
    }

    async fn update_notification_read_flag(&self, id: Uuid, _read: bool) -> Result<Notification, StoreError> {
        Err(StoreError::NotFound(id.to_string()))
    }

    async fn delete_notification(&self, id: Uuid) -> Result<(), StoreError> {
        Err(StoreError::NotFound(id.to_string()))
    }
}

#[derive(Default)]
pub struct People {
    people: Mutex<HashMap<(RecipientKind, Uuid), Recipient>>,
}

impl People {
    pub fn add(&self, kind: RecipientKind, first_name: &str, last_name: &str, specialty: Option<Specialty>) -> Recipient {
        self.add_with_id(Uuid::new_v4(), kind, first_name, last_name, specialty)
    }

    pub fn add_with_id(&self, id: Uuid, kind: RecipientKind, first_name: &str, last_name: &str, specialty: Option<Specialty>) -> Recipient {
        let recipient = Recipient {
            id,
            kind,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            specialty,
        };
        self.people.lock().unwrap().insert((kind, id), recipient.clone());
        recipient
    }
}

#[async_trait]
impl DoctorDirectory for People {
    async fn find_by_specialty(&self, specialty: Specialty) -> Result<Vec<Recipient>, StoreError> {
        Ok(self
            .people
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.kind == RecipientKind::Medecin && p.specialty == Some(specialty))
            .cloned()
            .collect())
    }
}

pub struct PeopleLookup {
    people: Arc<People>,
    kind: RecipientKind,
}

#[async_trait]
impl RecipientLookup for PeopleLookup {
    fn kind(&self) -> RecipientKind {
        self.kind
    }

    async fn find(&self, id: Uuid) -> Result<Option<Recipient>, StoreError> {
        Ok(self.people.people.lock().unwrap().get(&(self.kind, id)).cloned())
    }
}

pub struct World {
    pub requests: Arc<FakeConsultationStore>,
    pub notifications: Arc<FakeNotificationStore>,
    pub people: Arc<People>,
    pub service: Arc<ConsultationService>,
}

impl World {
    pub fn new() -> Self {
        let requests = Arc::new(FakeConsultationStore::default());
        let notifications = Arc::new(FakeNotificationStore::default());
        let people = Arc::new(People::default());
        let notifier = Arc::new(NotificationService::new(
            notifications.clone(),
            ChannelRegistry::new(),
            people.clone(),
            4,
        ));
        let service = Arc::new(ConsultationService::new(requests.clone(), notifier));
        Self { requests, notifications, people, service }
    }

    pub fn directory(&self) -> RecipientDirectory {
        [RecipientKind::Patient, RecipientKind::Medecin, RecipientKind::Admin]
            .into_iter()
            .fold(RecipientDirectory::new(), |directory, kind| {
                directory.with_lookup(Arc::new(PeopleLookup { people: self.people.clone(), kind }))
            })
    }
}
