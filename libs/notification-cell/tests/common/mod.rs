#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Duration;
use uuid::Uuid;

use notification_cell::*;
use realtime_cell::ChannelRegistry;
use shared_database::StoreError;
use shared_models::clinic::Specialty;

/// In-memory notification table with failure injection.
#[derive(Default)]
pub struct FakeNotificationStore {
    rows: Mutex<Vec<Notification>>,
    failing_recipients: Mutex<HashSet<Uuid>>,
    unavailable: AtomicBool,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Self::default() }
    }

    pub fn fail_for(&self, recipient_id: Uuid) {
        self.failing_recipients.lock().unwrap().insert(recipient_id);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<Notification> {
        self.rows.lock().unwrap().clone()
    }

    pub fn rows_for(&self, recipient_id: Uuid) -> Vec<Notification> {
        self.rows()
            .into_iter()
            .filter(|row| row.recipient_id == recipient_id)
            .collect()
    }

    pub fn insert(&self, notification: Notification) {
        self.rows.lock().unwrap().push(notification);
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationStore for FakeNotificationStore {
    async fn create_notification(&self, new: NewNotification) -> Result<Notification, StoreError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        if self.failing_recipients.lock().unwrap().contains(&new.recipient_id) {
            return Err(StoreError::Constraint("foreign key violation".to_string()));
        }

        let notification = new.into_notification();
        self.rows.lock().unwrap().push(notification.clone());
        Ok(notification)
    }

    async fn find_notifications_by_recipient(
        &self,
        recipient_id: Uuid,
        kind: RecipientKind,
    ) -> Result<Vec<Notification>, StoreError> {
        let mut rows: Vec<Notification> = self
            .rows()
            .into_iter()
            .filter(|row| row.is_owned_by(recipient_id, kind))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_notification_for_recipient(
        &self,
        id: Uuid,
        recipient_id: Uuid,
        kind: RecipientKind,
    ) -> Result<Option<Notification>, StoreError> {
        Ok(self
            .rows()
            .into_iter()
            .find(|row| row.id == id && row.is_owned_by(recipient_id, kind)))
    }

    async fn update_notification_read_flag(&self, id: Uuid, read: bool) -> Result<Notification, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        row.read = read;
        Ok(row.clone())
    }

    async fn delete_notification(&self, id: Uuid) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Users of every kind, kept in memory.
#[derive(Default)]
pub struct FakePeople {
    people: Mutex<HashMap<(RecipientKind, Uuid), Recipient>>,
}

impl FakePeople {
    pub fn add(&self, kind: RecipientKind, first_name: &str, last_name: &str, specialty: Option<Specialty>) -> Recipient {
        let recipient = Recipient {
            id: Uuid::new_v4(),
            kind,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            specialty,
        };
        self.people
            .lock()
            .unwrap()
            .insert((kind, recipient.id), recipient.clone());
        recipient
    }

    pub fn add_with_id(&self, id: Uuid, kind: RecipientKind, specialty: Option<Specialty>) -> Recipient {
        let recipient = Recipient {
            id,
            kind,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            specialty,
        };
        self.people.lock().unwrap().insert((kind, id), recipient.clone());
        recipient
    }
}

#[async_trait]
impl DoctorDirectory for FakePeople {
    async fn find_by_specialty(&self, specialty: Specialty) -> Result<Vec<Recipient>, StoreError> {
        Ok(self
            .people
            .lock()
            .unwrap()
            .values()
            .filter(|person| person.kind == RecipientKind::Medecin && person.specialty == Some(specialty))
            .cloned()
            .collect())
    }
}

/// Exposes one kind of `FakePeople` through `RecipientLookup`.
pub struct FakeLookup {
    pub people: Arc<FakePeople>,
    pub kind: RecipientKind,
}

#[async_trait]
impl RecipientLookup for FakeLookup {
    fn kind(&self) -> RecipientKind {
        self.kind
    }

    async fn find(&self, id: Uuid) -> Result<Option<Recipient>, StoreError> {
        Ok(self.people.people.lock().unwrap().get(&(self.kind, id)).cloned())
    }
}

pub fn fake_directory(people: &Arc<FakePeople>) -> RecipientDirectory {
    [RecipientKind::Patient, RecipientKind::Medecin, RecipientKind::Admin]
        .into_iter()
        .fold(RecipientDirectory::new(), |directory, kind| {
            directory.with_lookup(Arc::new(FakeLookup { people: people.clone(), kind }))
        })
}

pub struct Harness {
    pub store: Arc<FakeNotificationStore>,
    pub people: Arc<FakePeople>,
    pub registry: ChannelRegistry,
    pub service: Arc<NotificationService>,
}

impl Harness {
    pub fn new(fanout_limit: usize) -> Self {
        Self::with_store(FakeNotificationStore::new(), fanout_limit)
    }

    pub fn with_store(store: FakeNotificationStore, fanout_limit: usize) -> Self {
        let store = Arc::new(store);
        let people = Arc::new(FakePeople::default());
        let registry = ChannelRegistry::new();
        let service = Arc::new(NotificationService::new(
            store.clone(),
            registry.clone(),
            people.clone(),
            fanout_limit,
        ));
        Self { store, people, registry, service }
    }
}
