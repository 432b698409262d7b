#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use appointment_cell::*;
use notification_cell::{ImminentAppointment, NotificationError};
use shared_config::AppConfig;
use shared_database::StoreError;
use shared_models::clinic::{Person, Specialty};

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 25).unwrap()
}

pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    day().and_hms_opt(h, m, s).unwrap()
}

pub fn appointment(time: &str) -> Appointment {
    let patient = Person { id: Uuid::new_v4(), first_name: "Awa".into(), last_name: "Diop".into() };
    let doctor = Person { id: Uuid::new_v4(), first_name: "Moussa".into(), last_name: "Ndiaye".into() };
    Appointment {
        id: Uuid::new_v4(),
        patient_id: patient.id,
        doctor_id: doctor.id,
        date: day(),
        time: time.to_string(),
        reason: Some("Suivi".to_string()),
        status: AppointmentStatus::Planned,
        specialty: Specialty::Cardiologue,
        consultation_type: Some(ConsultationType::Teleconsultation),
        request_id: None,
        patient,
        doctor,
    }
}

#[derive(Default)]
pub struct FakeAppointmentStore {
    appointments: Mutex<Vec<Appointment>>,
    connect_error: Mutex<Option<StoreError>>,
    query_error: Mutex<Option<StoreError>>,
    last_query: Mutex<Option<(AppointmentStatus, NaiveDate, NaiveDate)>>,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
    pub reconnects: AtomicUsize,
    pub scans: AtomicUsize,
}

impl FakeAppointmentStore {
    pub fn with(appointments: Vec<Appointment>) -> Self {
        Self {
            appointments: Mutex::new(appointments),
            ..Self::default()
        }
    }

    pub fn fail_connect(&self, error: Option<StoreError>) {
        *self.connect_error.lock().unwrap() = error;
    }

    pub fn fail_query(&self, error: Option<StoreError>) {
        *self.query_error.lock().unwrap() = error;
    }

    pub fn last_query(&self) -> Option<(AppointmentStatus, NaiveDate, NaiveDate)> {
        *self.last_query.lock().unwrap()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AppointmentStore for FakeAppointmentStore {
    async fn connect(&self) -> Result<(), StoreError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match self.connect_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }

    async fn reconnect(&self) -> Result<(), StoreError> {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_appointments_by_status_and_date_range(
        &self,
        status: AppointmentStatus,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some((status, from, to));
        if let Some(error) = self.query_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self
            .appointments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.status == status && a.date >= from && a.date < to)
            .cloned()
            .collect())
    }
}

/// Records reminders and fails on demand per appointment.
#[derive(Default)]
pub struct FakeNotifier {
    fired: Mutex<Vec<Uuid>>,
    failures: Mutex<HashMap<Uuid, NotificationError>>,
}

impl FakeNotifier {
    pub fn fail_for(&self, appointment_id: Uuid, error: NotificationError) {
        self.failures.lock().unwrap().insert(appointment_id, error);
    }

    pub fn heal(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub fn fired(&self) -> Vec<Uuid> {
        self.fired.lock().unwrap().clone()
    }

    pub fn take_fired(&self) -> Vec<Uuid> {
        std::mem::take(&mut *self.fired.lock().unwrap())
    }
}

#[async_trait]
impl ImminentNotifier for FakeNotifier {
    async fn notify_appointment_imminent(&self, appointment: &ImminentAppointment) -> Result<(), NotificationError> {
        if let Some(error) = self.failures.lock().unwrap().get(&appointment.appointment_id).cloned() {
            return Err(error);
        }
        self.fired.lock().unwrap().push(appointment.appointment_id);
        Ok(())
    }
}

pub fn scheduler(store: &Arc<FakeAppointmentStore>, notifier: &Arc<FakeNotifier>) -> AppointmentReminderScheduler {
    AppointmentReminderScheduler::new(store.clone(), notifier.clone(), &AppConfig::default())
}

pub fn unavailable() -> StoreError {
    StoreError::Unavailable("connection refused".to_string())
}
