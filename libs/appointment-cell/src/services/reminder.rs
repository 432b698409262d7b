use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use notification_cell::{ImminentAppointment, NotificationError, NotificationService};
use shared_config::AppConfig;

use crate::error::ScanError;
use crate::models::AppointmentStatus;
use crate::services::store::AppointmentStore;

/// Source of "now" in server-local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Whatever delivers the "appointment starts now" reminders.
#[async_trait]
pub trait ImminentNotifier: Send + Sync {
    async fn notify_appointment_imminent(&self, appointment: &ImminentAppointment) -> Result<(), NotificationError>;
}

#[async_trait]
impl ImminentNotifier for NotificationService {
    async fn notify_appointment_imminent(&self, appointment: &ImminentAppointment) -> Result<(), NotificationError> {
        NotificationService::notify_appointment_imminent(self, appointment).await
    }
}

/// Whole minutes from `now` until `start`, rounded toward negative infinity.
pub fn minutes_until(start: NaiveDateTime, now: NaiveDateTime) -> i64 {
    let delta = start - now;
    match delta.num_microseconds() {
        Some(micros) => micros.div_euclid(60_000_000),
        None => delta.num_minutes(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub scanned: usize,
    pub fired: usize,
    /// Appointments whose time could not be read.
    pub skipped: usize,
    /// Reminders that failed without taking the store down.
    pub failed: usize,
    /// Set when the tick stopped before visiting every appointment.
    pub aborted: Option<ScanError>,
}

/// Recurring scan that fires a reminder when an appointment is exactly
/// `lead_minutes` away.
///
/// A tick that is delayed past the matching minute does not catch up, and
/// nothing records that a reminder went out, so a tick that is retried
/// within the same minute fires again.
pub struct AppointmentReminderScheduler {
    store: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn ImminentNotifier>,
    clock: Arc<dyn Clock>,
    tick: Duration,
    lead_minutes: i64,
}

impl AppointmentReminderScheduler {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn ImminentNotifier>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            clock: Arc::new(LocalClock),
            tick: Duration::from_secs(config.reminder_tick_seconds.max(1)),
            lead_minutes: config.reminder_lead_minutes,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Spawns the timer task. Missed ticks are skipped, never bunched.
    pub fn start(self: Arc<Self>) -> SchedulerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        info!(
            "Starting appointment reminder scheduler (every {:?}, lead {} min)",
            self.tick, self.lead_minutes
        );

        let task = tokio::spawn(async move {
            let mut ticker = interval(self.tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = self.run_tick(self.clock.now()).await;
                        if report.fired > 0 || report.aborted.is_some() {
                            info!("Reminder tick: {:?}", report);
                        } else {
                            debug!("Reminder tick: {:?}", report);
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Appointment reminder scheduler stopped");
        });

        SchedulerHandle { stop: stop_tx, task }
    }

    /// One scan at `now`. The store session is opened first and closed on
    /// every path out.
    #[instrument(skip(self))]
    pub async fn run_tick(&self, now: NaiveDateTime) -> TickReport {
        let report = match self.store.connect().await {
            Ok(()) => self.scan(now).await,
            Err(e) => TickReport {
                aborted: Some(ScanError::Connect(e)),
                ..TickReport::default()
            },
        };

        if let Some(e) = &report.aborted {
            error!("Reminder tick abandoned: {}", e);
            if e.is_connectivity() {
                if let Err(reconnect_error) = self.store.reconnect().await {
                    error!("Store reconnect failed: {}", reconnect_error);
                }
            }
        }

        self.store.disconnect().await;
        report
    }

    async fn scan(&self, now: NaiveDateTime) -> TickReport {
        let today = now.date();
        let tomorrow = today + ChronoDuration::days(1);
        let mut report = TickReport::default();

        let appointments = match self
            .store
            .find_appointments_by_status_and_date_range(AppointmentStatus::Planned, today, tomorrow)
            .await
        {
            Ok(appointments) => appointments,
            Err(e) => {
                report.aborted = Some(ScanError::Query(e));
                return report;
            }
        };
        report.scanned = appointments.len();

        for appointment in appointments {
            let Some(start) = appointment.scheduled_start() else {
                warn!("Appointment {} has unreadable time {:?}, skipped", appointment.id, appointment.time);
                report.skipped += 1;
                continue;
            };

            if minutes_until(start, now) != self.lead_minutes {
                continue;
            }

            debug!("Appointment {} starts at {}, firing reminder", appointment.id, start);
            match self.notifier.notify_appointment_imminent(&appointment.participants()).await {
                Ok(()) => report.fired += 1,
                Err(e) if e.is_connectivity() => {
                    report.aborted = Some(ScanError::Reminder {
                        appointment_id: appointment.id,
                        source: e,
                    });
                    return report;
                }
                Err(e) => {
                    error!("Reminder for appointment {} failed: {}", appointment.id, e);
                    report.failed += 1;
                }
            }
        }

        report
    }
}

/// Owner's side of a running scheduler.
pub struct SchedulerHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signals the loop and waits for it; an in-flight tick finishes first.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            error!("Reminder scheduler task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
