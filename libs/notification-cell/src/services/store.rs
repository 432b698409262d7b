use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_database::{StoreError, SupabaseClient};

use crate::models::{NewNotification, Notification, RecipientKind};

/// Persistence of notification records.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create_notification(&self, new: NewNotification) -> Result<Notification, StoreError>;

    /// Newest first.
    async fn find_notifications_by_recipient(
        &self,
        recipient_id: Uuid,
        kind: RecipientKind,
    ) -> Result<Vec<Notification>, StoreError>;

    async fn find_notification_for_recipient(
        &self,
        id: Uuid,
        recipient_id: Uuid,
        kind: RecipientKind,
    ) -> Result<Option<Notification>, StoreError>;

    async fn update_notification_read_flag(&self, id: Uuid, read: bool) -> Result<Notification, StoreError>;

    async fn delete_notification(&self, id: Uuid) -> Result<(), StoreError>;
}

pub struct SupabaseNotificationStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseNotificationStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    fn single(rows: Vec<Value>, id: Uuid) -> Result<Notification, StoreError> {
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("notification {}", id)))?;
        Ok(serde_json::from_value(row)?)
    }
}

#[async_trait]
impl NotificationStore for SupabaseNotificationStore {
    async fn create_notification(&self, new: NewNotification) -> Result<Notification, StoreError> {
        let notification = new.into_notification();
        debug!("Inserting {} notification for {}", notification.category, notification.recipient_id);

        let rows: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/notifications",
            None,
            Some(serde_json::to_value(&notification)?),
            Some(SupabaseClient::return_representation()),
        ).await?;

        Self::single(rows, notification.id)
    }

    async fn find_notifications_by_recipient(
        &self,
        recipient_id: Uuid,
        kind: RecipientKind,
    ) -> Result<Vec<Notification>, StoreError> {
        let path = format!(
            "/rest/v1/notifications?destinataire_id=eq.{}&type_destinataire=eq.{}&order=date.desc",
            recipient_id, kind
        );
        self.supabase.request(Method::GET, &path, None, None).await
    }

    async fn find_notification_for_recipient(
        &self,
        id: Uuid,
        recipient_id: Uuid,
        kind: RecipientKind,
    ) -> Result<Option<Notification>, StoreError> {
        let path = format!(
            "/rest/v1/notifications?id=eq.{}&destinataire_id=eq.{}&type_destinataire=eq.{}",
            id, recipient_id, kind
        );
        let rows: Vec<Notification> = self.supabase.request(Method::GET, &path, None, None).await?;
        Ok(rows.into_iter().next())
    }

    async fn update_notification_read_flag(&self, id: Uuid, read: bool) -> Result<Notification, StoreError> {
        let path = format!("/rest/v1/notifications?id=eq.{}", id);
        let rows: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            None,
            Some(json!({ "lue": read })),
            Some(SupabaseClient::return_representation()),
        ).await?;

        Self::single(rows, id)
    }

    async fn delete_notification(&self, id: Uuid) -> Result<(), StoreError> {
        let path = format!("/rest/v1/notifications?id=eq.{}", id);
        let rows: Vec<Value> = self.supabase.request_with_headers(
            Method::DELETE,
            &path,
            None,
            None,
            Some(SupabaseClient::return_representation()),
        ).await?;

        if rows.is_empty() {
            return Err(StoreError::NotFound(format!("notification {}", id)));
        }
        Ok(())
    }
}
