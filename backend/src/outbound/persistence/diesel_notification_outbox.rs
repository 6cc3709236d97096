//! PostgreSQL-backed [`NotificationOutbox`] implementation.
//!
//! Notifications are written append-only into the `notifications` table. This
//! core never reads them back; a delivery consumer drains the table on its
//! own schedule.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::Notification;
use crate::domain::ports::{NotificationOutbox, OutboxError};

use super::models::NewNotificationRow;
use super::pool::DbPool;
use super::schema::notifications;

/// Diesel-backed implementation of the [`NotificationOutbox`] port.
#[derive(Clone)]
pub struct DieselNotificationOutbox {
    pool: DbPool,
}

impl DieselNotificationOutbox {
    /// Create a new outbox with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationOutbox for DieselNotificationOutbox {
    async fn emit(&self, notification: &Notification) -> Result<(), OutboxError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| OutboxError::rejected(err.to_string()))?;

        let row = NewNotificationRow {
            id: notification.id,
            from_user: *notification.from.as_uuid(),
            to_user: *notification.to.as_uuid(),
            kind: notification.kind.as_str().to_owned(),
            created_at: notification.created_at,
        };

        diesel::insert_into(notifications::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| OutboxError::rejected(err.to_string()))
    }
}
