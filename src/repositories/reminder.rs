//! Reminder repository.

use anyhow::Result;
use chrono::{DateTime, Utc};

use super::{decode_row, decode_rows, encode};
use crate::backend::{Backend, Filter, Query};
use crate::constants::TABLE_REMINDERS;
use crate::entities::{NewReminder, Reminder};
use crate::utils::datetime;

/// Repository for reminder-related operations.
pub struct ReminderRepository;

impl ReminderRepository {
    /// Get a user's reminders, soonest first.
    pub async fn get_for_user(backend: &dyn Backend, user_id: &str) -> Result<Vec<Reminder>> {
        let rows = backend
            .select(
                TABLE_REMINDERS,
                &Query::new().eq("user_id", user_id).order_asc("reminder_date"),
            )
            .await?;
        decode_rows(TABLE_REMINDERS, rows)
    }

    /// Get the next `limit` reminders due at or after `now`.
    pub async fn get_upcoming(
        backend: &dyn Backend,
        user_id: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Reminder>> {
        let rows = backend
            .select(
                TABLE_REMINDERS,
                &Query::new()
                    .eq("user_id", user_id)
                    .gte("reminder_date", datetime::to_rfc3339(now))
                    .order_asc("reminder_date")
                    .limit(limit),
            )
            .await?;
        decode_rows(TABLE_REMINDERS, rows)
    }

    pub async fn insert(backend: &dyn Backend, reminder: &NewReminder) -> Result<Reminder> {
        let row = backend
            .insert(TABLE_REMINDERS, encode(TABLE_REMINDERS, reminder)?)
            .await?;
        decode_row(TABLE_REMINDERS, row)
    }

    pub async fn delete(backend: &dyn Backend, reminder_id: &str) -> Result<()> {
        backend.delete(TABLE_REMINDERS, &[Filter::eq("id", reminder_id)]).await?;
        Ok(())
    }
}
