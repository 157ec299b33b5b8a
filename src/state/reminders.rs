use chrono::{DateTime, Utc};
use log::warn;
use std::sync::Arc;

use super::Outcome;
use crate::backend::Backend;
use crate::constants::{
    ERROR_LOAD_FAILED, ERROR_REMINDER_ADD_FAILED, ERROR_REMINDER_DELETE_FAILED, SUCCESS_REMINDER_ADDED,
};
use crate::entities::{NewReminder, Reminder, ReminderType};
use crate::error::ValidationError;
use crate::notifications::Notifier;
use crate::repositories::ReminderRepository;
use crate::utils::datetime;

/// A user's reminders, soonest first.
pub struct ReminderList {
    backend: Arc<dyn Backend>,
    notifier: Notifier,
    user_id: String,
    reminders: Vec<Reminder>,
}

/// Reminders without a parseable date sort last.
fn sort_by_date(reminders: &mut [Reminder]) {
    reminders.sort_by_key(|r| (r.due_at().is_none(), r.due_at()));
}

impl ReminderList {
    pub fn new(backend: Arc<dyn Backend>, notifier: Notifier, user_id: &str) -> Self {
        Self {
            backend,
            notifier,
            user_id: user_id.to_string(),
            reminders: Vec::new(),
        }
    }

    pub fn items(&self) -> &[Reminder] {
        &self.reminders
    }

    pub async fn load(&mut self) -> Outcome {
        match ReminderRepository::get_for_user(self.backend.as_ref(), &self.user_id).await {
            Ok(reminders) => {
                self.reminders = reminders;
                Outcome::Applied
            }
            Err(e) => {
                warn!("Loading reminders failed: {:#}", e);
                self.notifier.error(ERROR_LOAD_FAILED);
                Outcome::Failed
            }
        }
    }

    /// Add a reminder. Title and date are both required; the date may be a
    /// plain date, a `datetime-local` value or RFC3339.
    pub async fn add(&mut self, title: &str, date: &str, reminder_type: ReminderType) -> Outcome {
        let title = title.trim();
        if title.is_empty() || date.trim().is_empty() {
            return Outcome::Ignored;
        }
        let Some(due) = datetime::parse_reminder_input(date) else {
            self.notifier
                .error(ValidationError::InvalidDate(date.trim().to_string()).to_string());
            return Outcome::Ignored;
        };

        let reminder = NewReminder {
            user_id: self.user_id.clone(),
            title: title.to_string(),
            reminder_date: datetime::to_rfc3339(due),
            reminder_type,
        };
        match ReminderRepository::insert(self.backend.as_ref(), &reminder).await {
            Ok(stored) => {
                self.reminders.push(stored);
                sort_by_date(&mut self.reminders);
                self.notifier.success(SUCCESS_REMINDER_ADDED);
                Outcome::Applied
            }
            Err(e) => {
                warn!("Adding reminder failed: {:#}", e);
                self.notifier.error(ERROR_REMINDER_ADD_FAILED);
                Outcome::Failed
            }
        }
    }

    pub async fn delete(&mut self, reminder_id: &str) -> Outcome {
        if !self.reminders.iter().any(|r| r.id == reminder_id) {
            return Outcome::Ignored;
        }
        let snapshot = self.reminders.clone();
        self.reminders.retain(|r| r.id != reminder_id);

        match ReminderRepository::delete(self.backend.as_ref(), reminder_id).await {
            Ok(()) => Outcome::Applied,
            Err(e) => {
                warn!("Deleting reminder {} failed: {:#}", reminder_id, e);
                self.notifier.error(ERROR_REMINDER_DELETE_FAILED);
                self.resync(snapshot).await;
                Outcome::Reverted
            }
        }
    }

    /// Reload from the backend, or fall back to `snapshot` when that fails too.
    async fn resync(&mut self, snapshot: Vec<Reminder>) {
        match ReminderRepository::get_for_user(self.backend.as_ref(), &self.user_id).await {
            Ok(reminders) => self.reminders = reminders,
            Err(e) => {
                warn!("Reloading reminders failed, restoring local copy: {:#}", e);
                self.reminders = snapshot;
            }
        }
    }

    /// The next `limit` reminders due at or after `now`.
    pub fn upcoming(&self, now: DateTime<Utc>, limit: usize) -> Vec<Reminder> {
        self.reminders
            .iter()
            .filter(|r| r.due_at().is_some_and(|due| due >= now))
            .take(limit)
            .cloned()
            .collect()
    }
}
