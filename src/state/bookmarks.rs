use log::warn;
use std::collections::HashSet;
use std::sync::Arc;

use super::Outcome;
use crate::backend::Backend;
use crate::constants::{ERROR_BOOKMARK_FAILED, ERROR_LOAD_FAILED};
use crate::notifications::Notifier;
use crate::repositories::BookmarkRepository;

/// Ids of the notes a user has bookmarked.
pub struct BookmarkSet {
    backend: Arc<dyn Backend>,
    notifier: Notifier,
    user_id: String,
    note_ids: HashSet<String>,
}

impl BookmarkSet {
    pub fn new(backend: Arc<dyn Backend>, notifier: Notifier, user_id: &str) -> Self {
        Self {
            backend,
            notifier,
            user_id: user_id.to_string(),
            note_ids: HashSet::new(),
        }
    }

    pub fn ids(&self) -> &HashSet<String> {
        &self.note_ids
    }

    pub fn contains(&self, note_id: &str) -> bool {
        self.note_ids.contains(note_id)
    }

    pub async fn load(&mut self) -> Outcome {
        match BookmarkRepository::get_for_user(self.backend.as_ref(), &self.user_id).await {
            Ok(bookmarks) => {
                self.note_ids = bookmarks.into_iter().map(|b| b.note_id).collect();
                Outcome::Applied
            }
            Err(e) => {
                warn!("Loading bookmarks failed: {:#}", e);
                self.notifier.error(ERROR_LOAD_FAILED);
                Outcome::Failed
            }
        }
    }

    /// Flip the bookmark on `note_id`. On failure the previous set is restored.
    pub async fn toggle(&mut self, note_id: &str) -> Outcome {
        let previous = self.note_ids.clone();
        let adding = !self.note_ids.contains(note_id);
        if adding {
            self.note_ids.insert(note_id.to_string());
        } else {
            self.note_ids.remove(note_id);
        }

        let result = if adding {
            BookmarkRepository::add(self.backend.as_ref(), &self.user_id, note_id).await
        } else {
            BookmarkRepository::remove(self.backend.as_ref(), &self.user_id, note_id).await
        };

        match result {
            Ok(()) => Outcome::Applied,
            Err(e) => {
                warn!("Bookmark toggle for {} failed: {:#}", note_id, e);
                self.note_ids = previous;
                self.notifier.error(ERROR_BOOKMARK_FAILED);
                Outcome::Reverted
            }
        }
    }
}
