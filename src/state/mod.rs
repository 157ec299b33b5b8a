//! Client-side stores with optimistic updates.
//!
//! Each store owns the rows one dashboard widget shows. Mutations change the
//! local copy first, then write through to the backend. When the write fails
//! the store reloads from the backend, or puts the previous rows back if the
//! reload fails too, and raises an error toast. Nothing here returns an error.

pub mod bookmarks;
pub mod reminders;
pub mod todos;

pub use bookmarks::BookmarkSet;
pub use reminders::ReminderList;
pub use todos::TodoList;

/// What a store operation did to the local state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The change was made locally and accepted by the backend.
    Applied,
    /// Nothing to do (empty input, unknown id).
    Ignored,
    /// The backend rejected an optimistic change; local state was rolled back.
    Reverted,
    /// The backend call failed and local state was left as it was.
    Failed,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    /// Turn a backend failure into an error for callers that must report one.
    /// `Applied` and `Ignored` pass through.
    pub fn ensure(self, action: &str) -> anyhow::Result<Self> {
        match self {
            Outcome::Applied | Outcome::Ignored => Ok(self),
            Outcome::Reverted => anyhow::bail!("{} failed and was rolled back", action),
            Outcome::Failed => anyhow::bail!("{} failed", action),
        }
    }
}
