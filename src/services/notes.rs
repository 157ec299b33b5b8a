//! Browsing and downloading notes.

use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::sync::Arc;

use crate::backend::Backend;
use crate::config::StorageConfig;
use crate::constants::RPC_INCREMENT_DOWNLOAD_STATS;
use crate::counters::{increment_counter, CounterUpdate};
use crate::entities::{HistoryAction, Note};
use crate::filters::NoteFilter;
use crate::repositories::{NoteHistoryRepository, NoteRepository};

/// What a download did besides handing over the file.
#[derive(Clone, Debug)]
pub struct Download {
    pub note_id: String,
    pub url: Option<String>,
    /// File contents, when they were requested.
    pub bytes: Option<Vec<u8>>,
    pub history_recorded: bool,
    pub counter: Option<CounterUpdate>,
}

pub struct NotesService {
    backend: Arc<dyn Backend>,
    storage: StorageConfig,
    http: reqwest::Client,
}

impl NotesService {
    pub fn new(backend: Arc<dyn Backend>, storage: StorageConfig) -> Self {
        Self {
            backend,
            storage,
            http: reqwest::Client::new(),
        }
    }

    /// All notes, newest first.
    pub async fn list(&self) -> Result<Vec<Note>> {
        NoteRepository::get_all(self.backend.as_ref())
            .await
            .context("Failed to load notes")
    }

    pub async fn list_filtered(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        Ok(filter.apply(&self.list().await?))
    }

    pub async fn get(&self, note_id: &str) -> Result<Option<Note>> {
        NoteRepository::get_by_id(self.backend.as_ref(), note_id).await
    }

    /// Download a note on behalf of `user_id`.
    ///
    /// When `fetch` is set the file is fetched first and a failed fetch aborts
    /// the download. A signed-in user then gets a history row and their download
    /// counter bumped; failures there are logged and reported, not raised.
    pub async fn download(&self, note: &Note, user_id: Option<&str>, fetch: bool) -> Result<Download> {
        let bytes = if fetch { Some(self.fetch_bytes(note).await?) } else { None };

        let mut download = Download {
            note_id: note.id.clone(),
            url: note.file_url.clone(),
            bytes,
            history_recorded: false,
            counter: None,
        };

        if let Some(user_id) = user_id {
            let recorded =
                NoteHistoryRepository::record(self.backend.as_ref(), user_id, &note.id, HistoryAction::Download).await;
            match recorded {
                Ok(()) => download.history_recorded = true,
                Err(e) => warn!("Recording download of {} failed: {:#}", note.id, e),
            }
            download.counter = Some(
                increment_counter(
                    self.backend.as_ref(),
                    RPC_INCREMENT_DOWNLOAD_STATS,
                    user_id,
                    "download_count",
                )
                .await,
            );
        }

        info!("Downloaded note {} (user: {:?})", note.id, user_id);
        Ok(download)
    }

    /// File contents from storage, or from the public URL for notes without a
    /// storage path.
    pub async fn fetch_bytes(&self, note: &Note) -> Result<Vec<u8>> {
        if let Some(path) = note.storage_path.as_deref().filter(|p| !p.is_empty()) {
            return self
                .backend
                .download(&self.storage.notes_bucket, path)
                .await
                .with_context(|| format!("Failed to download '{}'", path));
        }

        let Some(url) = note.file_url.as_deref().filter(|u| !u.is_empty()) else {
            bail!("Note '{}' has no file attached", note.title);
        };
        let response = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Failed to fetch {}", url))?;
        let bytes = response.bytes().await.context("Failed to read file body")?;
        Ok(bytes.to_vec())
    }
}
