//! Profile usage counters (`login_count`, `download_count`).
//!
//! The preferred path is the stored procedure, which increments atomically on
//! the server. Projects without it fall back to reading the column and writing
//! it back plus one. That fallback can lose increments when two clients race.

use log::{info, warn};
use serde_json::json;

use crate::backend::Backend;
use crate::repositories::ProfileRepository;

/// Which path, if any, bumped the counter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CounterUpdate {
    Rpc,
    Fallback { value: i64 },
    Failed(String),
}

impl CounterUpdate {
    pub fn succeeded(&self) -> bool {
        !matches!(self, CounterUpdate::Failed(_))
    }
}

/// Increment `column` on the profile of `user_id`.
///
/// Never returns an error: counter failures are logged and reported in the
/// result, they must not interrupt the action being counted.
pub async fn increment_counter(backend: &dyn Backend, function: &str, user_id: &str, column: &str) -> CounterUpdate {
    match backend.rpc(function, json!({ "user_id_param": user_id })).await {
        Ok(_) => return CounterUpdate::Rpc,
        Err(e) => warn!("{} failed for {}, falling back to read-then-write: {}", function, user_id, e),
    }

    let current = match ProfileRepository::get_counter(backend, user_id, column).await {
        Ok(current) => current,
        Err(e) => {
            warn!("Reading {} for {} failed: {:#}", column, user_id, e);
            return CounterUpdate::Failed(e.to_string());
        }
    };

    let value = current + 1;
    match ProfileRepository::set_counter(backend, user_id, column, value).await {
        Ok(()) => {
            info!("{} for {} set to {} without {}", column, user_id, value, function);
            CounterUpdate::Fallback { value }
        }
        Err(e) => {
            warn!("Writing {} for {} failed: {:#}", column, user_id, e);
            CounterUpdate::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::constants::{RPC_INCREMENT_DOWNLOAD_STATS, TABLE_PROFILES};

    async fn backend_with_profile(download_count: i64) -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend
            .seed(TABLE_PROFILES, vec![json!({"id": "u1", "download_count": download_count})])
            .await;
        backend
    }

    #[tokio::test]
    async fn test_rpc_path() {
        let backend = backend_with_profile(2).await;
        let result = increment_counter(&backend, RPC_INCREMENT_DOWNLOAD_STATS, "u1", "download_count").await;
        assert_eq!(result, CounterUpdate::Rpc);
        assert_eq!(backend.rows(TABLE_PROFILES).await[0]["download_count"], 3);
    }

    #[tokio::test]
    async fn test_fallback_when_rpc_missing() {
        let backend = backend_with_profile(4).await;
        backend.set_rpc_available(false).await;
        let result = increment_counter(&backend, RPC_INCREMENT_DOWNLOAD_STATS, "u1", "download_count").await;
        assert_eq!(result, CounterUpdate::Fallback { value: 5 });
        assert_eq!(backend.rows(TABLE_PROFILES).await[0]["download_count"], 5);
    }

    #[tokio::test]
    async fn test_failure_is_reported_not_raised() {
        let backend = backend_with_profile(0).await;
        backend.set_rpc_available(false).await;
        backend.fail_writes_to(TABLE_PROFILES).await;
        let result = increment_counter(&backend, RPC_INCREMENT_DOWNLOAD_STATS, "u1", "download_count").await;
        assert!(!result.succeeded());
        assert_eq!(backend.rows(TABLE_PROFILES).await[0]["download_count"], 0);
    }

    #[tokio::test]
    async fn test_missing_profile_is_not_counted() {
        let backend = MemoryBackend::new();
        backend.set_rpc_available(false).await;
        let result = increment_counter(&backend, RPC_INCREMENT_DOWNLOAD_STATS, "ghost", "download_count").await;
        assert!(matches!(result, CounterUpdate::Failed(_)));
        assert!(backend.rows(TABLE_PROFILES).await.is_empty());
    }

    #[tokio::test]
    async fn test_null_counter_starts_from_zero() {
        let backend = MemoryBackend::new();
        backend.seed(TABLE_PROFILES, vec![json!({"id": "u1", "login_count": null})]).await;
        backend.set_rpc_available(false).await;
        let result = increment_counter(&backend, RPC_INCREMENT_DOWNLOAD_STATS, "u1", "login_count").await;
        assert_eq!(result, CounterUpdate::Fallback { value: 1 });
    }
}
