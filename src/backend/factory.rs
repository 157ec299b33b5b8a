//! Backend factory for creating backend instances from configuration.

use anyhow::{anyhow, Result};
use std::sync::Arc;

use super::{memory::MemoryBackend, supabase::SupabaseBackend, Backend};
use crate::config::BackendConfig;

/// Create a backend instance from the `[backend]` configuration section.
///
/// # Errors
/// Returns error if:
/// - Backend type is unknown
/// - The project URL or anon key cannot be resolved for a hosted backend
pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn Backend>> {
    match config.backend_type.as_str() {
        "supabase" => {
            let credentials = config.resolve_credentials()?;
            Ok(Arc::new(SupabaseBackend::new(&credentials.url, &credentials.anon_key)))
        }
        "memory" => Ok(Arc::new(MemoryBackend::new())),
        other => Err(anyhow!("Unknown backend type: {}", other)),
    }
}
