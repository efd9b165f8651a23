use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::errors::ApiError;

/// File-storage collaborator for uploaded images.
///
/// Persists an uploaded binary under the configured root and returns its
/// stored path. Removal is best-effort: the image store is not transactional
/// with the document store, so cleanup failures are logged and never surfaced.
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persist an uploaded binary and return its stored path
    pub async fn save(
        &self,
        original_name: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            ApiError::persistence_failure(format!("Could not store the uploaded image: {}", e))
        })?;

        let extension = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin");
        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.root.join(file_name);

        tokio::fs::write(&path, bytes).await.map_err(|e| {
            ApiError::persistence_failure(format!("Could not store the uploaded image: {}", e))
        })?;

        Ok(path.to_string_lossy().into_owned())
    }

    /// Best-effort removal of a stored image; failure is logged only
    pub async fn discard(&self, stored_path: &str) {
        if let Err(e) = tokio::fs::remove_file(stored_path).await {
            tracing::warn!(path = stored_path, error = %e, "Failed to remove stored image");
        }
    }
}
