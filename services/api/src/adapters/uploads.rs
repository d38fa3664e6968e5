//! services/api/src/adapters/uploads.rs
//!
//! Stores uploaded submission documents as plain files in a single directory.
//! Implements the `DocumentStore` port from the `core` crate.

use async_trait::async_trait;
use chrono::Utc;
use inspection_core::ports::{DocumentStore, PortError, PortResult};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct LocalUploadStore {
    dir: PathBuf,
}

impl LocalUploadStore {
    /// Opens the upload directory, creating it if it does not exist yet.
    pub async fn create(dir: impl Into<PathBuf>) -> PortResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PortError::Unexpected(format!("Cannot create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// `<unix-millis>-<random><ext>`, keeping only the extension of the client's name.
fn stored_name(original_file_name: &str) -> String {
    let ext = Path::new(original_file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}{}", Utc::now().timestamp_millis(), &suffix[..8], ext)
}

#[async_trait]
impl DocumentStore for LocalUploadStore {
    async fn store(&self, original_file_name: &str, bytes: &[u8]) -> PortResult<String> {
        let name = stored_name(original_file_name);
        tokio::fs::write(self.dir.join(&name), bytes)
            .await
            .map_err(|e| PortError::Unexpected(format!("Failed to write upload {}: {}", name, e)))?;
        info!(file = %name, size = bytes.len(), "Stored uploaded document");
        Ok(name)
    }

    async fn discard(&self, path: &str) -> PortResult<()> {
        // Only bare names produced by `store` live here.
        let name = Path::new(path)
            .file_name()
            .ok_or_else(|| PortError::NotFound(format!("Upload {}", path)))?;
        tokio::fs::remove_file(self.dir.join(name))
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PortError::NotFound(format!("Upload {}", path)),
                _ => PortError::Unexpected(format!("Failed to remove upload {}: {}", path, e)),
            })?;
        info!(file = %path, "Discarded uploaded document");
        Ok(())
    }
}
