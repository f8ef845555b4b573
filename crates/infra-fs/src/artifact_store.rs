// Filesystem ArtifactStore Implementation
//
// Artifacts live under `<root>/<content_area>/<file_name>` and jobs record
// the root-relative path, so the root directory can move between runs.

use async_trait::async_trait;
use reportmill_core::domain::ReportFormat;
use reportmill_core::error::{AppError, Result};
use reportmill_core::port::ArtifactStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn put(&self, format: ReportFormat, file_name: &str, bytes: &[u8]) -> Result<String> {
        // File names are generated internally; reject anything that would
        // escape the content area.
        if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
            return Err(AppError::Storage(format!(
                "Invalid artifact file name: {}",
                file_name
            )));
        }

        let area = self.root.join(format.content_area());
        tokio::fs::create_dir_all(&area)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create artifact directory: {}", e)))?;

        let target = area.join(file_name);
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write artifact: {}", e)))?;

        let relative = format!("{}/{}", format.content_area(), file_name);
        debug!(path = %relative, size = bytes.len(), "Artifact stored");
        Ok(relative)
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        if Path::new(path).components().any(|c| {
            !matches!(c, std::path::Component::Normal(_))
        }) {
            return Err(AppError::Storage(format!("Invalid artifact path: {}", path)));
        }

        match tokio::fs::read(self.root.join(path)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("Artifact not found: {}", path)))
            }
            Err(e) => Err(AppError::Storage(format!("Failed to read artifact: {}", e))),
        }
    }
}
