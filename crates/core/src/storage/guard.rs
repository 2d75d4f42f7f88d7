//! Ownership guard for staged attachments.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::warn;

use super::service::{FileStager, StagedFile};

/// Holds a staged file until it is released or handed off.
///
/// Dropping an armed guard schedules removal of the file on the current
/// Tokio runtime. A request that is cancelled part way (client disconnect,
/// outer timeout) therefore does not leave its upload behind.
pub struct StagedGuard {
    stager: Arc<FileStager>,
    file: StagedFile,
    armed: bool,
}

impl StagedGuard {
    /// Take ownership of a staged file.
    #[must_use]
    pub fn new(stager: Arc<FileStager>, file: StagedFile) -> Self {
        Self {
            stager,
            file,
            armed: true,
        }
    }

    /// Hand the file off without removing it.
    ///
    /// The caller becomes responsible for its cleanup.
    #[must_use]
    pub fn disarm(mut self) -> StagedFile {
        self.armed = false;
        self.file.clone()
    }

    /// Remove the file now, logging instead of failing.
    pub async fn release(mut self) {
        self.armed = false;
        discard_logged(&self.stager, &self.file).await;
    }
}

impl Drop for StagedGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let stager = Arc::clone(&self.stager);
        let file = self.file.clone();
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    discard_logged(&stager, &file).await;
                });
            }
            Err(_) => warn!(
                path = %file.storage_path.display(),
                "No runtime available to remove staged attachment"
            ),
        }
    }
}

async fn discard_logged(stager: &FileStager, file: &StagedFile) {
    if let Err(e) = stager.discard(file).await {
        warn!(
            error = %e,
            path = %file.storage_path.display(),
            "Failed to remove staged attachment"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use bytes::Bytes;
    use tempfile::TempDir;

    use super::*;
    use crate::storage::StagingConfig;

    async fn staged(dir: &TempDir) -> (Arc<FileStager>, StagedFile) {
        let stager = Arc::new(
            FileStager::from_config(StagingConfig::new(dir.path().join("uploads")))
                .expect("should create stager"),
        );
        let file = stager
            .stage(Bytes::from_static(b"0123456789"), "notes.txt")
            .await
            .expect("should stage");
        (stager, file)
    }

    async fn wait_until_removed(path: &Path) -> bool {
        for _ in 0..100 {
            if !path.exists() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_release_removes_file() {
        let dir = TempDir::new().expect("tempdir");
        let (stager, file) = staged(&dir).await;
        let path = file.storage_path.clone();

        StagedGuard::new(stager, file).release().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_disarm_keeps_file() {
        let dir = TempDir::new().expect("tempdir");
        let (stager, file) = staged(&dir).await;

        let file = StagedGuard::new(stager, file).disarm();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(file.storage_path.exists());
    }

    #[tokio::test]
    async fn test_drop_removes_file() {
        let dir = TempDir::new().expect("tempdir");
        let (stager, file) = staged(&dir).await;
        let path = file.storage_path.clone();

        drop(StagedGuard::new(stager, file));

        assert!(wait_until_removed(&path).await);
    }
}
