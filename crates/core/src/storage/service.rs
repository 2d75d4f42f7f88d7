//! File stager implementation using Apache OpenDAL.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::Utc;
use opendal::{ErrorKind, Operator, services};
use tracing::debug;
use uuid::Uuid;

use super::config::StagingConfig;
use super::error::StorageError;

/// An uploaded attachment written to the staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Filename as sent by the client.
    pub original_name: String,
    /// Key of the file relative to the staging root.
    pub storage_key: String,
    /// Absolute path of the staged file.
    pub storage_path: PathBuf,
    /// File size in bytes.
    pub size: u64,
}

/// Writes uploaded attachments to the staging directory and removes them
/// once the email has been dispatched.
pub struct FileStager {
    operator: Operator,
    root: PathBuf,
    config: StagingConfig,
}

impl FileStager {
    /// Create a new file stager from configuration.
    ///
    /// The staging directory is created on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory path is unusable.
    pub fn from_config(config: StagingConfig) -> Result<Self, StorageError> {
        let root = std::path::absolute(&config.root).map_err(|e| {
            StorageError::configuration(format!(
                "invalid upload directory {}: {e}",
                config.root.display()
            ))
        })?;
        let operator = Self::create_operator(&root)?;
        Ok(Self {
            operator,
            root,
            config,
        })
    }

    /// Create OpenDAL operator rooted at the staging directory.
    fn create_operator(root: &Path) -> Result<Operator, StorageError> {
        let builder = services::Fs::default().root(
            root.to_str()
                .ok_or_else(|| StorageError::configuration("invalid path"))?,
        );

        Ok(Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish())
    }

    /// Validate an attachment size against the configured maximum.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is too large.
    pub fn validate_size(&self, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }
        Ok(())
    }

    /// Generate the staging key for an uploaded file.
    ///
    /// Format: `{unix_millis}-{random}-{sanitized_filename}`
    #[must_use]
    pub fn generate_storage_key(original_name: &str) -> String {
        let mut sanitized = sanitize_filename(original_name);
        if sanitized.is_empty() {
            sanitized.push_str("attachment");
        }
        let nonce = Uuid::new_v4().simple().to_string();

        format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            &nonce[..8],
            sanitized
        )
    }

    /// Write an uploaded attachment to the staging directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is too large, the directory cannot be
    /// created, or the write fails.
    pub async fn stage(&self, data: Bytes, original_name: &str) -> Result<StagedFile, StorageError> {
        let size = u64::try_from(data.len()).unwrap_or(u64::MAX);
        self.validate_size(size)?;

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            StorageError::operation(format!(
                "failed to create upload directory {}: {e}",
                self.root.display()
            ))
        })?;

        let storage_key = Self::generate_storage_key(original_name);
        self.operator
            .write(&storage_key, data)
            .await
            .map_err(StorageError::from)?;

        debug!(key = %storage_key, size, "Attachment staged");

        Ok(StagedFile {
            original_name: original_name.to_string(),
            storage_path: self.root.join(&storage_key),
            storage_key,
            size,
        })
    }

    /// Remove a staged file.
    ///
    /// A file that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails for any reason other than the
    /// file not existing.
    pub async fn discard(&self, file: &StagedFile) -> Result<(), StorageError> {
        match self.operator.delete(&file.storage_key).await {
            Ok(()) => {
                debug!(key = %file.storage_key, "Staged attachment removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    /// Check if a staged file still exists.
    pub async fn exists(&self, file: &StagedFile) -> bool {
        self.operator.stat(&file.storage_key).await.is_ok()
    }

    /// Get the absolute staging directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Sanitize filename for the staging key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores,
/// so a client-supplied name can never escape the staging directory.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn stager_in(dir: &TempDir) -> FileStager {
        FileStager::from_config(StagingConfig::new(dir.path().join("uploads")))
            .expect("should create stager")
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("notes.txt"), "notes.txt");
        assert_eq!(sanitize_filename("my file (1).pdf"), "my_file__1_.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("日本語.pdf"), "___.pdf");
    }

    #[test]
    fn test_generate_storage_key_format() {
        let key = FileStager::generate_storage_key("notes.txt");
        let parts: Vec<&str> = key.splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].parse::<i64>().is_ok());
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2], "notes.txt");
    }

    #[test]
    fn test_generate_storage_key_empty_name() {
        let key = FileStager::generate_storage_key("");
        assert!(key.ends_with("-attachment"));
    }

    #[test]
    fn test_generate_storage_key_unique() {
        let first = FileStager::generate_storage_key("notes.txt");
        let second = FileStager::generate_storage_key("notes.txt");
        assert_ne!(first, second);
    }

    #[test]
    fn test_validate_size() {
        let dir = TempDir::new().expect("tempdir");
        let config = StagingConfig::new(dir.path()).with_max_file_size(1024);
        let stager = FileStager::from_config(config).expect("should create stager");

        assert!(stager.validate_size(1024).is_ok());
        let err = stager.validate_size(1025).unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { size: 1025, max: 1024 }));
    }

    #[tokio::test]
    async fn test_stage_writes_file() {
        let dir = TempDir::new().expect("tempdir");
        let stager = stager_in(&dir);

        let staged = stager
            .stage(Bytes::from_static(b"0123456789"), "notes.txt")
            .await
            .expect("should stage");

        assert_eq!(staged.original_name, "notes.txt");
        assert_eq!(staged.size, 10);
        assert!(staged.storage_path.starts_with(stager.root()));
        assert!(staged.storage_key.ends_with("-notes.txt"));
        let content = std::fs::read(&staged.storage_path).expect("staged file readable");
        assert_eq!(content, b"0123456789");
        assert!(stager.exists(&staged).await);
    }

    #[tokio::test]
    async fn test_stage_recreates_missing_directory() {
        let dir = TempDir::new().expect("tempdir");
        let stager = stager_in(&dir);
        let _ = std::fs::remove_dir_all(stager.root());

        let staged = stager
            .stage(Bytes::from_static(b"data"), "a.bin")
            .await
            .expect("should stage");
        assert!(staged.storage_path.exists());
    }

    #[tokio::test]
    async fn test_stage_rejects_oversized_file() {
        let dir = TempDir::new().expect("tempdir");
        let config = StagingConfig::new(dir.path()).with_max_file_size(4);
        let stager = FileStager::from_config(config).expect("should create stager");

        let err = stager
            .stage(Bytes::from_static(b"too big"), "big.bin")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    #[tokio::test]
    async fn test_stage_then_discard_leaves_no_file() {
        let dir = TempDir::new().expect("tempdir");
        let stager = stager_in(&dir);

        let staged = stager
            .stage(Bytes::from_static(b"0123456789"), "notes.txt")
            .await
            .expect("should stage");
        stager.discard(&staged).await.expect("should discard");

        assert!(!staged.storage_path.exists());
        assert!(!stager.exists(&staged).await);
    }

    #[tokio::test]
    async fn test_discard_twice_is_noop() {
        let dir = TempDir::new().expect("tempdir");
        let stager = stager_in(&dir);

        let staged = stager
            .stage(Bytes::from_static(b"x"), "x.txt")
            .await
            .expect("should stage");
        stager.discard(&staged).await.expect("first discard");
        stager.discard(&staged).await.expect("second discard");
    }

    #[tokio::test]
    async fn test_concurrent_stages_do_not_collide() {
        let dir = TempDir::new().expect("tempdir");
        let stager = stager_in(&dir);

        let (first, second) = tokio::join!(
            stager.stage(Bytes::from_static(b"first"), "same.txt"),
            stager.stage(Bytes::from_static(b"second"), "same.txt"),
        );
        let first = first.expect("first stage");
        let second = second.expect("second stage");

        assert_ne!(first.storage_path, second.storage_path);
        assert_eq!(std::fs::read(&first.storage_path).unwrap(), b"first");
        assert_eq!(std::fs::read(&second.storage_path).unwrap(), b"second");
    }
}
