//! Staging configuration types.

use std::path::PathBuf;

use relay_shared::UploadConfig;

/// Staging area configuration.
#[derive(Debug, Clone)]
pub struct StagingConfig {
    /// Directory staged attachments are written to.
    pub root: PathBuf,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
}

impl StagingConfig {
    /// Create a new staging config with default settings.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_file_size: UploadConfig::DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }
}

impl From<&UploadConfig> for StagingConfig {
    fn from(config: &UploadConfig) -> Self {
        Self::new(config.dir.clone()).with_max_file_size(config.max_file_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_config_defaults() {
        let config = StagingConfig::new("./uploads");
        assert_eq!(config.root, PathBuf::from("./uploads"));
        assert_eq!(config.max_file_size, UploadConfig::DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn test_staging_config_from_upload_config() {
        let uploads = UploadConfig {
            dir: PathBuf::from("/var/tmp/relay"),
            max_file_size: 4096,
        };
        let config = StagingConfig::from(&uploads);
        assert_eq!(config.root, PathBuf::from("/var/tmp/relay"));
        assert_eq!(config.max_file_size, 4096);
    }
}
