//! Application configuration management.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

/// Environment variables that predate the `RELAY__` naming scheme.
///
/// Each entry maps a configuration key to the variable that overrides it.
const LEGACY_ENV_OVERRIDES: [(&str, &str); 4] = [
    ("server.port", "PORT"),
    ("smtp.username", "EMAIL_USER"),
    ("smtp.password", "EMAIL_PASS"),
    ("mail.recipient", "EMAIL_RECEIVER"),
];

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Outbound SMTP transport configuration.
    pub smtp: SmtpConfig,
    /// Message composition settings.
    pub mail: MailConfig,
    /// Attachment staging configuration.
    #[serde(default)]
    pub uploads: UploadConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    #[serde(
        default = "default_cors_origins",
        deserialize_with = "deserialize_origins"
    )]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

/// Accepts either a list or a comma-separated string, so origins can be
/// given through a single environment variable.
fn deserialize_origins<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Origins {
        List(Vec<String>),
        Csv(String),
    }

    let origins = match Origins::deserialize(deserializer)? {
        Origins::List(list) => list,
        Origins::Csv(csv) => csv.split(',').map(str::to_string).collect(),
    };

    Ok(origins
        .into_iter()
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect())
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Implicit TLS from the first byte (port 465).
    #[default]
    Tls,
    /// Plaintext connection upgraded with STARTTLS (port 587).
    Starttls,
    /// No encryption. Only for local mail catchers.
    None,
}

/// Outbound SMTP transport configuration.
#[derive(Clone, Deserialize)]
pub struct SmtpConfig {
    /// SMTP server host.
    #[serde(default = "default_smtp_host")]
    pub host: String,
    /// SMTP server port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Account used to authenticate with the server.
    pub username: String,
    /// Password or app password for `username`.
    pub password: String,
    /// Connection security mode.
    #[serde(default)]
    pub security: SmtpSecurity,
    /// Upper bound on a single dispatch, in seconds.
    #[serde(default = "default_smtp_timeout")]
    pub timeout_secs: u64,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_smtp_timeout() -> u64 {
    30
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("security", &self.security)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Message composition settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// The single address every submission is delivered to.
    pub recipient: String,
    /// Sender used when a submission carries no email address.
    ///
    /// Falls back to `smtp.username` when left empty.
    #[serde(default)]
    pub default_sender: String,
    /// Name shown in the subject line and HTML heading.
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// Escape HTML-sensitive characters in the HTML body.
    #[serde(default)]
    pub escape_html: bool,
}

fn default_site_name() -> String {
    "Sunny's Bottles".to_string()
}

/// Attachment staging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory attachments are staged in until the email is sent.
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,
    /// Maximum attachment size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl UploadConfig {
    /// Default max file size: 25MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

    /// Room left in the request body for the text fields and multipart framing.
    pub const FORM_OVERHEAD: u64 = 1024 * 1024;

    /// Maximum accepted request body size in bytes.
    #[must_use]
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.max_file_size.saturating_add(Self::FORM_OVERHEAD))
            .unwrap_or(usize::MAX)
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_file_size() -> u64 {
    UploadConfig::DEFAULT_MAX_FILE_SIZE
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, lowest precedence first: `config/default`, `config/{RUN_MODE}`,
    /// `RELAY__*` environment variables, then the legacy `PORT`, `EMAIL_USER`,
    /// `EMAIL_PASS` and `EMAIL_RECEIVER` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or a required value
    /// (SMTP credentials, recipient) is missing.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("RELAY").separator("__"));

        for (key, var) in LEGACY_ENV_OVERRIDES {
            builder = builder.set_override_option(key, std::env::var(var).ok())?;
        }

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.resolve_defaults();
        Ok(config)
    }

    fn resolve_defaults(&mut self) {
        if self.mail.default_sender.trim().is_empty() {
            self.mail.default_sender.clone_from(&self.smtp.username);
        }
    }
}
