//! Contact Relay Server
//!
//! Main entry point for the contact form relay service.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relay_api::{AppState, create_router};
use relay_core::mail::SmtpMailer;
use relay_core::storage::{FileStager, StagingConfig};
use relay_core::submission::SubmissionService;
use relay_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "contact_relay=debug,relay_api=debug,relay_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Prepare the upload staging area
    let stager = FileStager::from_config(StagingConfig::from(&config.uploads))?;
    info!(upload_dir = %stager.root().display(), "Upload staging configured");

    // Create the SMTP transport
    let mailer = SmtpMailer::from_config(&config.smtp)?;
    info!(
        smtp_host = %config.smtp.host,
        smtp_port = %config.smtp.port,
        recipient = %config.mail.recipient,
        "Email service configured"
    );
    if config.mail.default_sender.is_empty() {
        warn!("No default sender configured; submissions without an email address will fail to send");
    }

    let submissions = SubmissionService::new(
        Arc::new(stager),
        Arc::new(mailer),
        config.mail.clone(),
        Duration::from_secs(config.smtp.timeout_secs),
    );

    // Create application state
    let state = AppState {
        submissions: Arc::new(submissions),
        body_limit: config.uploads.body_limit(),
    };

    // Create router
    let app = create_router(state, &config.server.cors_origins);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down gracefully");
}
