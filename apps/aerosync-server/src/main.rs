//! AeroSync Server
//!
//! Compares sections of two PDF manuals and audits operator documentation
//! against ISARP checklist text. Provides REST API endpoints for:
//!
//! - Document upload and section extraction (outline + header scan)
//! - TF-IDF cosine similarity between selected sections
//! - LLM-backed compliance audit reports
//!
//! ## Architecture
//!
//! This server is the backend for the slim AeroSync frontend, providing:
//!
//! - Rate limiting via tower-governor
//! - In-memory document slots (no persistence)
//! - A swappable audit backend behind the `AuditService` trait

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod state;
#[cfg(test)]
mod tests;

use aerosync_core::HeaderScanner;
use audit_engine::{AuditConfig, AuditService, OpenAiAuditor};

use api::{
    handle_audit, handle_compare, handle_get_section, handle_health, handle_list_sections,
    handle_upload_document,
};
use state::AppState;

/// Command-line arguments for the AeroSync server
#[derive(Parser, Debug)]
#[command(name = "aerosync-server")]
#[command(about = "AeroSync server for manual comparison and compliance auditing")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Directory uploaded documents are written to
    #[arg(long, default_value = "uploads")]
    upload_dir: PathBuf,

    /// Path to the secrets file holding the OpenAI API key
    #[arg(long, default_value = "secrets.toml")]
    secrets: PathBuf,

    /// Literal prefix for in-page section headers (e.g. "ORG 1.1.1")
    #[arg(long, default_value = "ORG")]
    header_prefix: String,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Build the application router.
pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/documents/:slot", post(handle_upload_document))
        .route("/api/documents/:slot/sections", get(handle_list_sections))
        .route(
            "/api/documents/:slot/sections/:title",
            get(handle_get_section),
        )
        .route("/api/compare", post(handle_compare))
        .route("/api/audit", post(handle_audit))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AeroSync server on {}:{}", args.host, args.port);

    std::fs::create_dir_all(&args.upload_dir)?;

    let scanner = HeaderScanner::new(&args.header_prefix)?;

    // The audit backend is optional; without a key the rest of the tool
    // (upload, sections, compare) still works
    let audit: Option<Arc<dyn AuditService>> = match AuditConfig::load(&args.secrets) {
        Ok(config) => Some(Arc::new(OpenAiAuditor::new(config)?)),
        Err(e) => {
            warn!("Audit disabled: {:#}", e);
            None
        }
    };

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .expect("Failed to create rate limiter config"),
    );

    // Create shared state
    let state = AppState::new(audit, args.upload_dir.clone(), scanner);

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with middleware
    let app = router(state)
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Upload directory: {}", args.upload_dir.display());
    info!("Header prefix: {}", args.header_prefix);

    axum::serve(listener, app).await?;

    Ok(())
}
