//! Main entry point for the Carelink application.
//!
//! Boots the REST server over a fresh in-memory account directory.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{build_router, AppState};
use carelink_core::config::default_credential_from_env_value;
use carelink_core::CoreConfig;

/// Starts the Carelink REST server on the configured address
/// (default: 0.0.0.0:3000).
///
/// # Environment Variables
/// - `CARELINK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CARELINK_DEFAULT_CREDENTIAL`: placeholder credential assigned to
///   accounts created through the API (default: "changeme")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carelink=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("CARELINK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let default_credential =
        default_credential_from_env_value(std::env::var("CARELINK_DEFAULT_CREDENTIAL").ok());

    tracing::info!("++ Starting Carelink REST on {}", rest_addr);

    let cfg = Arc::new(CoreConfig::new(default_credential)?);
    let app = build_router(AppState::new(cfg));

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
