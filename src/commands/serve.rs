//! HTTP server command

use super::CommandResult;
use std::sync::Arc;
use tracing::info;
use virjoy::config::AppConfig;
use virjoy::context::CockpitContext;
use virjoy::server;

/// Build the context and serve until shutdown
pub async fn run(config: AppConfig) -> CommandResult {
    let ctx = Arc::new(CockpitContext::from_config(&config)?);
    info!(
        "Serving on {}:{} ({} profiles, default {})",
        config.server.address,
        config.server.port,
        ctx.profiles.len(),
        ctx.profiles.default_id()
    );

    let _ = server::rocket(ctx, &config.server).launch().await?;
    info!("Server stopped");
    Ok(())
}
