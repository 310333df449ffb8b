use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sitelens::api::{create_api_router, AuthService};
use sitelens::config::Config;
use sitelens::tool::registry_from_config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sitelens=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration for {}", config.backend.site_id);

    // Credentials, backend, pipeline and cache behind the tool registry
    let registry = Arc::new(registry_from_config(&config)?);
    info!(
        "Analytics results cached for {}s, at most {} rows per query",
        config.cache.ttl_secs, config.query.max_limit
    );

    let auth_service = Arc::new(AuthService::new(config.api_server.api_keys.clone()));
    if auth_service.is_enabled() {
        info!("🔐 Tool routes require an X-API-Key header");
    } else {
        info!("🔓 API key check is disabled - all tool requests are allowed");
    }

    let api_router = create_api_router(registry, auth_service);

    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("🚀 Tool server listening on http://{}", api_addr);
    info!("   - Tool schemas at http://{}/tools", api_addr);

    axum::serve(api_listener, api_router).await?;

    Ok(())
}
