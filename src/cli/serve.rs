use crate::core::config::AppConfig;
use crate::server;
use crate::service::QuoteService;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Runs the HTTP API. `bind` overrides the configured address.
pub async fn run(config: &AppConfig, bind: Option<&str>) -> Result<()> {
    let bind = bind.unwrap_or(&config.server.bind);
    info!(
        ttl_seconds = config.cache.ttl_seconds,
        quote_currency = %config.quote_currency,
        "Starting quote server"
    );

    let service = Arc::new(QuoteService::from_config(config));
    server::serve(bind, service).await
}
