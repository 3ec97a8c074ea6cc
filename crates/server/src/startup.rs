use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::{init_logging, LogFormat};
use configs::AppConfig;
use dotenvy::dotenv;
use service::crud::Variant;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Bind address from the normalized server section.
pub fn load_bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Resolve the configured variant name.
pub fn resolve_variant(cfg: &AppConfig) -> Result<Variant, StartupError> {
    cfg.crud
        .variant
        .parse::<Variant>()
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))
}

/// Build the router described by `cfg`, with a fresh store.
pub fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let variant = resolve_variant(cfg)?;
    let state = ServerState::for_variant(variant, cfg.crud.seed_demo_records);
    Ok(routes::build_router(state, build_cors()))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_or_env()?;
    let format = cfg.log.format.parse::<LogFormat>().unwrap_or_else(|e| {
        eprintln!("{e}; falling back to compact logs");
        LogFormat::Compact
    });
    init_logging(format);

    let variant = resolve_variant(&cfg)?;
    if cfg.crud.seed_demo_records && variant.resource() == service::crud::Resource::Items {
        warn!(%variant, "seed_demo_records only applies to users tiers; ignoring");
    }
    let app = build_app(&cfg)?;

    // Bind and serve
    let addr = load_bind_addr(&cfg)?;
    info!(%addr, %variant, "starting crud server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_variant_is_a_config_error() {
        let mut cfg = AppConfig::default();
        cfg.crud.variant = "orders-basic".into();
        assert!(matches!(resolve_variant(&cfg), Err(StartupError::InvalidConfig(_))));
        assert!(build_app(&cfg).is_err());
    }

    #[test]
    fn default_config_serves_items_advanced_on_8080() -> anyhow::Result<()> {
        let cfg = AppConfig::default();
        assert_eq!(resolve_variant(&cfg)?, Variant::ItemsAdvanced);
        assert_eq!(load_bind_addr(&cfg)?.port(), 8080);
        Ok(())
    }
}
