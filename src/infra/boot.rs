use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::dispatch::Dispatcher;
use crate::infra::config::Config;
use crate::tools::registry::ToolRegistry;

/// Load config, discover tools, then serve on the configured transport.
pub async fn run_server() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    tracing::info!(
        mode = %cfg.mode,
        port = cfg.port,
        deprecate_rest = cfg.deprecate_rest,
        "BOOT weather-mcp-gateway"
    );
    if let Err(e) = cfg.weather.identity.user_agent_header_text() {
        // tools still list; every weather call will fail with this until it is set
        tracing::warn!(error = %e, "weather API identification is not configured");
    }

    let dispatcher = load_dispatcher(&cfg).await?;

    if cfg.mode == "stdio" {
        crate::infra::runtime::mcp_transport::serve_stdio(crate::infra::mcp::WeatherSvc::new(dispatcher))
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }

    let app = crate::infra::http_app::build_app(dispatcher, cfg.deprecate_rest);
    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    tracing::info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

/// Registry for `cfg`, loaded, behind a dispatcher.
pub async fn load_dispatcher(cfg: &Config) -> anyhow::Result<Dispatcher> {
    let registry = Arc::new(ToolRegistry::from_config(cfg));
    registry.load_tools().await?;
    Ok(Dispatcher::new(registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn app_factory_selects_server_by_default() {
        std::env::remove_var("MODE");
        let cfg = Config::from_env();
        assert_eq!(cfg.mode, "server");
    }

    #[tokio::test]
    async fn load_dispatcher_honors_disabled_tools() {
        let cfg = Config { disabled_tools: vec!["get_hourly_forecast".into()], ..Config::default() };
        let d = load_dispatcher(&cfg).await.unwrap();
        let names: Vec<String> = d.list_tools().unwrap().tools.into_iter().map(|t| t.name).collect();
        assert_eq!(names.len(), 4);
        assert!(!names.iter().any(|n| n == "get_hourly_forecast"));
        let map = d.registry().get_tools_sync().unwrap();
        assert!(map["get_hourly_forecast"].is_none());
    }
}
