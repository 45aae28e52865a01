use axum::{
    routing::{any_service, get, post},
    Router,
};
use std::sync::Arc;

use crate::api::dispatch::Dispatcher;
use crate::infra::mcp::WeatherSvc;
use crate::infra::runtime::mcp_transport::{make_streamable_http_service, LocalSessionManager};

/// `/healthz` + streamable MCP at `/mcp`.
pub fn build_app_default(dispatcher: Dispatcher) -> Router {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let factory = move || WeatherSvc::new(dispatcher.clone());
    let mcp_service = make_streamable_http_service(factory, session_mgr);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route_service("/mcp", any_service(mcp_service))
}

/// Default app **plus** the plain JSON-RPC route at `/rpc`.
pub fn build_app_with_rpc(dispatcher: Dispatcher) -> Router {
    build_app_default(dispatcher.clone()).merge(
        Router::new()
            .route("/rpc", post(crate::api::mcp::http))
            .with_state(dispatcher),
    )
}

pub fn build_app(dispatcher: Dispatcher, deprecate_rest: bool) -> Router {
    if deprecate_rest {
        build_app_default(dispatcher)
    } else {
        build_app_with_rpc(dispatcher)
    }
}
