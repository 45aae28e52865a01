use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value as J;

use crate::api::dispatch::{CallToolParams, Dispatcher};
use crate::core::mcp::{InitializeResult, RpcReq, RpcResp, APPLICATION_ERROR, METHOD_NOT_FOUND};
use crate::infra::http::json as http_json;

async fn call_tool(dispatcher: &Dispatcher, params: J) -> Result<J, String> {
    let params: CallToolParams = match params {
        J::Null => CallToolParams::default(),
        other => serde_json::from_value(other).map_err(|e| format!("invalid tools/call params: {e}"))?,
    };
    let out = dispatcher.call(params).await.map_err(|e| e.to_string())?;
    serde_json::to_value(out).map_err(|e| e.to_string())
}

async fn handle(dispatcher: &Dispatcher, req: RpcReq) -> RpcResp {
    let id = req.id.clone();
    match req.method.as_str() {
        "initialize" => match serde_json::to_value(InitializeResult::current()) {
            Ok(v) => http_json::ok(id, v).0,
            Err(e) => http_json::error(id, APPLICATION_ERROR, e.to_string()).0,
        },
        "shutdown" => http_json::ok(id, J::Null).0,
        "tools.list" | "tools/list" => match dispatcher.list_tools().map(serde_json::to_value) {
            Ok(Ok(v)) => http_json::ok(id, v).0,
            Ok(Err(e)) => http_json::error(id, APPLICATION_ERROR, e.to_string()).0,
            Err(e) => {
                tracing::warn!(error = %e, "tools/list failed");
                http_json::error(id, APPLICATION_ERROR, e.to_string()).0
            }
        },
        "tools.call" | "tools/call" => match call_tool(dispatcher, req.params).await {
            Ok(out) => {
                let resp = http_json::ok(id, out).0;
                tracing::trace!(response = ?resp, "tools/call ok response");
                resp
            }
            Err(e) => {
                let resp = http_json::error(id, APPLICATION_ERROR, e).0;
                tracing::warn!(response = ?resp, "tools/call error response");
                resp
            }
        },
        _ => http_json::error(id, METHOD_NOT_FOUND, format!("unknown method: {}", req.method)).0,
    }
}

/// `POST /rpc`: plain JSON-RPC over the dispatcher, one request per body.
pub async fn http(
    State(dispatcher): State<Dispatcher>,
    body: Result<Json<RpcReq>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejecting malformed JSON-RPC body");
            let resp = http_json::parse_error(format!("parse error: {rejection}"));
            return (StatusCode::BAD_REQUEST, resp).into_response();
        }
    };
    tracing::debug!(method = %req.method, id = ?req.id, "HTTP handler invoked");
    let resp = handle(&dispatcher, req).await;
    tracing::debug!(response = ?resp, "HTTP handler completed");
    Json(resp).into_response()
}
