//! MCP server integration (Streamable HTTP + stdio) for weather-mcp-gateway.
//!
//! The handler does not use rmcp's tool router: tools come from the
//! [`ToolRegistry`](crate::tools::registry::ToolRegistry) at runtime, so
//! `tools/list` and `tools/call` are answered through the [`Dispatcher`].
//!
//! Results are converted to rmcp wire types through their JSON form. Block
//! annotations are not MCP annotations, so they are merged into
//! `structuredContent` instead.

use serde_json::{json, Map, Value as JsonValue};

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};

use crate::api::dispatch::{DispatchError, Dispatcher};
use crate::core::content::ToolResponse;

#[derive(Clone)]
pub struct WeatherSvc {
    dispatcher: Dispatcher,
}

impl WeatherSvc {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn tool_list(&self) -> Result<ListToolsResult, McpError> {
        let list = self.dispatcher.list_tools().map_err(to_mcp_error)?;
        let value = serde_json::to_value(list).map_err(internal)?;
        serde_json::from_value(value).map_err(internal)
    }

    pub async fn call(&self, request: CallToolRequestParam) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = %request.name, "MCP tools/call");
        let out = self
            .dispatcher
            .call_tool(&request.name, request.arguments)
            .await
            .map_err(|e| {
                tracing::warn!(tool = %request.name, error = %e, "tool call failed");
                to_mcp_error(e)
            })?;
        to_call_result(out)
    }
}

fn internal(e: serde_json::Error) -> McpError {
    McpError::internal_error(e.to_string(), None)
}

fn to_mcp_error(e: DispatchError) -> McpError {
    match e {
        DispatchError::NotFound(_) => McpError::invalid_params(e.to_string(), None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

fn to_call_result(out: ToolResponse) -> Result<CallToolResult, McpError> {
    let mut structured = Map::new();
    let content: Vec<JsonValue> = out
        .content
        .into_iter()
        .map(|block| {
            if let Some(ann) = block.annotations {
                structured.extend(ann);
            }
            json!({ "type": block.kind, "text": block.text })
        })
        .collect();
    let mut result = json!({ "content": content, "isError": false });
    if !structured.is_empty() {
        result["structuredContent"] = JsonValue::Object(structured);
    }
    serde_json::from_value(result).map_err(internal)
}

fn implementation() -> Implementation {
    serde_json::from_value(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .unwrap_or_default()
}

impl ServerHandler for WeatherSvc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: implementation(),
            instructions: Some(
                "US weather from the National Weather Service. Resolve a location with \
                 zip_to_coordinates or get_grid_point first, then pass the returned \
                 gridPointUrl to the forecast and current conditions tools."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        self.tool_list()
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::content::ContentBlock;
    use crate::tools::registry::testing::fakes;
    use std::sync::Arc;

    async fn svc() -> WeatherSvc {
        let reg = fakes(&["echo", "off"]).disable(["off"]);
        reg.load_tools().await.unwrap();
        WeatherSvc::new(Dispatcher::new(Arc::new(reg)))
    }

    fn request(v: JsonValue) -> CallToolRequestParam {
        serde_json::from_value(v).unwrap()
    }

    #[tokio::test]
    async fn tool_list_uses_registry_configs() {
        let list = svc().await.tool_list().unwrap();
        let v = serde_json::to_value(&list).unwrap();
        assert_eq!(v["tools"].as_array().unwrap().len(), 1);
        assert_eq!(v["tools"][0]["name"], "echo");
        assert_eq!(v["tools"][0]["inputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn call_returns_text_content() {
        let out = svc()
            .await
            .call(request(json!({"name": "echo", "arguments": {"x": "hi"}})))
            .await
            .unwrap();
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["content"][0]["type"], "text");
        assert_eq!(v["content"][0]["text"], "hi");
        assert!(v.get("structuredContent").is_none());
    }

    #[tokio::test]
    async fn not_found_is_invalid_params() {
        let err = svc().await.call(request(json!({"name": "echo"}))).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("not found or no arguments provided"));
    }

    #[tokio::test]
    async fn not_instantiated_is_internal_error() {
        let err = svc()
            .await
            .call(request(json!({"name": "off", "arguments": {}})))
            .await
            .unwrap_err();
        assert_eq!(err.code.0, -32603);
        assert!(err.message.contains("not instantiated"));
    }

    #[test]
    fn annotations_move_to_structured_content() {
        let out = ToolResponse::from_block(
            ContentBlock::text("grid").with_annotation("gridPointUrl", "https://x/gridpoints/TOP/1,2"),
        );
        let v = serde_json::to_value(to_call_result(out).unwrap()).unwrap();
        assert_eq!(v["structuredContent"]["gridPointUrl"], "https://x/gridpoints/TOP/1,2");
        assert_eq!(v["content"][0]["text"], "grid");
    }

    #[test]
    fn server_info_advertises_tools() {
        let info = serde_json::to_value(unloaded_svc().get_info()).unwrap();
        assert_eq!(info["serverInfo"]["name"], "weather-mcp-gateway");
        assert!(info["capabilities"].get("tools").is_some());
    }

    fn unloaded_svc() -> WeatherSvc {
        WeatherSvc::new(Dispatcher::new(Arc::new(fakes(&[]))))
    }
}
