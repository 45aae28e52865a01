//! `list_tools` / `call_tool` over a loaded [`ToolRegistry`]. Both
//! transports (the rmcp handler and the `/rpc` shim) go through here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::content::ToolResponse;
use crate::core::error::ToolError;
use crate::core::schema::ToolConfig;
use crate::core::tool::{Params, ToolRequest};
use crate::tools::registry::{RegistryError, ToolRegistry};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Tool \"{0}\" not found or no arguments provided.")]
    NotFound(String),

    #[error("Tool \"{0}\" is not instantiated.")]
    NotInstantiated(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolList {
    pub tools: Vec<ToolConfig>,
}

/// `tools/call` params; `arguments` absent and `arguments: null` are the same.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallToolParams {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Params>,
}

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Instantiated tools in registry order.
    pub fn list_tools(&self) -> Result<ToolList, DispatchError> {
        let tools = self
            .registry
            .get_tools_sync()?
            .values()
            .flatten()
            .map(|tool| tool.tool_config())
            .collect();
        Ok(ToolList { tools })
    }

    pub async fn call_tool(&self, name: &str, arguments: Option<Params>) -> Result<ToolResponse, DispatchError> {
        let tools = self.registry.get_tools_sync()?;
        let (Some(slot), Some(params)) = (tools.get(name), arguments) else {
            return Err(DispatchError::NotFound(name.to_string()));
        };
        let tool = slot
            .as_ref()
            .ok_or_else(|| DispatchError::NotInstantiated(name.to_string()))?;
        tracing::debug!(tool = name, "dispatching tool call");
        Ok(tool.handle_request(ToolRequest::new(params)).await?)
    }

    pub async fn call(&self, params: CallToolParams) -> Result<ToolResponse, DispatchError> {
        self.call_tool(&params.name, params.arguments).await
    }
}
