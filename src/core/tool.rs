use async_trait::async_trait;
use serde::Deserialize;

use crate::core::content::ToolResponse;
use crate::core::error::ToolError;
use crate::core::schema::{InputSchema, ToolConfig};

/// Raw or normalized tool arguments.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Static identity every tool must expose.
pub trait ToolSpec {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> InputSchema;

    /// What `tools/list` advertises.
    fn tool_config(&self) -> ToolConfig {
        ToolConfig {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolRequest {
    #[serde(default)]
    pub params: Params,
}

impl ToolRequest {
    pub fn new(params: Params) -> Self {
        Self { params }
    }
}

/// Tool = Spec + validation + workflow. `handle_request` is the uniform
/// entry point and is not meant to be overridden.
#[async_trait]
pub trait Tool: ToolSpec + Send + Sync {
    /// Apply defaults and check every field, or fail with
    /// [`ToolError::Validation`].
    fn validate_with_defaults(&self, params: &Params) -> Result<Params, ToolError>;

    /// Domain logic over already-validated params.
    async fn process_tool_workflow(&self, params: Params) -> Result<ToolResponse, ToolError>;

    async fn handle_request(&self, request: ToolRequest) -> Result<ToolResponse, ToolError> {
        let params = match self.validate_with_defaults(&request.params) {
            Ok(params) => params,
            Err(ToolError::Validation(e)) => {
                tracing::debug!(tool = self.name(), reason = %e, "tool input rejected");
                return Ok(ToolResponse::text(e.message()));
            }
            Err(other) => return Err(other),
        };
        self.process_tool_workflow(params).await
    }
}
