use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::content::{ContentBlock, ToolResponse};
use crate::core::error::{ToolError, ToolValidationError};
use crate::core::params;
use crate::core::schema::{InputSchema, SchemaType};
use crate::core::tool::{Params, Tool, ToolSpec};
use crate::tools::context::ToolContext;

pub const NAME: &str = "zip_to_coordinates";
const ZIP_CODE: &str = "zipCode";
const EXPECTED: &str = "a 5-digit US ZIP code such as \"80301\" (ZIP+4 like \"80301-1234\" is also accepted)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Args {
    zip_code: String,
}

pub struct ZipToCoordinates {
    ctx: ToolContext,
}

impl ZipToCoordinates {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    pub fn factory(ctx: &ToolContext) -> Arc<dyn Tool> {
        Arc::new(Self::new(ctx.clone()))
    }
}

fn normalize_zip(raw: &str) -> Result<String, ToolValidationError> {
    let zip = match raw.split_once('-') {
        Some((five, plus4)) if plus4.len() == 4 && plus4.chars().all(|c| c.is_ascii_digit()) => five,
        Some(_) => return Err(params::invalid(ZIP_CODE, EXPECTED)),
        None => raw,
    };
    if zip.len() == 5 && zip.chars().all(|c| c.is_ascii_digit()) {
        Ok(zip.to_string())
    } else {
        Err(params::invalid(ZIP_CODE, EXPECTED))
    }
}

impl ToolSpec for ZipToCoordinates {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Convert a US ZIP code into latitude and longitude. Use the result with \
         get_grid_point. Only call this with a ZIP code the user actually gave."
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::object().required(ZIP_CODE, SchemaType::String, "5-digit US ZIP code")
    }
}

#[async_trait]
impl Tool for ZipToCoordinates {
    fn validate_with_defaults(&self, params: &Params) -> Result<Params, ToolError> {
        let raw = params::required_string(params, ZIP_CODE, EXPECTED)?;
        let zip_code = normalize_zip(&raw)?;
        Ok(params::to_params(&Args { zip_code }))
    }

    async fn process_tool_workflow(&self, params: Params) -> Result<ToolResponse, ToolError> {
        let args: Args = params::from_params(params)?;
        let ua = self.ctx.user_agent_header_text()?;
        let loc = self.ctx.zippopotam().lookup(&args.zip_code, &ua).await?;
        let text = format!(
            "ZIP {} is {}, {} at latitude {}, longitude {}.",
            args.zip_code, loc.place_name, loc.state, loc.latitude, loc.longitude
        );
        Ok(ToolResponse::from_block(
            ContentBlock::text(text)
                .with_annotation("zipCode", args.zip_code)
                .with_annotation("latitude", loc.latitude)
                .with_annotation("longitude", loc.longitude),
        ))
    }
}
