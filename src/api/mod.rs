pub mod dispatch;
pub mod mcp;
