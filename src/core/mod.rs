//! Core types & traits: domain-agnostic contracts for tools and protocol.

pub mod content;
pub mod error;
pub mod fetch;
pub mod mcp;
pub mod params;
pub mod schema;
pub mod tool;
