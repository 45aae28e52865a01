//! Input schema and the protocol-visible tool config.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `{type: "object", properties: {name -> {type}}, required: [name]}`.
///
/// Built through [`InputSchema::required`] / [`InputSchema::optional`] so that
/// `required` can only name declared properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    kind: String,
    properties: BTreeMap<String, PropertySchema>,
    required: Vec<String>,
}

impl InputSchema {
    pub fn object() -> Self {
        Self { kind: "object".into(), properties: BTreeMap::new(), required: Vec::new() }
    }

    pub fn required(mut self, name: &str, kind: SchemaType, description: &str) -> Self {
        self = self.optional(name, kind, description);
        if !self.required.iter().any(|r| r == name) {
            self.required.push(name.to_string());
        }
        self
    }

    pub fn optional(mut self, name: &str, kind: SchemaType, description: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            PropertySchema { kind, description: Some(description.to_string()) },
        );
        self
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertySchema> {
        &self.properties
    }

    pub fn required_names(&self) -> &[String] {
        &self.required
    }

    /// Required names with no matching property. Empty for a well-formed schema.
    pub fn undeclared_required(&self) -> Vec<&str> {
        self.required
            .iter()
            .filter(|r| !self.properties.contains_key(r.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"type": "object"}))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub name: String,
    pub description: String,
    pub input_schema: InputSchema,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_json_schema_shape() {
        let s = InputSchema::object()
            .required("x", SchemaType::String, "the x")
            .optional("n", SchemaType::Integer, "count");
        let v = s.to_json();
        assert_eq!(v["type"], "object");
        assert_eq!(v["properties"]["x"]["type"], "string");
        assert_eq!(v["properties"]["n"]["type"], "integer");
        assert_eq!(v["required"], json!(["x"]));
    }

    #[test]
    fn required_is_always_declared() {
        let s = InputSchema::object()
            .required("a", SchemaType::Number, "")
            .required("a", SchemaType::Number, "");
        assert_eq!(s.required_names(), ["a".to_string()]);
        assert!(s.undeclared_required().is_empty());
    }

    #[test]
    fn deserialized_schema_can_expose_undeclared_required() {
        let s: InputSchema = serde_json::from_value(json!({
            "type": "object", "properties": {}, "required": ["ghost"]
        }))
        .unwrap();
        assert_eq!(s.undeclared_required(), vec!["ghost"]);
    }

    #[test]
    fn tool_config_uses_camel_case_input_schema() {
        let cfg = ToolConfig {
            name: "echo".into(),
            description: "d".into(),
            input_schema: InputSchema::object(),
        };
        let v = serde_json::to_value(cfg).unwrap();
        assert!(v.get("inputSchema").is_some());
    }
}
