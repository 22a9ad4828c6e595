//! Tool trait and registry shared by the MCP bridge and the HTTP API.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              ToolRegistry                │
//! │   get_school_meal        find_school     │
//! └──────────────┬───────────────────────────┘
//!                ▼
//!        McpBridge (stdio / streamable HTTP)
//!        run_server() → POST /tools/{name}
//! ```
//!
//! Both front ends validate arguments with [`validate_params`] before
//! calling [`Tool::execute`]. Validation failures are [`InputError`]s,
//! which each front end turns into a `bad_request` payload instead of a
//! generic tool failure.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use school_meal_core::MealService;

// ═══════════════════════════════════════════════════════════════════════
// Input errors
// ═══════════════════════════════════════════════════════════════════════

/// A tool call whose arguments were rejected before execution.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("missing required parameter: {0}")]
    MissingParameter(String),
    #[error("parameter '{name}' must be of type '{expected}', got {actual}")]
    WrongType {
        name: String,
        expected: String,
        actual: &'static str,
    },
    #[error("{0} must not be empty")]
    Empty(String),
    #[error("tool arguments must be a JSON object")]
    NotAnObject,
}

impl InputError {
    /// The structured error body returned to callers.
    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "error": {
                "code": "bad_request",
                "message": self.to_string(),
            }
        })
    }
}

/// Check `params` against a tool's JSON schema and fill in defaults.
///
/// Only what the built-in tools declare is enforced: required keys,
/// primitive `type`, and `default` injection for absent keys.
pub fn validate_params(schema: &Value, params: &Value) -> Result<Value, InputError> {
    let params_obj = match params {
        Value::Object(map) => map.clone(),
        Value::Null => serde_json::Map::new(),
        _ => return Err(InputError::NotAnObject),
    };

    let properties = schema
        .get("properties")
        .and_then(|p| p.as_object())
        .cloned()
        .unwrap_or_default();

    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for field in required.iter().filter_map(|v| v.as_str()) {
            if !params_obj.contains_key(field) {
                return Err(InputError::MissingParameter(field.to_string()));
            }
        }
    }

    let mut result = params_obj.clone();
    for (prop_name, prop_schema) in &properties {
        match params_obj.get(prop_name) {
            Some(value) => {
                if let Some(expected) = prop_schema.get("type").and_then(|t| t.as_str()) {
                    let type_ok = match expected {
                        "string" => value.is_string(),
                        "integer" => value.is_i64() || value.is_u64(),
                        "number" => value.is_number(),
                        "boolean" => value.is_boolean(),
                        "array" => value.is_array(),
                        "object" => value.is_object(),
                        _ => true,
                    };
                    if !type_ok {
                        return Err(InputError::WrongType {
                            name: prop_name.clone(),
                            expected: expected.to_string(),
                            actual: json_type_name(value),
                        });
                    }
                }
            }
            None => {
                if let Some(default) = prop_schema.get("default") {
                    result.insert(prop_name.clone(), default.clone());
                }
            }
        }
    }

    Ok(Value::Object(result))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a required, non-blank string argument.
fn required_text<'a>(params: &'a Value, field: &str) -> Result<&'a str, InputError> {
    let value = params
        .get(field)
        .ok_or_else(|| InputError::MissingParameter(field.to_string()))?;
    let text = value.as_str().ok_or_else(|| InputError::WrongType {
        name: field.to_string(),
        expected: "string".to_string(),
        actual: json_type_name(value),
    })?;
    if text.trim().is_empty() {
        return Err(InputError::Empty(field.to_string()));
    }
    Ok(text)
}

// ═══════════════════════════════════════════════════════════════════════
// Tool Trait
// ═══════════════════════════════════════════════════════════════════════

/// A callable tool exposed over MCP and `POST /tools/{name}`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name used for dispatch.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn parameters_schema(&self) -> Value;

    /// Run the tool on already-validated arguments.
    ///
    /// A `Value::String` result is delivered to MCP clients as plain text;
    /// anything else is serialized as JSON.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value>;
}

/// Shared state handed to every tool call.
#[derive(Clone)]
pub struct ToolContext {
    service: Arc<MealService>,
}

impl ToolContext {
    pub fn new(service: Arc<MealService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &MealService {
        &self.service
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Tools
// ═══════════════════════════════════════════════════════════════════════

/// `get_school_meal`: the meal report for a school name and date.
pub struct MealTool;

#[async_trait]
impl Tool for MealTool {
    fn name(&self) -> &str {
        "get_school_meal"
    }

    fn description(&self) -> &str {
        "Look up a Korean school's meal menu by school name. Schools sharing \
         the name in different regions are all reported."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "school_name": {
                    "type": "string",
                    "description": "Full school name, e.g. 서울고등학교"
                },
                "date": {
                    "type": "string",
                    "description": "YYYYMMDD, or 오늘/내일/어제/모레 (today/tomorrow/yesterday/day-after-tomorrow)",
                    "default": "오늘"
                }
            },
            "required": ["school_name"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let school_name = required_text(&params, "school_name")?;
        let date = params.get("date").and_then(|d| d.as_str());

        let text = ctx.service().meal_info(school_name, date).await;
        Ok(Value::String(text))
    }
}

/// `find_school`: resolve a name without fetching meals.
pub struct FindSchoolTool;

#[async_trait]
impl Tool for FindSchoolTool {
    fn name(&self) -> &str {
        "find_school"
    }

    fn description(&self) -> &str {
        "Resolve a school name to every matching school (office and school codes), \
         or similar names when nothing matches"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "school_name": { "type": "string", "description": "Full school name" }
            },
            "required": ["school_name"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let school_name = required_text(&params, "school_name")?;
        let resolution = ctx.service().resolve(school_name);
        Ok(serde_json::to_value(&resolution)?)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════

/// Ordered collection of tools.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Registry with `get_school_meal` and `find_school`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MealTool));
        registry.register(Box::new(FindSchoolTool));
        registry
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
