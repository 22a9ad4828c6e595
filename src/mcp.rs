//! MCP JSON-RPC protocol bridge.
//!
//! Exposes the [`ToolRegistry`] as MCP tools via `list_tools` /
//! `call_tool`, over either transport:
//!
//! * **stdio**: `schoolmeal serve stdio`, for clients that spawn the
//!   server as a subprocess.
//! * **Streamable HTTP**: mounted at `/mcp` by `schoolmeal serve http`.
//!
//! Tool results that are JSON strings (the meal report) are sent as plain
//! text content. Argument validation failures come back as error results
//! whose text is the `bad_request` JSON payload.

use std::borrow::Cow;
use std::sync::Arc;

use anyhow::Result;
use rmcp::model::*;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt};

use school_meal_core::MealService;

use crate::traits::{validate_params, InputError, ToolContext, ToolRegistry};

/// Bridges the tool registry to the MCP JSON-RPC protocol.
///
/// Each MCP session receives a clone of this struct; everything is behind
/// `Arc`, so sessions share one index and one HTTP client.
#[derive(Clone)]
pub struct McpBridge {
    service: Arc<MealService>,
    tools: Arc<ToolRegistry>,
}

impl McpBridge {
    pub fn new(service: Arc<MealService>, tools: Arc<ToolRegistry>) -> Self {
        Self { service, tools }
    }

    /// Bridge over the built-in tools.
    pub fn with_builtins(service: Arc<MealService>) -> Self {
        Self::new(service, Arc::new(ToolRegistry::with_builtins()))
    }

    /// Convert a registry tool into an rmcp `Tool` descriptor.
    fn to_mcp_tool(tool: &dyn crate::traits::Tool) -> Tool {
        let input_schema: Arc<serde_json::Map<String, serde_json::Value>> =
            match tool.parameters_schema() {
                serde_json::Value::Object(map) => Arc::new(map),
                _ => Arc::new(serde_json::Map::new()),
            };

        Tool {
            name: Cow::Owned(tool.name().to_string()),
            title: None,
            description: Some(Cow::Owned(tool.description().to_string())),
            input_schema,
            output_schema: None,
            annotations: Some(ToolAnnotations::new().read_only(true)),
            execution: None,
            icons: None,
            meta: None,
        }
    }

    /// Validate and run one tool call.
    ///
    /// Unknown tool names are protocol errors; everything else, including
    /// bad arguments and failed lookups, is an (error) tool result.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<CallToolResult, McpError> {
        let tool = self.tools.find(name).ok_or_else(|| {
            McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("no tool registered with name: {}", name),
                None,
            )
        })?;

        let params = arguments
            .map(serde_json::Value::Object)
            .unwrap_or(serde_json::Value::Object(serde_json::Map::new()));

        let params = match validate_params(&tool.parameters_schema(), &params) {
            Ok(params) => params,
            Err(e) => return Ok(input_error_result(&e)),
        };

        let ctx = ToolContext::new(self.service.clone());
        match tool.execute(params, &ctx).await {
            Ok(serde_json::Value::String(text)) => {
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Ok(result) => {
                let text = serde_json::to_string_pretty(&result).unwrap_or_default();
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(e) => match e.downcast_ref::<InputError>() {
                Some(input) => Ok(input_error_result(input)),
                None => {
                    tracing::warn!(tool = name, error = %format!("{:#}", e), "tool call failed");
                    Ok(CallToolResult::error(vec![Content::text(format!("{:#}", e))]))
                }
            },
        }
    }
}

fn input_error_result(err: &InputError) -> CallToolResult {
    tracing::debug!(error = %err, "rejected tool arguments");
    CallToolResult::error(vec![Content::text(err.to_payload().to_string())])
}

impl ServerHandler for McpBridge {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "school-meal".to_string(),
                title: Some("School Meal".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Korean school meal lookup. Use get_school_meal with a full school name \
                 and an optional date (YYYYMMDD or 오늘/내일/어제/모레). Use find_school \
                 to see which schools a name resolves to."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools: Vec<Tool> = self
            .tools
            .tools()
            .iter()
            .map(|t| Self::to_mcp_tool(t.as_ref()))
            .collect();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tools.find(name).map(Self::to_mcp_tool)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(&request.name, request.arguments).await
    }
}

/// Serve MCP over stdin/stdout until the client disconnects.
pub async fn serve_stdio(service: Arc<MealService>) -> Result<()> {
    let bridge = McpBridge::with_builtins(service);
    tracing::info!("MCP server ready on stdio");

    let running = bridge.serve(rmcp::transport::stdio()).await?;
    let reason = running.waiting().await?;
    tracing::info!(?reason, "MCP stdio session ended");
    Ok(())
}

/// Streamable HTTP transport for mounting under an Axum router.
pub fn streamable_http_service(
    bridge: McpBridge,
) -> StreamableHttpService<McpBridge, LocalSessionManager> {
    StreamableHttpService::new(
        move || Ok(bridge.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    )
}
