//! HTTP server: tool API, plain-text meal endpoint, and MCP over
//! streamable HTTP.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version and school count) |
//! | `GET`  | `/tools/list` | List registered tools with schemas |
//! | `POST` | `/tools/{name}` | Call a tool by name |
//! | `GET`  | `/api/meals?school=..&date=..` | Meal report as `text/plain` |
//! | `*`    | `/mcp` | MCP streamable HTTP transport |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "school_name must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `tool_error` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use school_meal_core::MealService;

use crate::config::Config;
use crate::mcp::{streamable_http_service, McpBridge};
use crate::traits::{validate_params, InputError, ToolContext, ToolRegistry};

/// Shared state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    service: Arc<MealService>,
    tools: Arc<ToolRegistry>,
}

/// Build the full router for `service`.
///
/// Exposed separately from [`run_server`] so tests can serve it on an
/// ephemeral port.
pub fn router(service: Arc<MealService>) -> Router {
    let tools = Arc::new(ToolRegistry::with_builtins());
    let bridge = McpBridge::new(service.clone(), tools.clone());

    let state = AppState { service, tools };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/tools/list", get(handle_list_tools))
        .route("/tools/{name}", post(handle_tool_call))
        .route("/api/meals", get(handle_meals))
        .nest_service("/mcp", streamable_http_service(bridge))
        .layer(cors)
        .with_state(state)
}

/// Bind to `[server].bind` and serve until Ctrl-C.
pub async fn run_server(config: &Config, service: Arc<MealService>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "HTTP server listening (MCP at /mcp)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        bad_request(err.to_string())
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn tool_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "tool_error".to_string(),
        message: message.into(),
    }
}

/// Input errors raised inside a tool are client errors; anything else is
/// a tool failure.
fn classify_tool_error(tool_name: &str, err: anyhow::Error) -> AppError {
    match err.downcast_ref::<InputError>() {
        Some(input) => bad_request(input.to_string()),
        None => tool_error(format!("{}: {:#}", tool_name, err)),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    schools: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schools: state.service.index().len(),
    })
}

// ============ GET /tools/list ============

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Serialize)]
struct ToolListResponse {
    tools: Vec<ToolInfo>,
}

async fn handle_list_tools(State(state): State<AppState>) -> Json<ToolListResponse> {
    let tools = state
        .tools
        .tools()
        .iter()
        .map(|t| ToolInfo {
            name: t.name().to_string(),
            description: t.description().to_string(),
            parameters: t.parameters_schema(),
        })
        .collect();
    Json(ToolListResponse { tools })
}

// ============ POST /tools/{name} ============

/// Returns `404` for unknown tools, `400` for argument errors or a body
/// that is not JSON, and `500` when the tool itself fails. The result is
/// wrapped as `{"result": ...}`.
async fn handle_tool_call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(params) = body.map_err(|rejection| bad_request(rejection.body_text()))?;

    let tool = state
        .tools
        .find(&name)
        .ok_or_else(|| not_found(format!("no tool registered with name: {}", name)))?;

    let validated = validate_params(&tool.parameters_schema(), &params)?;

    let ctx = ToolContext::new(state.service.clone());
    let result = tool
        .execute(validated, &ctx)
        .await
        .map_err(|e| classify_tool_error(&name, e))?;

    Ok(Json(serde_json::json!({ "result": result })))
}

// ============ GET /api/meals ============

#[derive(Deserialize)]
struct MealQuery {
    school: Option<String>,
    date: Option<String>,
}

async fn handle_meals(
    State(state): State<AppState>,
    Query(query): Query<MealQuery>,
) -> Result<Response, AppError> {
    let school = query.school.unwrap_or_default();
    if school.trim().is_empty() {
        return Err(InputError::Empty("school".to_string()).into());
    }

    let text = state
        .service
        .meal_info(&school, query.date.as_deref())
        .await;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    )
        .into_response())
}
