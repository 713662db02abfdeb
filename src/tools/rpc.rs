//! JSON-RPC 2.0 endpoint exposing the menu tools to MCP clients.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::MenuService;
use crate::menu::{Location, MealType};

const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

const USAGE: &str = "dining_menu\n\n\
POST JSON-RPC 2.0 requests to /mcp.\n\
Tools: get_menu {location, date?, mealType}, get_menus_range {location, mealType, days?, startDate?}\n\
Dates are M/D/YYYY.\n\
DELETE /cache drops every cached menu.\n";

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    /// `None` only when the member is absent; `"id": null` is `Some(Value::Null)`.
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

fn present<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetMenuArgs {
    location: String,
    date: Option<String>,
    meal_type: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetMenusRangeArgs {
    location: String,
    meal_type: String,
    days: Option<i64>,
    start_date: Option<String>,
}

pub fn router(service: Arc<MenuService>) -> Router {
    Router::new()
        .route("/", get(|| async { USAGE }))
        .route("/mcp", post(mcp))
        .route("/cache", delete(clear_cache))
        .with_state(service)
}

async fn mcp(State(service): State<Arc<MenuService>>, body: String) -> Response {
    let request: RpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            log::debug!("Rejecting malformed request: {e}");
            return Json(RpcResponse::error(Value::Null, PARSE_ERROR, e.to_string())).into_response();
        }
    };
    match dispatch(&service, request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn clear_cache(State(service): State<Arc<MenuService>>) -> String {
    let cache = service.cache();
    let cleared = cache.len().await;
    cache.clear().await;
    log::info!("Cleared {cleared} cached menus");
    format!("Cleared {cleared} cached menus\n")
}

/// Handles one request. Notifications (no `id`) get no response.
pub async fn dispatch(service: &MenuService, request: RpcRequest) -> Option<RpcResponse> {
    let Some(id) = request.id else {
        log::trace!("Notification {}", request.method);
        return None;
    };
    if request.jsonrpc != "2.0" {
        return Some(RpcResponse::error(id, INVALID_REQUEST, "jsonrpc must be \"2.0\""));
    }
    let response = match request.method.as_str() {
        "initialize" => RpcResponse::success(id, initialize_result()),
        "ping" => RpcResponse::success(id, json!({})),
        "tools/list" => RpcResponse::success(id, json!({ "tools": tool_definitions() })),
        "tools/call" => match call_tool(service, request.params).await {
            Ok(result) => RpcResponse::success(id, result),
            Err(message) => RpcResponse::error(id, INVALID_PARAMS, message),
        },
        method => RpcResponse::error(id, METHOD_NOT_FOUND, format!("method not found: {method}")),
    };
    Some(response)
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": { "listChanged": false } },
        "serverInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

fn tool_definitions() -> Value {
    let locations: Vec<_> = Location::names().collect();
    let meal_types: Vec<_> = MealType::ALL.iter().map(|m| m.as_str()).collect();
    let location = json!({
        "type": "string",
        "description": "The dining hall location name",
        "enum": locations,
    });
    let meal_type = json!({
        "type": "string",
        "description": "The meal type",
        "enum": meal_types,
    });
    json!([
        {
            "name": "get_menu",
            "description": "Get the menu for a specific dining hall location, date, and meal type",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "location": location,
                    "date": {
                        "type": "string",
                        "description": "Date in M/D/YYYY format (e.g., 1/15/2025). Defaults to today",
                    },
                    "mealType": meal_type,
                },
                "required": ["location", "mealType"],
            },
        },
        {
            "name": "get_menus_range",
            "description": "Get menus for multiple days for a specific dining hall location and meal type",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "location": location,
                    "mealType": meal_type,
                    "days": {
                        "type": "integer",
                        "description": "Number of days to fetch (default: 7, max: 30)",
                    },
                    "startDate": {
                        "type": "string",
                        "description": "Start date in M/D/YYYY format. Defaults to today",
                    },
                },
                "required": ["location", "mealType"],
            },
        },
    ])
}

/// `Err` is a protocol-level problem; tool failures come back as `isError` results.
async fn call_tool(service: &MenuService, params: Value) -> Result<Value, String> {
    let params: CallParams = serde_json::from_value(params).map_err(|e| e.to_string())?;
    let outcome = match params.name.as_str() {
        "get_menu" => {
            let args: GetMenuArgs = parse_args(params.arguments)?;
            service
                .get_menu(&args.location, args.date.as_deref(), &args.meal_type)
                .await
                .map(|res| json!(res))
        }
        "get_menus_range" => {
            let args: GetMenusRangeArgs = parse_args(params.arguments)?;
            service
                .get_menus_range(
                    &args.location,
                    &args.meal_type,
                    args.days,
                    args.start_date.as_deref(),
                )
                .await
                .map(|res| json!(res))
        }
        name => return Err(format!("unknown tool: {name}")),
    };
    Ok(match outcome {
        Ok(value) => json!({
            "content": [{ "type": "text", "text": value.to_string() }],
            "structuredContent": value,
            "isError": false,
        }),
        Err(e) => {
            if e.is_validation() {
                log::debug!("Tool {} rejected its arguments: {e}", params.name);
            } else {
                log::warn!("Tool {} failed: {e}", params.name);
            }
            json!({
                "content": [{ "type": "text", "text": e.to_string() }],
                "isError": true,
            })
        }
    })
}

fn parse_args<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T, String> {
    serde_json::from_value(arguments).map_err(|e| format!("invalid arguments: {e}"))
}
