use serde_json::{json, Value};
use tracing::debug;

use super::jsonrpc::{
    error_response, success_response, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
};
use super::tools;
use crate::server::Server;

/// Protocol versions this server speaks, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-03-26", "2024-11-05"];

/// Dispatch a JSON-RPC request to the appropriate handler.
/// Returns the response and an optional new session ID (set only for initialize).
pub fn dispatch_request(
    server: &Server,
    session_id: Option<&str>,
    request: &JsonRpcRequest,
) -> (JsonRpcResponse, Option<String>) {
    debug!(method = %request.method, session = ?session_id, "MCP request");
    let id = request.id.clone();
    match request.method.as_str() {
        "initialize" => {
            let (resp, sid) = handle_initialize(server, id, request.params.as_ref());
            (resp, Some(sid))
        }
        "ping" => (handle_ping(id), None),
        "tools/list" => (handle_tools_list(id), None),
        "tools/call" => (
            handle_tools_call(server, session_id, id, request.params.as_ref()),
            None,
        ),
        other => (
            error_response(id, METHOD_NOT_FOUND, format!("Method not found: {}", other)),
            None,
        ),
    }
}

/// Handle a JSON-RPC notification (no response expected).
pub fn handle_notification(
    server: &Server,
    session_id: Option<&str>,
    notification: &JsonRpcNotification,
) {
    match notification.method.as_str() {
        "notifications/initialized" => match session_id {
            Some(sid) if server.sessions().mark_initialized(sid) => {
                debug!(session = sid, "Session initialized");
            }
            _ => debug!(
                session = ?session_id,
                "notifications/initialized for unknown session"
            ),
        },
        "notifications/cancelled" => {
            // Every request completes synchronously; nothing to cancel.
            debug!(params = ?notification.params, "Cancellation ignored");
        }
        other => debug!(method = other, "Ignoring unknown notification"),
    }
}

fn handle_initialize(
    server: &Server,
    id: Value,
    params: Option<&Value>,
) -> (JsonRpcResponse, String) {
    let requested = params
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str());
    let mcp = &server.config().mcp;
    let protocol_version = match requested {
        Some(v) if SUPPORTED_PROTOCOL_VERSIONS.iter().any(|s| *s == v) => v.to_string(),
        _ => mcp.protocol_version.clone(),
    };
    let client_info = params.and_then(|p| p.get("clientInfo")).cloned();

    let sid = server
        .sessions()
        .create_session(protocol_version.clone(), client_info);
    server
        .metrics()
        .active_sessions
        .set(server.sessions().len() as i64);

    let result = json!({
        "protocolVersion": protocol_version,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": mcp.server_name,
            "version": env!("CARGO_PKG_VERSION")
        },
        "instructions": "Reorder documents ordered by fractional order keys. Call reorder_documents with the list, the selected ids and the drag source/destination indices; persist each returned patch."
    });
    (success_response(id, result), sid)
}

fn handle_ping(id: Value) -> JsonRpcResponse {
    success_response(id, json!({}))
}

fn handle_tools_list(id: Value) -> JsonRpcResponse {
    success_response(id, json!({ "tools": tools::definitions() }))
}

fn handle_tools_call(
    server: &Server,
    session_id: Option<&str>,
    id: Value,
    params: Option<&Value>,
) -> JsonRpcResponse {
    if let Err(resp) = validate_session(server, session_id, &id) {
        return resp;
    }

    let Some(name) = params.and_then(|p| p.get("name")).and_then(|v| v.as_str()) else {
        return error_response(id, INVALID_PARAMS, "Missing tool name");
    };
    let empty = json!({});
    let arguments = params
        .and_then(|p| p.get("arguments"))
        .unwrap_or(&empty);

    match tools::call(server, name, arguments) {
        Some(result) => success_response(id, result),
        None => error_response(id, INVALID_PARAMS, format!("Unknown tool: {}", name)),
    }
}

fn validate_session(
    server: &Server,
    session_id: Option<&str>,
    id: &Value,
) -> Result<(), JsonRpcResponse> {
    let Some(sid) = session_id else {
        return Err(error_response(
            id.clone(),
            INVALID_REQUEST,
            "Missing session ID; call initialize first",
        ));
    };
    match server.sessions().get_session(sid) {
        None => Err(error_response(
            id.clone(),
            INVALID_REQUEST,
            format!("Unknown session: {}", sid),
        )),
        Some(session) if !session.initialized => Err(error_response(
            id.clone(),
            INVALID_REQUEST,
            "Session not initialized; send notifications/initialized first",
        )),
        Some(_) => Ok(()),
    }
}
