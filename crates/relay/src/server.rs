use crate::config::RelayConfig;
use crate::mcp::{self, JsonRpcMessage, SessionManager};
use crate::metrics::RelayMetrics;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Header carrying the MCP session id, issued on `initialize`.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Shared state behind every HTTP handler.
pub struct Server {
    config: RelayConfig,
    sessions: SessionManager,
    metrics: RelayMetrics,
}

impl Server {
    pub fn new(config: RelayConfig) -> Result<Self> {
        let metrics = RelayMetrics::new().context("Failed to register metrics")?;
        Ok(Self {
            sessions: SessionManager::with_ttl(config.session_ttl()),
            config,
            metrics,
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn metrics(&self) -> &RelayMetrics {
        &self.metrics
    }

    /// Drop idle sessions and refresh the session gauge.
    pub fn evict_idle_sessions(&self) -> usize {
        let evicted = self.sessions.evict_expired();
        self.metrics.active_sessions.set(self.sessions.len() as i64);
        evicted
    }
}

pub fn router(server: Arc<Server>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp_post).delete(handle_mcp_delete))
        .route("/health", get(handle_health))
        .route("/metrics", get(handle_metrics))
        .with_state(server)
}

/// Bind the configured address and serve until ctrl-c.
pub async fn serve(server: Arc<Server>) -> Result<()> {
    let addr = server.config().bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", listener.local_addr()?);

    let sweeper = tokio::spawn(sweep_sessions(server.clone()));
    let result = axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error");
    sweeper.abort();
    result?;
    info!("Server stopped");
    Ok(())
}

/// Periodically evict sessions whose clients never sent `DELETE /mcp`.
async fn sweep_sessions(server: Arc<Server>) {
    let period = (server.sessions().ttl() / 4).max(Duration::from_secs(1));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let evicted = server.evict_idle_sessions();
        if evicted > 0 {
            info!(evicted, "Evicted idle MCP sessions");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok())
}

async fn handle_mcp_post(
    State(server): State<Arc<Server>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let message = match JsonRpcMessage::parse(&body) {
        Ok(message) => message,
        Err(resp) => return (StatusCode::BAD_REQUEST, Json(resp)).into_response(),
    };
    let sid = session_id(&headers);

    match message {
        JsonRpcMessage::Request(request) => {
            let (resp, new_session) = mcp::dispatch_request(&server, sid, &request);
            let mut response = Json(resp).into_response();
            if let Some(new_session) = new_session {
                match HeaderValue::from_str(&new_session) {
                    Ok(value) => {
                        response.headers_mut().insert(SESSION_HEADER, value);
                    }
                    Err(e) => warn!("Session id is not a valid header value: {}", e),
                }
            }
            response
        }
        JsonRpcMessage::Notification(notification) => {
            mcp::handle_notification(&server, sid, &notification);
            StatusCode::ACCEPTED.into_response()
        }
    }
}

async fn handle_mcp_delete(State(server): State<Arc<Server>>, headers: HeaderMap) -> StatusCode {
    let Some(sid) = session_id(&headers) else {
        return StatusCode::BAD_REQUEST;
    };
    match server.sessions().remove_session(sid) {
        Some(session) => {
            server
                .metrics()
                .active_sessions
                .set(server.sessions().len() as i64);
            info!(
                session = sid,
                age_secs = session.created_at.elapsed().as_secs(),
                "Session closed"
            );
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn handle_health() -> &'static str {
    "ok"
}

async fn handle_metrics(State(server): State<Arc<Server>>) -> Response {
    match server.metrics().render() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            warn!("Failed to render metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
