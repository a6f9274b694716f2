//! REST API Server for the portfolio advisor
//!
//! Exposes the response engine, chat sessions, portfolio data and the
//! sample dashboards over HTTP.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::chart::{self, ChartState};
use crate::classifier;
use crate::config::{AdvisorConfig, SessionLimits, TypingConfig};
use crate::dashboard;
use crate::error::AdvisorError;
use crate::knowledge::{self, Feature};
use crate::models::RiskLevel;
use crate::session::{ChatSession, SessionController};
use crate::storage::{build_store, AccessGate};
use crate::transcript::{ChatMessage, Role};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
    #[serde(default)]
    pub current_portfolio: Option<RiskLevel>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub chat_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionMessageRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn ok<T: Serialize>(data: T) -> ApiResult {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

fn fail(error: AdvisorError) -> ApiResult {
    let status = match &error {
        AdvisorError::TurnInFlight => StatusCode::CONFLICT,
        AdvisorError::EmptyMessage | AdvisorError::EmptyUserName => StatusCode::BAD_REQUEST,
        AdvisorError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        AdvisorError::SessionClosed => StatusCode::GONE,
        AdvisorError::TooManySessions(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiResponse::error(error.to_string())))
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub sessions: Arc<RwLock<HashMap<Uuid, Arc<SessionController>>>>,
    pub typing: TypingConfig,
    pub limits: SessionLimits,
    pub gate: AccessGate,
}

impl ApiState {
    pub fn new(typing: TypingConfig, gate: AccessGate) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            typing,
            limits: SessionLimits::default(),
            gate,
        }
    }

    pub fn with_limits(mut self, limits: SessionLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Return the session for `id`, creating and opening it if needed.
    /// Idle sessions are evicted first; a full table is an error.
    async fn open_session(&self, id: Uuid) -> Result<Arc<SessionController>, AdvisorError> {
        let (result, evicted) = {
            let mut sessions = self.sessions.write().await;

            if let Some(existing) = sessions.get(&id) {
                (Ok(Arc::clone(existing)), Vec::new())
            } else {
                let idle: Vec<Uuid> = sessions
                    .iter()
                    .filter(|(_, c)| c.idle_for() >= self.limits.idle_timeout)
                    .map(|(id, _)| *id)
                    .collect();
                let evicted: Vec<_> = idle.iter().filter_map(|id| sessions.remove(id)).collect();

                let result = if sessions.len() >= self.limits.max_sessions {
                    Err(AdvisorError::TooManySessions(sessions.len()))
                } else {
                    let controller = Arc::new(SessionController::with_session(
                        ChatSession::with_id(id),
                        self.typing.clone(),
                    ));
                    controller.open().map(|()| {
                        sessions.insert(id, Arc::clone(&controller));
                        info!(session_id = %id, "Session created");
                        controller
                    })
                };
                (result, evicted)
            }
        };

        if !evicted.is_empty() {
            info!(count = evicted.len(), "Evicted idle sessions");
        }
        for controller in evicted {
            controller.close().await;
        }

        result
    }

    async fn session(&self, id: Uuid) -> Result<Arc<SessionController>, AdvisorError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .cloned()
            .ok_or(AdvisorError::SessionNotFound(id))
    }
}

/// =============================
/// Helpers
/// =============================

fn stable_uuid_from_string(input: &str) -> Uuid {
    use sha2::{Digest, Sha256};

    let hash = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&hash[..16]);

    // Set UUID version (4) and variant (RFC4122) bits.
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}

fn session_id_for(chat_id: Option<&str>) -> Uuid {
    match chat_id {
        Some(v) if !v.trim().is_empty() => {
            Uuid::parse_str(v).unwrap_or_else(|_| stable_uuid_from_string(v))
        }
        _ => Uuid::new_v4(),
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Stateless Chat Endpoint
/// =============================

async fn chat_handler(Json(req): Json<ChatRequest>) -> ApiResult {
    let history: Vec<ChatMessage> = req
        .history
        .into_iter()
        .map(|m| ChatMessage::new(m.role, m.content))
        .collect();

    let reply = classifier::answer(&req.message, &history);

    let mut chart_state = ChartState {
        current: req.current_portfolio,
        visible: false,
    };
    chart_state.apply_turn(&req.message, &reply.text);

    info!(intent = ?reply.intent, "Chat reply generated");

    ok(serde_json::json!({
        "intent": reply.intent,
        "answer": reply.text,
        "current_portfolio": chart_state.current,
        "chart_visible": chart_state.visible,
        "chart": chart_state.view(),
    }))
}

/// =============================
/// Session Endpoints
/// =============================

async fn create_session(
    State(state): State<ApiState>,
    body: Option<Json<CreateSessionRequest>>,
) -> ApiResult {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let session_id = session_id_for(req.chat_id.as_deref());

    match state.open_session(session_id).await {
        Ok(controller) => ok(controller.snapshot().await),
        Err(e) => fail(e),
    }
}

async fn get_session(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    match state.session(id).await {
        Ok(controller) => ok(controller.snapshot().await),
        Err(e) => fail(e),
    }
}

async fn post_session_message(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SessionMessageRequest>,
) -> ApiResult {
    let controller = match state.session(id).await {
        Ok(controller) => controller,
        Err(e) => return fail(e),
    };

    match controller.submit_and_wait(&req.message).await {
        Ok(outcome) => ok(outcome),
        Err(e) => fail(e),
    }
}

async fn delete_session(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult {
    let removed = state.sessions.write().await.remove(&id);
    match removed {
        Some(controller) => {
            controller.close().await;
            ok(serde_json::json!({ "session_id": id, "closed": true }))
        }
        None => fail(AdvisorError::SessionNotFound(id)),
    }
}

/// =============================
/// Portfolio Endpoints
/// =============================

async fn list_portfolios() -> ApiResult {
    let portfolios: Vec<_> = RiskLevel::ALL
        .into_iter()
        .map(knowledge::portfolio)
        .collect();
    ok(portfolios)
}

async fn get_portfolio(Path(key): Path<String>) -> ApiResult {
    match knowledge::portfolio_by_key(&key) {
        Some(portfolio) => ok(serde_json::json!({
            "portfolio": portfolio,
            "formatted": crate::formatter::format_portfolio_recommendation(portfolio),
        })),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!(
                "Portfolio data not available: {}",
                key
            ))),
        ),
    }
}

async fn get_portfolio_chart(Path(key): Path<String>) -> ApiResult {
    ok(chart::chart_view(&key))
}

/// =============================
/// Static Content Endpoints
/// =============================

async fn suggestions() -> ApiResult {
    let mut rng = rand::thread_rng();
    let features: HashMap<&'static str, &'static str> = Feature::ALL
        .into_iter()
        .map(|f| (f.key(), knowledge::random_feature_question(f, &mut rng)))
        .collect();

    ok(serde_json::json!({
        "suggested": knowledge::SUGGESTED_QUESTIONS,
        "features": features,
    }))
}

async fn dashboard_portfolio() -> ApiResult {
    ok(dashboard::portfolio_overview())
}

async fn dashboard_investments() -> ApiResult {
    ok(dashboard::investments_overview())
}

/// =============================
/// Auth Flag Endpoints
/// =============================

async fn auth_status(State(state): State<ApiState>) -> ApiResult {
    ok(serde_json::json!({ "authenticated": state.gate.is_authenticated().await }))
}

async fn login(State(state): State<ApiState>, Json(req): Json<LoginRequest>) -> ApiResult {
    match state.gate.login(&req.user).await {
        Ok(()) => ok(serde_json::json!({ "authenticated": true })),
        Err(e) => fail(e),
    }
}

async fn logout(State(state): State<ApiState>) -> ApiResult {
    match state.gate.logout().await {
        Ok(()) => ok(serde_json::json!({ "authenticated": false })),
        Err(e) => fail(e),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat_handler))
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/:id",
            get(get_session).delete(delete_session),
        )
        .route("/api/sessions/:id/messages", post(post_session_message))
        .route("/api/portfolios", get(list_portfolios))
        .route("/api/portfolios/:key", get(get_portfolio))
        .route("/api/portfolios/:key/chart", get(get_portfolio_chart))
        .route("/api/suggestions", get(suggestions))
        .route("/api/dashboard/portfolio", get(dashboard_portfolio))
        .route("/api/dashboard/investments", get(dashboard_investments))
        .route("/api/auth/status", get(auth_status))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    config: AdvisorConfig,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let gate = AccessGate::new(build_store(config.session_file.clone()));
    let state = ApiState::new(config.typing.clone(), gate).with_limits(config.sessions.clone());
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", config.port);
    info!("Local: http://127.0.0.1:{}", config.port);

    axum::serve(listener, router).await?;

    Ok(())
}
