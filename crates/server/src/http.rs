//! HTTP Endpoints
//!
//! REST API for lead intake and the sales assistant.

use std::collections::BTreeMap;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use lead_desk_agent::AgentError;
use lead_desk_config::format_price;
use lead_desk_core::{normalize_session_id, AiBrief, ChatTurn, LeadFields, ServiceType};

use crate::metrics::{metrics_handler, record_error, record_request};
use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.read();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    drop(config); // Release lock before building router

    Router::new()
        // Lead intake
        .route("/api/leads", post(create_lead))
        .route("/api/leads/:id", get(get_lead))
        .route("/api/leads/:id/clarifications", post(clarify_lead))
        // Sales assistant
        .route("/api/chat", post(chat))
        .route("/api/chat/:session_id/history", get(chat_history))
        // Price listing
        .route("/api/prices", get(list_prices))
        // Health check
        .route("/health", get(health_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000 for safety
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        // CORS disabled - allow all (only for development!)
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    if origins.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    // Wildcard headers cannot be combined with credentials
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Lead submission request
#[derive(Debug, Deserialize)]
struct LeadRequest {
    /// Canonical service-type name
    service_type: Option<String>,
    /// Legacy mode code, accepted for older callers
    mode: Option<String>,
    /// Field data mapping
    data: Option<serde_json::Value>,
}

/// Lead submission response
#[derive(Debug, Serialize)]
struct LeadResponse {
    status: &'static str,
    id: Uuid,
    service_type: String,
    missing_fields: Vec<String>,
    clarifying_questions: Vec<String>,
    email_status: String,
    ai_status: String,
    quality_score: u8,
    score_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    brief: Option<AiBrief>,
}

/// Create a lead
async fn create_lead(
    State(state): State<AppState>,
    Json(request): Json<LeadRequest>,
) -> impl IntoResponse {
    record_request("create_lead");

    let raw_service = match request.service_type.or(request.mode) {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => {
            record_error("create_lead");
            return error_response(
                StatusCode::BAD_REQUEST,
                "service_type or mode is required",
            );
        }
    };

    let fields = match request.data {
        Some(serde_json::Value::Object(map)) => LeadFields::from_json_map(&map),
        Some(_) => {
            record_error("create_lead");
            return error_response(StatusCode::BAD_REQUEST, "data must be a JSON object");
        }
        None => {
            record_error("create_lead");
            return error_response(StatusCode::BAD_REQUEST, "data is required");
        }
    };

    let service = ServiceType::parse(&raw_service);
    match state.intake.submit(service, fields).await {
        Ok(outcome) => {
            let response = LeadResponse {
                status: "ok",
                id: outcome.lead.id,
                service_type: outcome.lead.service_type.canonical_name().to_string(),
                missing_fields: outcome.lead.missing_fields.clone(),
                clarifying_questions: outcome.clarifying_questions,
                email_status: outcome.email_status.tag(),
                ai_status: outcome.ai_status.as_str().to_string(),
                quality_score: outcome.quality.value,
                score_source: outcome.quality.source.as_str().to_string(),
                brief: outcome.presented_brief,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            record_error("create_lead");
            tracing::error!(error = %e, "Lead insert failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("insert_failed: {}", e),
            )
        }
    }
}

/// Get a stored lead
async fn get_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    record_request("get_lead");

    match state.leads.get(id).await {
        Ok(Some(lead)) => (StatusCode::OK, Json(lead)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "lead not found"),
        Err(e) => {
            record_error("get_lead");
            tracing::error!(lead_id = %id, error = %e, "Lead fetch failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable")
        }
    }
}

/// Clarification request
#[derive(Debug, Deserialize)]
struct ClarifyRequest {
    #[serde(default)]
    answers: BTreeMap<String, String>,
    #[serde(default)]
    extra: Option<String>,
}

/// Record clarifications and re-run scoring
async fn clarify_lead(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ClarifyRequest>,
) -> impl IntoResponse {
    record_request("clarify_lead");

    match state
        .intake
        .clarify(id, request.answers, request.extra)
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "id": outcome.lead_id,
                "ai_status": outcome.ai_status.as_str(),
                "quality_score": outcome.quality.value,
                "score_source": outcome.quality.source.as_str(),
                "clarifying_questions": outcome.clarifying_questions,
                "brief": outcome.presented_brief,
            })),
        )
            .into_response(),
        Err(AgentError::NotFound(_)) => error_response(StatusCode::NOT_FOUND, "lead not found"),
        Err(e) => {
            record_error("clarify_lead");
            tracing::error!(lead_id = %id, error = %e, "Clarification failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable")
        }
    }
}

/// Chat request
#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    session_id: Option<String>,
    message: String,
}

/// Chat response
#[derive(Debug, Serialize)]
struct ChatResponse {
    session_id: String,
    reply: String,
}

/// Chat endpoint
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    record_request("chat");

    let session_id = normalize_session_id(request.session_id.as_deref());

    let history = match state.chats.history(&session_id).await {
        Ok(history) => history,
        Err(e) => {
            tracing::warn!(session_id = %session_id, error = %e, "History fetch failed");
            Vec::new()
        }
    };

    let reply = state.agent.reply(&request.message, &history).await;

    // Post-action: the reply is already fixed; a failed append is logged
    // and discarded, never propagated.
    let turn = ChatTurn::new(request.message, reply.clone());
    if let Err(e) = state.chats.append(&session_id, &turn).await {
        record_error("chat_append");
        tracing::warn!(session_id = %session_id, error = %e, "Transcript append failed");
    }

    Json(ChatResponse { session_id, reply })
}

/// Ordered transcript of one session
async fn chat_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    record_request("chat_history");

    match state.chats.history(&session_id).await {
        Ok(turns) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "session_id": session_id,
                "turns": turns,
            })),
        )
            .into_response(),
        Err(e) => {
            record_error("chat_history");
            tracing::error!(session_id = %session_id, error = %e, "History fetch failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable")
        }
    }
}

/// Price catalog, rendered with the shared formatter
async fn list_prices(State(state): State<AppState>) -> Json<serde_json::Value> {
    record_request("list_prices");

    let prices = &state.catalog.prices;
    Json(serde_json::json!({
        "portfolio": format_price(prices.portfolio),
        "vitrine": format_price(prices.vitrine),
        "cv": format_price(prices.cv),
        "lettre": format_price(prices.lettre),
        "pack": format_price(prices.pack),
        "hosting_month": format_price(prices.hosting_month),
        "hosting_year": format_price(prices.hosting_year),
        "hosting_year_discount": format_price(prices.hosting_year_discount),
    }))
}

/// Liveness probe
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn error_response(status: StatusCode, detail: &str) -> axum::response::Response {
    (
        status,
        Json(serde_json::json!({
            "status": "error",
            "detail": detail,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_desk_config::{Settings, FOOTER_MARKER};
    use serde_json::json;

    fn state() -> AppState {
        AppState::new(Settings::default())
    }

    #[test]
    fn test_router_creation() {
        let _ = create_router(state());
    }

    #[test]
    fn test_cors_disabled_is_permissive() {
        let _ = build_cors_layer(&[], false);
        let _ = build_cors_layer(&["https://example.com".to_string()], true);
    }

    #[tokio::test]
    async fn test_chat_reply_is_compliant_and_logged() {
        let state = state();

        let Json(response) = chat(
            State(state.clone()),
            Json(ChatRequest {
                session_id: None,
                message: "quels sont vos prix".to_string(),
            }),
        )
        .await;

        assert!(!response.reply.is_empty());
        assert!(response.reply.contains("CFA"));
        assert!(response.reply.contains(FOOTER_MARKER));
        assert_eq!(response.session_id, "unknown");

        // The transcript append is a post-action but still lands
        let history = state.chats.history("unknown").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user, "quels sont vos prix");
    }

    #[tokio::test]
    async fn test_create_lead_with_legacy_mode_code() {
        let state = state();

        let response = create_lead(
            State(state.clone()),
            Json(LeadRequest {
                service_type: None,
                mode: Some("lm".to_string()),
                data: Some(json!({
                    "full_name": "Ama K.",
                    "phone": "+22890000000",
                })),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_lead_rejects_non_object_data() {
        let response = create_lead(
            State(state()),
            Json(LeadRequest {
                service_type: Some("cv".to_string()),
                mode: None,
                data: Some(json!(["not", "an", "object"])),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_lead_requires_a_service() {
        let response = create_lead(
            State(state()),
            Json(LeadRequest {
                service_type: None,
                mode: None,
                data: Some(json!({})),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
