use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde_json::json;

use crate::config::AppConfig;
use crate::email::{self, EmailConfig, EmailRequest};
use crate::orchestrator::{AnalyzeError, AnalyzeRequest, Orchestrator};

pub struct AppState {
    pub orchestrator: Orchestrator,
    pub email: EmailConfig,
}

pub fn build_state(config: &AppConfig) -> AppState {
    AppState {
        orchestrator: Orchestrator::from_config(config),
        email: config.email.clone(),
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze).get(analyze_usage))
        .route("/api/email", post(prepare_email).get(email_usage))
        .route("/api/health", get(health))
        .with_state(state)
}

pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let state = Arc::new(build_state(&config));
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    log::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    match state.orchestrator.run(request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status = match &self {
            AnalyzeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AnalyzeError::NoResultsFound => StatusCode::NOT_FOUND,
            AnalyzeError::ServiceConfiguration { .. } | AnalyzeError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AnalyzeError::SourceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AnalyzeError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        };

        let mut body = json!({
            "success": false,
            "error": self.to_string(),
        });
        match &self {
            AnalyzeError::InvalidInput(_) => {}
            AnalyzeError::NoResultsFound => {
                body["suggestion"] = json!(self.suggestion());
            }
            AnalyzeError::ServiceConfiguration { details }
            | AnalyzeError::SourceUnavailable { details }
            | AnalyzeError::Internal { details } => {
                body["details"] = json!(details);
            }
            AnalyzeError::RateLimited { retry_after } => {
                body["details"] =
                    json!("API rate limit reached. Please try again in a few minutes.");
                body["retry_after"] = json!(retry_after);
            }
        }
        (status, Json(body)).into_response()
    }
}

async fn analyze_usage() -> Json<serde_json::Value> {
    Json(json!({
        "message": "TopicScout Analysis API",
        "endpoints": {
            "analyze": "POST /api/analyze",
            "email": "POST /api/email",
            "health": "GET /api/health"
        },
        "usage": {
            "analyze": {
                "method": "POST",
                "body": {
                    "keyword": "string (required)",
                    "limit": "number (optional, default: 50)",
                    "settings": "object (optional)"
                }
            }
        }
    }))
}

async fn prepare_email(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmailRequest>,
) -> Response {
    if !state.email.is_configured() {
        log::warn!("email requested without emailjs configuration");
    }
    match email::prepare(request) {
        Ok(config) => Json(json!({
            "success": true,
            "message": "Email configuration prepared",
            "config": config,
            "instructions": "Use client-side EmailJS to send the email"
        }))
        .into_response(),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": err.to_string() })),
        )
            .into_response(),
    }
}

async fn email_usage() -> Json<serde_json::Value> {
    Json(json!({
        "message": "TopicScout Email API",
        "description": "Prepares email configuration for client-side sending",
        "usage": {
            "method": "POST",
            "body": {
                "email": "string (required)",
                "name": "string (optional)",
                "subject": "string (optional)",
                "content": "string (required)",
                "keyword": "string (required)"
            }
        }
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    let reddit = state.orchestrator.reddit_configured();
    let gemini = state.orchestrator.ai_configured();
    let email = state.email.is_configured();
    let healthy = reddit && gemini && email;

    let label = |ok: bool| if ok { "configured" } else { "missing_config" };
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "healthy" } else { "degraded" },
            "timestamp": Utc::now().to_rfc3339(),
            "services": {
                "reddit_api": label(reddit),
                "gemini_ai": label(gemini),
                "email_service": label(email),
            },
            "message": if healthy {
                "All services are properly configured"
            } else {
                "Some services need configuration"
            },
        })),
    )
        .into_response()
}
