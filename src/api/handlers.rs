//! HTTP request handlers

use super::assets::{serve_index, serve_static};
use super::types::{
    AboutResponse, ChatRequest, ChatResponse, ErrorResponse, SettingsRequest, SettingsResponse,
    Stats, StatusResponse, SuccessResponse, TranscriptResponse, TurnPhase, TurnView,
};
use super::{AppState, ChatError};
use crate::persona::RoastIntensity;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Chat page and its assets
        .route("/", get(serve_index))
        .route("/assets/*path", get(serve_static))
        // Transcript
        .route("/api/transcript", get(get_transcript))
        .route("/api/chat", post(send_chat))
        .route("/api/clear", post(clear_transcript))
        .route("/api/status", get(get_status))
        // Display settings
        .route("/api/settings", get(get_settings).post(update_settings))
        // Info
        .route("/api/about", get(get_about))
        .route("/version", get(get_version))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================
// Transcript
// ============================================================

async fn get_transcript(State(state): State<AppState>) -> Json<TranscriptResponse> {
    let session = state.session.lock().await;
    let transcript = &session.transcript;

    Json(TranscriptResponse {
        session_id: transcript.session_id().to_string(),
        turns: transcript.turns().iter().map(TurnView::from).collect(),
        stats: Stats::from(transcript),
        intensity: session.intensity,
    })
}

async fn send_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Say something first, even silence is roastable".to_string(),
        ));
    }

    let Some(turn) = state.begin_turn() else {
        return Err(AppError::Conflict(
            "A roast is already cooking, wait for it".to_string(),
        ));
    };

    let (reply, stats) = state.run_turn(turn, req.text).await.map_err(|e| match e {
        ChatError::Turn(e) => AppError::BadRequest(e.to_string()),
        ChatError::Task(e) => AppError::Internal(e.to_string()),
    })?;

    Ok(Json(ChatResponse {
        reply: TurnView::from(&reply),
        stats,
    }))
}

async fn clear_transcript(State(state): State<AppState>) -> Json<SuccessResponse> {
    let mut session = state.session.lock().await;
    if !session.transcript.is_empty() {
        tracing::info!(
            session = %session.transcript.session_id(),
            dropped = session.transcript.len(),
            "Transcript cleared"
        );
    }
    session.transcript.clear();
    Json(SuccessResponse { success: true })
}

async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let phase = if state.is_calling_provider() {
        TurnPhase::CallingProvider
    } else {
        TurnPhase::AwaitingInput
    };
    Json(StatusResponse { phase })
}

// ============================================================
// Settings
// ============================================================

async fn get_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    let session = state.session.lock().await;
    Json(session.intensity.into())
}

async fn update_settings(
    State(state): State<AppState>,
    Json(req): Json<SettingsRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    let intensity = u8::try_from(req.intensity)
        .ok()
        .and_then(|v| RoastIntensity::try_from(v).ok())
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Roast intensity must be between {} and {}",
                RoastIntensity::MIN,
                RoastIntensity::MAX
            ))
        })?;

    let mut session = state.session.lock().await;
    session.intensity = intensity;
    tracing::info!(intensity = intensity.value(), "Roast intensity changed");
    Ok(Json(intensity.into()))
}

// ============================================================
// Info
// ============================================================

async fn get_about(State(state): State<AppState>) -> Json<AboutResponse> {
    Json(AboutResponse {
        name: "Limitly",
        provider: state.turns.provider_name().to_string(),
        model: state.turns.persona().model.clone(),
    })
}

async fn get_version() -> &'static str {
    concat!("limitly ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Chat turn failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
