//! API request and response types

use crate::persona::RoastIntensity;
use crate::transcript::{Role, Transcript, Turn};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Decorations for assistant bubbles, picked at random per render
const ROAST_BADGES: &[&str] = &["😈", "🔥", "💀", "⚡", "🎯", "👹", "🤡", "💥"];

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Request to change display settings
#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    /// Validated against the intensity range by the handler
    pub intensity: i64,
}

/// A turn as rendered by the UI
#[derive(Debug, Serialize)]
pub struct TurnView {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<&'static str>,
}

impl From<&Turn> for TurnView {
    fn from(turn: &Turn) -> Self {
        let badge = match turn.role() {
            Role::Assistant => ROAST_BADGES.choose(&mut rand::thread_rng()).copied(),
            Role::User => None,
        };
        Self {
            role: turn.role(),
            content: turn.content().to_string(),
            created_at: turn.created_at(),
            badge,
        }
    }
}

/// Counters shown in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_roasts: usize,
    pub messages: usize,
}

impl From<&Transcript> for Stats {
    fn from(transcript: &Transcript) -> Self {
        Self {
            total_roasts: transcript.count_by_role(Role::Assistant),
            messages: transcript.len(),
        }
    }
}

/// Response with the full transcript
#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub session_id: String,
    pub turns: Vec<TurnView>,
    pub stats: Stats,
    pub intensity: RoastIntensity,
}

/// Response for a completed turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: TurnView,
    pub stats: Stats,
}

/// Response for settings queries and updates
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub intensity: RoastIntensity,
    pub min: u8,
    pub max: u8,
}

impl From<RoastIntensity> for SettingsResponse {
    fn from(intensity: RoastIntensity) -> Self {
        Self {
            intensity,
            min: RoastIntensity::MIN,
            max: RoastIntensity::MAX,
        }
    }
}

/// Provider and model description
#[derive(Debug, Serialize)]
pub struct AboutResponse {
    pub name: &'static str,
    pub provider: String,
    pub model: String,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Where the session is in its turn cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    AwaitingInput,
    CallingProvider,
}

/// Response for the status endpoint
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub phase: TurnPhase,
}
