//! Conversational turn handling
//!
//! One call per user utterance: record the utterance, ask the provider for a
//! roast, and record whatever comes back. Provider failures are turned into
//! assistant replies here and never reach the caller.

#[cfg(test)]
mod proptests;

use crate::llm::{LlmError, LlmErrorKind, LlmMessage, LlmRequest, LlmService};
use crate::persona::Persona;
use crate::transcript::{Transcript, TranscriptError, Turn};
use std::sync::Arc;
use thiserror::Error;

const AUTH_MESSAGE: &str = "🔑 My roasting license got revoked: the API key is invalid or expired. \
Generate a new GROQ_API_KEY, update the server configuration and restart.";

const RATE_LIMITED_MESSAGE: &str =
    "⏳ Too many roasts too fast. The provider is rate limiting us, wait a moment and try again.";

const UNAVAILABLE_MESSAGE: &str =
    "🔧 The roast kitchen is closed right now (service unavailable). Try again in a bit.";

/// Provider failure categories, in detection order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Auth,
    RateLimited,
    ProviderUnavailable,
    Unknown,
}

impl FailureKind {
    /// Classify a provider error.
    ///
    /// A structured kind from the client wins when it maps directly;
    /// otherwise the error text decides.
    pub fn of(error: &LlmError) -> Self {
        match error.kind {
            LlmErrorKind::Auth => Self::Auth,
            LlmErrorKind::RateLimit => Self::RateLimited,
            _ => Self::from_description(&error.to_string()),
        }
    }

    /// Classify by case-insensitive substring matching on the error text
    pub fn from_description(description: &str) -> Self {
        let text = description.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

        if has(&["401", "unauthorized", "invalid"]) {
            Self::Auth
        } else if has(&["429", "rate limit"]) {
            Self::RateLimited
        } else if has(&["503", "service unavailable"]) {
            Self::ProviderUnavailable
        } else {
            Self::Unknown
        }
    }

    /// Reply shown to the user in place of a roast
    pub fn message(self, description: &str) -> String {
        match self {
            Self::Auth => AUTH_MESSAGE.to_string(),
            Self::RateLimited => RATE_LIMITED_MESSAGE.to_string(),
            Self::ProviderUnavailable => UNAVAILABLE_MESSAGE.to_string(),
            Self::Unknown => format!("❌ Error: {description}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("utterance must not be empty")]
    EmptyUtterance(#[from] TranscriptError),
}

/// Runs one conversational turn against the shared provider
pub struct TurnHandler {
    llm: Arc<dyn LlmService>,
    persona: Persona,
}

impl TurnHandler {
    pub fn new(llm: Arc<dyn LlmService>, persona: Persona) -> Self {
        Self { llm, persona }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn provider_name(&self) -> &str {
        self.llm.provider_name()
    }

    /// Append the utterance and the assistant's reply to `transcript`.
    ///
    /// Returns the assistant turn, which is either the provider's completion
    /// verbatim or a classified failure message.
    ///
    /// # Errors
    ///
    /// Only an empty utterance is rejected, before anything is appended or
    /// sent. Provider failures become assistant turns.
    pub async fn handle_user_message(
        &self,
        transcript: &mut Transcript,
        utterance: &str,
    ) -> Result<Turn, TurnError> {
        transcript.append(Turn::user(utterance))?;

        let request = self.build_request(utterance);
        let reply = match self.llm.complete(&request).await {
            Ok(response) => Turn::assistant(response.text),
            Err(e) => {
                let kind = FailureKind::of(&e);
                tracing::warn!(
                    session = %transcript.session_id(),
                    ?kind,
                    error = %e,
                    "Roast request failed"
                );
                Turn::assistant(kind.message(&e.to_string()))
            }
        };

        // Assistant turns are never rejected; the user turn above was the
        // only fallible append.
        transcript.append(reply.clone())?;
        Ok(reply)
    }

    /// Persona instruction plus the single utterance. Earlier turns are not
    /// replayed.
    fn build_request(&self, utterance: &str) -> LlmRequest {
        LlmRequest {
            model: self.persona.model.clone(),
            system: Some(self.persona.instruction.clone()),
            messages: vec![LlmMessage::user(utterance)],
            temperature: Some(self.persona.temperature),
            max_tokens: Some(self.persona.max_tokens),
        }
    }
}
