//! Provider failures

use reqwest::StatusCode;
use thiserror::Error;

/// A failed completion.
///
/// `message` keeps the provider's wording (and the status line when there is
/// one); it may end up in front of the user verbatim.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }

    #[cfg(test)]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    #[cfg(test)]
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimit, message)
    }

    /// Classify a non-success HTTP reply. `detail` is the provider's error
    /// message, or the raw body when it had none.
    pub fn from_status(status: StatusCode, detail: &str) -> Self {
        let kind = match status.as_u16() {
            401 | 403 => LlmErrorKind::Auth,
            429 => LlmErrorKind::RateLimit,
            500..=599 => LlmErrorKind::Upstream,
            _ => LlmErrorKind::Rejected,
        };
        Self::new(kind, format!("{status}: {detail}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Groq unreachable, timed out, or the connection dropped mid-reply
    Network,
    /// Key rejected (401/403)
    Auth,
    RateLimit,
    /// Groq-side 5xx
    Upstream,
    /// Any other non-success status
    Rejected,
    /// 2xx reply that did not parse or carried no text
    Unknown,
}

impl LlmErrorKind {
    /// Whether the same request could succeed later. Only logged; nothing
    /// retries.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::Upstream)
    }
}
