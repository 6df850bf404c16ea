//! In-memory conversation transcript
//!
//! An append-only list of turns for one session. Nothing here is persisted;
//! the transcript lives exactly as long as the process.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub use crate::llm::MessageRole as Role;

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("user turns must have non-empty content")]
    EmptyUserTurn,
}

/// Ordered history of turns for one session
#[derive(Debug, Clone)]
pub struct Transcript {
    session_id: String,
    turns: Vec<Turn>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            turns: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Add a turn to the end.
    ///
    /// # Errors
    ///
    /// Rejects a user turn whose content is empty or only whitespace.
    pub fn append(&mut self, turn: Turn) -> Result<(), TranscriptError> {
        if turn.role == Role::User && turn.content.trim().is_empty() {
            return Err(TranscriptError::EmptyUserTurn);
        }
        self.turns.push(turn);
        Ok(())
    }

    /// Drop every turn. The session id is kept.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn count_by_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
