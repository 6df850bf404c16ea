//! HTTP API for the roast chat

mod assets;
mod handlers;
mod types;

pub use handlers::create_router;

use crate::persona::RoastIntensity;
use crate::transcript::{Transcript, Turn};
use crate::turn_handler::{TurnError, TurnHandler};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinError;
use types::Stats;

/// Everything one chat session owns
#[derive(Debug, Default)]
pub struct Session {
    pub transcript: Transcript,
    /// Shown in the UI only
    pub intensity: RoastIntensity,
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Turn(#[from] TurnError),
    #[error("turn task failed: {0}")]
    Task(#[from] JoinError),
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
    pub turns: Arc<TurnHandler>,
    /// Set while a turn is waiting on the provider
    calling_provider: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(turns: TurnHandler) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::default())),
            turns: Arc::new(turns),
            calling_provider: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Move from awaiting-input to calling-provider.
    ///
    /// Returns `None` if a turn is already in flight. The phase returns to
    /// awaiting-input when the guard drops.
    fn begin_turn(&self) -> Option<TurnGuard> {
        self.calling_provider
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TurnGuard(self.calling_provider.clone()))
    }

    pub fn is_calling_provider(&self) -> bool {
        self.calling_provider.load(Ordering::Acquire)
    }

    /// Run one turn to completion on its own task.
    ///
    /// The task owns the session lock and `guard`, so the caller going away
    /// mid-turn (a client hanging up) still leaves the user turn paired with
    /// its reply.
    async fn run_turn(&self, guard: TurnGuard, text: String) -> Result<(Turn, Stats), ChatError> {
        let mut session = self.session.clone().lock_owned().await;
        let turns = self.turns.clone();

        let task = tokio::spawn(async move {
            let _guard = guard;
            let reply = turns
                .handle_user_message(&mut session.transcript, &text)
                .await?;

            tracing::debug!(
                session = %session.transcript.session_id(),
                turns = session.transcript.len(),
                "Turn completed"
            );
            Ok::<_, TurnError>((reply, Stats::from(&session.transcript)))
        });

        Ok(task.await??)
    }
}

struct TurnGuard(Arc<AtomicBool>);

impl Drop for TurnGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
