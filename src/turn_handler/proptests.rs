//! Property-based tests for turn handling
//!
//! Whatever the provider does, every accepted utterance adds exactly one user
//! turn followed by exactly one assistant turn.

use super::{FailureKind, TurnHandler};
use crate::llm::testing::MockLlmService;
use crate::llm::{LlmError, LlmErrorKind, LlmResponse};
use crate::persona::Persona;
use crate::transcript::{Role, Transcript};
use proptest::prelude::*;
use std::sync::Arc;

/// Non-blank utterance
fn arb_utterance() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9₹ _.!?,]{0,40}[a-zA-Z0-9]"
}

fn arb_error_kind() -> impl Strategy<Value = LlmErrorKind> {
    prop_oneof![
        Just(LlmErrorKind::Network),
        Just(LlmErrorKind::RateLimit),
        Just(LlmErrorKind::Upstream),
        Just(LlmErrorKind::Auth),
        Just(LlmErrorKind::Rejected),
        Just(LlmErrorKind::Unknown),
    ]
}

/// Either a completion or a provider failure
fn arb_outcome() -> impl Strategy<Value = Result<String, LlmError>> {
    prop_oneof![
        "[a-zA-Z0-9 .!?]{0,60}".prop_map(Ok::<String, LlmError>),
        (arb_error_kind(), "[a-zA-Z0-9 ]{0,40}").prop_map(|(kind, message)| {
            Err::<String, LlmError>(LlmError::new(kind, message))
        }),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn prop_turns_alternate_and_grow_by_two(
        exchanges in proptest::collection::vec((arb_utterance(), arb_outcome()), 1..12)
    ) {
        let mock = Arc::new(MockLlmService::new());
        for (_, outcome) in &exchanges {
            match outcome.clone() {
                Ok(text) => mock.queue_response(LlmResponse::text(text)),
                Err(e) => mock.queue_error(e),
            }
        }
        let handler = TurnHandler::new(mock.clone(), Persona::roast());
        let mut transcript = Transcript::new();

        runtime().block_on(async {
            for (i, (utterance, _)) in exchanges.iter().enumerate() {
                handler.handle_user_message(&mut transcript, utterance).await.unwrap();
                assert_eq!(transcript.len(), 2 * (i + 1));
            }
        });

        for (i, turn) in transcript.turns().iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            prop_assert_eq!(turn.role(), expected);
        }
        for (i, (utterance, outcome)) in exchanges.iter().enumerate() {
            prop_assert_eq!(transcript.turns()[2 * i].content(), utterance.as_str());
            let reply = transcript.turns()[2 * i + 1].content();
            match outcome {
                Ok(text) => prop_assert_eq!(reply, text.as_str()),
                Err(e) => prop_assert_eq!(reply, FailureKind::of(e).message(&e.to_string())),
            }
        }
        prop_assert_eq!(mock.recorded_requests().len(), exchanges.len());
    }

    #[test]
    fn prop_unknown_message_embeds_description(description in "[a-z ]{0,40}") {
        let kind = FailureKind::from_description(&description);
        if kind == FailureKind::Unknown {
            prop_assert!(kind.message(&description).contains(&description));
        }
    }

    #[test]
    fn prop_clear_resets_all_counts(n in 0usize..10) {
        let mock = Arc::new(MockLlmService::new());
        for _ in 0..n {
            mock.queue_response(LlmResponse::text("roast"));
        }
        let handler = TurnHandler::new(mock, Persona::roast());
        let mut transcript = Transcript::new();

        runtime().block_on(async {
            for _ in 0..n {
                handler.handle_user_message(&mut transcript, "hi").await.unwrap();
            }
        });
        transcript.clear();

        prop_assert!(transcript.is_empty());
        prop_assert_eq!(transcript.count_by_role(Role::User), 0);
        prop_assert_eq!(transcript.count_by_role(Role::Assistant), 0);
    }
}
