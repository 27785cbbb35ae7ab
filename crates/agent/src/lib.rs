//! The onboarding assistant.
//!
//! One turn flows through four stages:
//!
//! 1. [`ContextRetriever`] finds and condenses the relevant induction material
//! 2. [`PromptAssembler`] combines it with the conversation and the profile
//! 3. [`ResponseGenerator`] asks the model for the reply
//! 4. [`TranscriptLogger`](buddy_session::TranscriptLogger) records the turn
//!
//! [`OnboardingBuddy`] runs the stages for a [`SessionContext`](buddy_session::SessionContext).

pub mod assembler;
pub mod buddy;
pub mod generator;
pub mod retriever;

#[cfg(test)]
mod test_helpers;

pub use assembler::{Persona, PromptAssembler, PromptInputs};
pub use buddy::{OnboardingBuddy, TurnError, TurnOutcome};
pub use generator::{FALLBACK_REPLY, Reply, ResponseGenerator};
pub use retriever::{ContextRetriever, RetrievedContext};
