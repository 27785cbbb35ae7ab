//! Session state for Onboarding Buddy.
//!
//! - [`PasswordGate`]: shared-password check
//! - [`SessionContext`]: the per-session gate flags, profile and conversation
//! - [`TranscriptLogger`]: durable daily chat logs per profile

pub mod gate;
pub mod transcript;

pub use gate::{PasswordGate, SessionContext};
pub use transcript::TranscriptLogger;
