//! Access gate and per-session state.
//!
//! A session moves through three surfaces: the password prompt, the
//! details form, and the chat. [`SessionContext`] holds the flags that pick
//! the surface together with the profile and conversation of that session.

use buddy_core::error::GateError;
use buddy_core::message::ConversationMemory;
use buddy_core::profile::UserProfile;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, info};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Shared-password check.
///
/// Only a keyed SHA-256 digest of the secret is kept. Attempts are digested
/// with the same per-gate key and compared in constant time.
pub struct PasswordGate {
    key: [u8; 16],
    expected: Vec<u8>,
}

impl PasswordGate {
    pub fn new(secret: &str) -> Self {
        let key = *Uuid::new_v4().as_bytes();
        let expected = digest(&key, secret)
            .map(|mac| mac.finalize().into_bytes().to_vec())
            .unwrap_or_default();
        Self { key, expected }
    }

    /// True when `attempt` equals the configured secret.
    pub fn check(&self, attempt: &str) -> bool {
        match digest(&self.key, attempt) {
            Some(mac) => mac.verify_slice(&self.expected).is_ok(),
            None => false,
        }
    }
}

impl std::fmt::Debug for PasswordGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordGate").finish_non_exhaustive()
    }
}

fn digest(key: &[u8], value: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(value.as_bytes());
    Some(mac)
}

/// State of one user session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub id: String,
    /// The shared password has been entered correctly
    pub password_in: bool,
    /// The details form has been submitted with every field filled
    pub details_in: bool,
    pub profile: UserProfile,
    pub memory: ConversationMemory,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            password_in: false,
            details_in: false,
            profile: UserProfile::default(),
            memory: ConversationMemory::new(),
        }
    }

    /// Check a password attempt. The attempt is not retained.
    pub fn password_check(&mut self, gate: &PasswordGate, attempt: &str) -> Result<(), GateError> {
        self.password_in = gate.check(attempt);
        if self.password_in {
            info!(session = %self.id, "Password accepted");
            Ok(())
        } else {
            info!(session = %self.id, "Password rejected");
            Err(GateError::IncorrectPassword)
        }
    }

    /// Edit the details form.
    pub fn set_profile(
        &mut self,
        name: impl Into<String>,
        unit: impl Into<String>,
        division: impl Into<String>,
    ) -> Result<(), GateError> {
        if !self.password_in {
            return Err(GateError::Locked);
        }
        if self.details_in {
            return Err(GateError::ProfileSubmitted);
        }
        self.profile = UserProfile::new(name, unit, division);
        Ok(())
    }

    /// Submit the details form.
    pub fn detail_check(&mut self) -> Result<(), GateError> {
        if !self.password_in {
            return Err(GateError::Locked);
        }
        if self.profile.is_complete() {
            self.details_in = true;
            debug!(session = %self.id, "Details submitted");
            Ok(())
        } else {
            Err(GateError::IncompleteProfile)
        }
    }

    /// Return to the details form. Profile and conversation are kept.
    pub fn detail_reset(&mut self) {
        self.details_in = false;
    }

    /// Empty the details form.
    pub fn detail_clear(&mut self) -> Result<(), GateError> {
        if self.details_in {
            return Err(GateError::ProfileSubmitted);
        }
        self.profile.clear();
        Ok(())
    }

    pub fn is_authorized(&self) -> bool {
        self.password_in
    }

    pub fn chat_unlocked(&self) -> bool {
        self.password_in && self.details_in
    }

    /// The submitted profile, if the form has been submitted.
    pub fn current_profile(&self) -> Option<&UserProfile> {
        self.details_in.then_some(&self.profile)
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
