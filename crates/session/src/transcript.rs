//! Daily chat transcripts.
//!
//! One append-only text file per profile per calendar day, named
//! `chat_log_{name}_{unit}_{division}_{YYYY_MM_DD}.txt` with sanitized
//! fields. Each turn adds a `User: …` line and an `Assistant: …` line.

use buddy_core::error::TranscriptError;
use buddy_core::profile::UserProfile;
use chrono::{Local, NaiveDate};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TranscriptLogger {
    dir: PathBuf,
}

impl TranscriptLogger {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(profile: &UserProfile, date: NaiveDate) -> String {
        format!(
            "chat_log_{}_{}.txt",
            profile.file_stem(),
            date.format("%Y_%m_%d")
        )
    }

    pub fn path_for(&self, profile: &UserProfile, date: NaiveDate) -> PathBuf {
        self.dir.join(Self::file_name(profile, date))
    }

    /// Append one turn to today's transcript.
    pub fn on_turn_complete(
        &self,
        profile: &UserProfile,
        question: &str,
        reply: &str,
    ) -> Result<PathBuf, TranscriptError> {
        self.on_turn_complete_on(profile, question, reply, Local::now().date_naive())
    }

    pub fn on_turn_complete_on(
        &self,
        profile: &UserProfile,
        question: &str,
        reply: &str,
        date: NaiveDate,
    ) -> Result<PathBuf, TranscriptError> {
        let path = self.path_for(profile, date);
        let write_failed = |e: std::io::Error| TranscriptError::WriteFailed {
            path: path.clone(),
            reason: e.to_string(),
        };

        std::fs::create_dir_all(&self.dir).map_err(write_failed)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(write_failed)?;
        write!(file, "User: {question}\nAssistant: {reply}\n").map_err(write_failed)?;

        debug!(path = %path.display(), "Turn appended to transcript");
        Ok(path)
    }

    /// Yesterday's transcript for this profile, or an empty string.
    pub fn prior_day_transcript(&self, profile: &UserProfile) -> Result<String, TranscriptError> {
        self.prior_day_transcript_on(profile, Local::now().date_naive())
    }

    pub fn prior_day_transcript_on(
        &self,
        profile: &UserProfile,
        today: NaiveDate,
    ) -> Result<String, TranscriptError> {
        let Some(yesterday) = today.pred_opt() else {
            return Ok(String::new());
        };
        self.read_day(profile, yesterday)
    }

    /// The transcript for `date`, or an empty string if none was written.
    pub fn read_day(&self, profile: &UserProfile, date: NaiveDate) -> Result<String, TranscriptError> {
        let path = self.path_for(profile, date);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(TranscriptError::ReadFailed {
                path,
                reason: e.to_string(),
            }),
        }
    }
}
