//! The turn pipeline: retrieve → assemble → generate → log.
//!
//! Every failure after the gate check degrades to a notice, so an unlocked
//! session with a non-empty question always receives a reply.

use crate::assembler::{Persona, PromptAssembler, PromptInputs};
use crate::generator::ResponseGenerator;
use crate::retriever::{ContextRetriever, RetrievedContext};
use buddy_core::error::{GateError, IndexError};
use buddy_core::message::Message;
use buddy_core::provider::Provider;
use buddy_index::{IndexBuilder, KnowledgeBase};
use buddy_session::{SessionContext, TranscriptLogger};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// The result of one answered question.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub reply: String,
    pub context: RetrievedContext,
    /// Non-fatal problems to surface to the user
    pub notices: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    Gate(#[from] GateError),
}

pub struct OnboardingBuddy {
    retriever: ContextRetriever,
    assembler: PromptAssembler,
    generator: ResponseGenerator,
    transcripts: TranscriptLogger,
}

impl OnboardingBuddy {
    pub fn new(
        retriever: ContextRetriever,
        assembler: PromptAssembler,
        generator: ResponseGenerator,
        transcripts: TranscriptLogger,
    ) -> Self {
        Self {
            retriever,
            assembler,
            generator,
            transcripts,
        }
    }

    /// Wire every stage from configuration. The index is built on first use.
    pub fn from_config(
        config: &buddy_config::AppConfig,
        provider: Arc<dyn Provider>,
    ) -> Result<Self, IndexError> {
        let knowledge = Arc::new(KnowledgeBase::new(IndexBuilder::from_config(
            config,
            provider.clone(),
        )?));
        Ok(Self::new(
            ContextRetriever::from_config(&config.retrieval, knowledge, provider.clone()),
            PromptAssembler::new(Persona::from(&config.persona)),
            ResponseGenerator::from_config(&config.generation, provider),
            TranscriptLogger::new(&config.paths.log_dir),
        ))
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        self.retriever.knowledge()
    }

    pub fn transcripts(&self) -> &TranscriptLogger {
        &self.transcripts
    }

    /// Answer `question` for `session`, dating the transcript with today's
    /// local date.
    pub async fn ask(
        &self,
        session: &mut SessionContext,
        question: &str,
    ) -> Result<TurnOutcome, TurnError> {
        self.ask_on(session, question, Local::now().date_naive()).await
    }

    pub async fn ask_on(
        &self,
        session: &mut SessionContext,
        question: &str,
        today: NaiveDate,
    ) -> Result<TurnOutcome, TurnError> {
        if !session.chat_unlocked() {
            return Err(GateError::Locked.into());
        }
        let profile = match session.current_profile() {
            Some(profile) => profile.clone(),
            None => return Err(GateError::Locked.into()),
        };
        if question.trim().is_empty() {
            return Err(GateError::EmptyQuestion.into());
        }

        let mut notices = Vec::new();
        session.memory.push(Message::user(question));

        let context = match self.retriever.retrieve(question).await {
            Ok(context) => context,
            Err(e) => {
                warn!(session = %session.id, error = %e, "Continuing without context");
                notices.push(format!("Error loading context: {e}"));
                RetrievedContext::empty()
            }
        };

        let prior_day = self
            .transcripts
            .prior_day_transcript_on(&profile, today)
            .unwrap_or_else(|e| {
                warn!(session = %session.id, error = %e, "Previous day's transcript unreadable");
                String::new()
            });

        let history = session.memory.render_history_before_latest();
        let prompt = self.assembler.assemble(PromptInputs {
            question,
            context: &context.text,
            history: &history,
            prior_day_transcript: &prior_day,
            profile: &profile,
        });

        let reply = self.generator.generate_or_fallback(&prompt).await;
        notices.extend(reply.notice);
        session.memory.push(Message::assistant(reply.text.clone()));

        if let Err(e) = self
            .transcripts
            .on_turn_complete_on(&profile, question, &reply.text, today)
        {
            warn!(session = %session.id, error = %e, "Turn not written to transcript");
            notices.push(format!("Error saving chat log: {e}"));
        }

        info!(
            session = %session.id,
            context_sources = context.sources.len(),
            notices = notices.len(),
            "Turn complete"
        );

        Ok(TurnOutcome {
            reply: reply.text,
            context,
            notices,
        })
    }
}
