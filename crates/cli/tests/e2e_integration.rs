//! End-to-end integration tests for Onboarding Buddy.
//!
//! These tests run the whole pipeline over a real source document on disk:
//! chunking, embedding, persistence, retrieval, prompt assembly, generation
//! and transcript logging, plus the HTTP session flow.

use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use buddy_agent::{FALLBACK_REPLY, OnboardingBuddy};
use buddy_config::AppConfig;
use buddy_core::error::ProviderError;
use buddy_core::message::Message;
use buddy_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, Usage,
};
use buddy_gateway::api_v1::ApiV1State;
use buddy_index::{IndexBuilder, VectorIndex};
use buddy_session::{PasswordGate, SessionContext, TranscriptLogger};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use tower::ServiceExt;

// ── Mock Provider ────────────────────────────────────────────────────────

/// Scripted completions, letter-frequency embeddings, and a record of
/// every prompt and embedding call.
struct ScriptedProvider {
    completions: Mutex<Vec<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
    embed_calls: Mutex<usize>,
}

impl ScriptedProvider {
    fn new(completions: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            completions: Mutex::new(completions),
            prompts: Mutex::new(Vec::new()),
            embed_calls: Mutex::new(0),
        }
    }

    fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn embed_calls(&self) -> usize {
        *self.embed_calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.prompts
            .lock()
            .unwrap()
            .push(request.messages[0].content.clone());
        let mut completions = self.completions.lock().unwrap();
        if completions.is_empty() {
            panic!("ScriptedProvider exhausted");
        }
        completions.remove(0).map(|text| ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: request.model,
        })
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        *self.embed_calls.lock().unwrap() += 1;
        Ok(EmbeddingResponse {
            embeddings: request.inputs.iter().map(|t| letters(t)).collect(),
            model: request.model,
            usage: None,
        })
    }
}

fn letters(text: &str) -> Vec<f32> {
    let mut v = vec![0.0; 26];
    for c in text.to_ascii_lowercase().chars() {
        if c.is_ascii_lowercase() {
            v[(c as u8 - b'a') as usize] += 1.0;
        }
    }
    v
}

// ── Fixtures ─────────────────────────────────────────────────────────────

const KIT: &str = r#"{
  "paragraphs": [
    "Welcome to the Human Resource Group. Your first week starts with an induction briefing.",
    "The finance unit sits on level 5, next to the pantry.",
    "Lunch is served in the canteen on level 2 from noon.",
    "Apply for leave through the HR portal at least three days ahead."
  ]
}"#;

const QUESTION: &str = "Where is the finance unit?";
const SYNTHESIS: &str = "The finance unit sits on level 5.";
const REPLY: &str = "Hi Alex from Finance, welcome to HRG! You will find your unit on level 5.";

fn config_in(dir: &Path) -> AppConfig {
    let document = dir.join("induction_kit.json");
    std::fs::write(&document, KIT).unwrap();

    let mut config = AppConfig::default();
    config.paths.source_document = document;
    config.paths.index_dir = dir.join("Database");
    config.paths.log_dir = dir.join("log");
    config.chunking.chunk_size = 100;
    config.chunking.chunk_overlap = 0;
    config.retrieval.top_k = 2;
    config
}

fn unlocked_session(gate: &PasswordGate) -> SessionContext {
    let mut session = SessionContext::new();
    session.password_check(gate, "welcome").unwrap();
    session.set_profile("Alex", "Finance", "HRG").unwrap();
    session.detail_check().unwrap();
    session
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── E2E: Question to transcript ──────────────────────────────────────────

#[tokio::test]
async fn e2e_first_question_builds_index_and_answers() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let provider = Arc::new(ScriptedProvider::texts(&[SYNTHESIS, REPLY]));
    let buddy = OnboardingBuddy::from_config(&config, provider.clone()).unwrap();
    let gate = PasswordGate::new("welcome");
    let mut session = unlocked_session(&gate);

    assert!(!buddy.knowledge().is_built());
    let outcome = buddy
        .ask_on(&mut session, QUESTION, day(2026, 10, 18))
        .await
        .unwrap();

    assert_eq!(outcome.reply, REPLY);
    assert_eq!(outcome.context.text, SYNTHESIS);
    assert!(outcome.notices.is_empty());
    assert!(!outcome.context.sources.is_empty() && outcome.context.sources.len() <= 2);
    assert!(outcome.context.sources[0].chunk.text.contains("finance unit"));

    // Index built, embedded and persisted
    assert!(buddy.knowledge().is_built());
    assert!(VectorIndex::file_path(&config.paths.index_dir).exists());

    // Synthesis prompt, then the assembled generation prompt
    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].starts_with("Use the following pieces of context"));
    assert!(prompts[0].contains("Question: Where is the finance unit?"));
    assert!(prompts[1].contains("You are called Bob"));
    assert!(prompts[1].contains(&format!("<context>\n{SYNTHESIS}\n</context>")));
    assert!(prompts[1].contains("<name>\nAlex\n</name>"));
    assert!(prompts[1].contains("<unit>\nFinance\n</unit>"));
    assert!(prompts[1].contains("<division>\nHRG\n</division>"));
    assert!(!prompts[1].contains("Previous Day's Chat Log:"));

    // Transcript appended
    let log = config
        .paths
        .log_dir
        .join("chat_log_Alex_Finance_HRG_2026_10_18.txt");
    assert_eq!(
        std::fs::read_to_string(log).unwrap(),
        format!("User: {QUESTION}\nAssistant: {REPLY}\n")
    );

    // Conversation memory holds the exchange
    assert_eq!(session.memory.len(), 2);
}

#[tokio::test]
async fn e2e_follow_up_carries_history_and_reuses_index() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let provider = Arc::new(ScriptedProvider::texts(&[
        SYNTHESIS,
        REPLY,
        "Lunch is in the canteen on level 2.",
        "Alex, lunch is served on level 2 from noon.",
    ]));
    let buddy = OnboardingBuddy::from_config(&config, provider.clone()).unwrap();
    let gate = PasswordGate::new("welcome");
    let mut session = unlocked_session(&gate);
    let today = day(2026, 10, 18);

    buddy.ask_on(&mut session, QUESTION, today).await.unwrap();
    buddy
        .ask_on(&mut session, "And where do I have lunch?", today)
        .await
        .unwrap();

    // One embedding call to build the index, one per question
    assert_eq!(provider.embed_calls(), 3);

    let prompts = provider.prompts();
    assert!(prompts[3].contains("Previous Questions and Responses:"));
    assert!(prompts[3].contains(QUESTION));
    assert!(prompts[3].contains(REPLY));

    let transcript = buddy
        .transcripts()
        .read_day(&session.profile, today)
        .unwrap();
    assert_eq!(transcript.matches("User: ").count(), 2);
}

#[tokio::test]
async fn e2e_yesterdays_transcript_feeds_todays_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let provider = Arc::new(ScriptedProvider::texts(&[
        SYNTHESIS,
        REPLY,
        "Leave is applied for on the HR portal.",
        "Welcome back, Alex! Apply for leave on the HR portal.",
    ]));
    let buddy = OnboardingBuddy::from_config(&config, provider.clone()).unwrap();
    let gate = PasswordGate::new("welcome");

    let mut monday = unlocked_session(&gate);
    buddy
        .ask_on(&mut monday, QUESTION, day(2026, 10, 19))
        .await
        .unwrap();

    // A fresh session the next day starts with no history
    let mut tuesday = unlocked_session(&gate);
    buddy
        .ask_on(&mut tuesday, "How do I apply for leave?", day(2026, 10, 20))
        .await
        .unwrap();

    let prompts = provider.prompts();
    assert!(prompts[3].contains("Previous Day's Chat Log:"));
    assert!(prompts[3].contains(&format!("User: {QUESTION}")));
    assert!(!prompts[3].contains("Previous Questions and Responses:"));

    let logs = TranscriptLogger::new(&config.paths.log_dir);
    assert!(logs.path_for(&tuesday.profile, day(2026, 10, 20)).exists());
}

#[tokio::test]
async fn e2e_generation_failure_still_replies_and_logs() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(SYNTHESIS.to_string()),
        Err(ProviderError::Timeout("120s".into())),
    ]));
    let buddy = OnboardingBuddy::from_config(&config, provider).unwrap();
    let gate = PasswordGate::new("welcome");
    let mut session = unlocked_session(&gate);
    let today = day(2026, 10, 18);

    let outcome = buddy.ask_on(&mut session, QUESTION, today).await.unwrap();

    assert_eq!(outcome.reply, FALLBACK_REPLY);
    assert_eq!(outcome.notices.len(), 1);
    assert!(outcome.notices[0].starts_with("Error generating response: "));

    let transcript = buddy.transcripts().read_day(&session.profile, today).unwrap();
    assert!(transcript.ends_with(&format!("Assistant: {FALLBACK_REPLY}\n")));
}

#[tokio::test]
async fn e2e_missing_document_answers_without_context() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.paths.source_document = dir.path().join("gone.json");
    let provider = Arc::new(ScriptedProvider::texts(&[REPLY]));
    let buddy = OnboardingBuddy::from_config(&config, provider.clone()).unwrap();
    let gate = PasswordGate::new("welcome");
    let mut session = unlocked_session(&gate);

    let outcome = buddy
        .ask_on(&mut session, QUESTION, day(2026, 10, 18))
        .await
        .unwrap();

    assert_eq!(outcome.reply, REPLY);
    assert!(outcome.context.is_empty());
    assert_eq!(outcome.notices.len(), 1);
    assert!(outcome.notices[0].starts_with("Error loading context: "));
    assert!(provider.prompts()[0].contains("<context>\n\n</context>"));
}

// ── E2E: Index persistence ───────────────────────────────────────────────

#[tokio::test]
async fn e2e_persisted_index_reloads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let provider = Arc::new(ScriptedProvider::texts(&[]));

    let built = IndexBuilder::from_config(&config, provider.clone())
        .unwrap()
        .build()
        .await
        .unwrap();
    assert!(built.len() >= 2);

    let loaded = VectorIndex::load(&config.paths.index_dir).unwrap();
    assert_eq!(loaded.len(), built.len());

    let query = letters("canteen lunch");
    let from_built: Vec<_> = built.search(&query, 1).into_iter().map(|s| s.chunk).collect();
    let from_disk: Vec<_> = loaded.search(&query, 1).into_iter().map(|s| s.chunk).collect();
    assert_eq!(from_built, from_disk);
    assert!(from_disk[0].text.contains("canteen"));

    // A rebuild replaces the index rather than appending to it
    IndexBuilder::from_config(&config, provider)
        .unwrap()
        .build()
        .await
        .unwrap();
    assert_eq!(
        VectorIndex::load(&config.paths.index_dir).unwrap().len(),
        built.len()
    );
}

#[tokio::test]
async fn e2e_each_process_builds_its_own_index() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let provider = Arc::new(ScriptedProvider::texts(&[SYNTHESIS, REPLY]));

    // A standalone `index` run leaves an index on disk...
    IndexBuilder::from_config(&config, provider.clone())
        .unwrap()
        .build()
        .await
        .unwrap();
    assert_eq!(provider.embed_calls(), 1);

    // ...and a fresh buddy still embeds the document once for itself.
    let buddy = OnboardingBuddy::from_config(&config, provider.clone()).unwrap();
    let gate = PasswordGate::new("welcome");
    let mut session = unlocked_session(&gate);
    buddy
        .ask_on(&mut session, QUESTION, day(2026, 10, 18))
        .await
        .unwrap();
    assert_eq!(provider.embed_calls(), 3);
}

// ── E2E: HTTP session flow ───────────────────────────────────────────────

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn e2e_gateway_session_walkthrough() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let provider = Arc::new(ScriptedProvider::texts(&[SYNTHESIS, REPLY]));
    let buddy = Arc::new(OnboardingBuddy::from_config(&config, provider).unwrap());
    let state = Arc::new(ApiV1State::new(buddy, Arc::new(PasswordGate::new("welcome"))));
    let app = buddy_gateway::build_router(state);

    let (status, json) = send(&app, "POST", "/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = json["id"].as_str().unwrap().to_string();
    let base = format!("/v1/sessions/{id}");

    let (status, _) = send(&app, "POST", &format!("{base}/chat"), Some(serde_json::json!({"message": QUESTION}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(&app, "POST", &format!("{base}/password"), Some(serde_json::json!({"password": "guess"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Incorrect password!");

    let (status, _) = send(&app, "POST", &format!("{base}/password"), Some(serde_json::json!({"password": "welcome"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, "PUT", &format!("{base}/profile"), Some(serde_json::json!({"name": "Alex", "unit": "Finance"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "Please fill in all fields!");

    let (status, json) = send(&app, "PUT", &format!("{base}/profile"), Some(serde_json::json!({"name": "Alex", "unit": "Finance", "division": "HRG"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["chat_unlocked"], true);

    let (status, json) = send(&app, "POST", &format!("{base}/chat"), Some(serde_json::json!({"message": QUESTION}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"], REPLY);
    assert_eq!(json["context"], SYNTHESIS);

    let (status, json) = send(&app, "GET", &format!("{base}/messages"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["messages"].as_array().unwrap().len(), 2);
    assert_eq!(json["messages"][0]["role"], "user");

    let (status, json) = send(&app, "POST", &format!("{base}/reset"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["chat_unlocked"], false);
    assert_eq!(json["profile"]["name"], "Alex");

    let (status, json) = send(&app, "GET", "/v1/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["index_built"], true);
    assert_eq!(json["sessions"], 1);

    let logs: Vec<_> = std::fs::read_dir(&config.paths.log_dir).unwrap().collect();
    assert_eq!(logs.len(), 1);
}

// ── E2E: Configuration ───────────────────────────────────────────────────

#[tokio::test]
async fn e2e_config_defaults_and_validation() {
    let config: AppConfig = toml::from_str(&AppConfig::default_toml()).unwrap();
    assert_eq!(config.generation.model, "gpt-4o-mini");
    assert_eq!(config.retrieval.top_k, 20);
    assert_eq!(config.chunking.chunk_size, 500);
    assert_eq!(config.chunking.chunk_overlap, 50);
    assert_eq!(config.persona.assistant_name, "Bob");
    assert!(config.validate().is_ok());

    let mut bad = AppConfig::default();
    bad.chunking.chunk_overlap = bad.chunking.chunk_size;
    assert!(bad.validate().is_err());
}
