//! Wire contract with the research orchestrator.
//!
//! Server events arrive as a JSON envelope `{"type", "data", "timestamp"}`.
//! The `type` selects one of a closed vocabulary; anything else is ignored
//! so that new server-side event kinds never break older clients.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventParseError {
    #[error("invalid event json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event {kind:?} has a malformed payload: {source}")]
    Payload {
        kind: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GuardrailStarted {
    pub stage_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GuardrailComplete {
    pub stage_id: String,
    pub is_acceptable: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GuardrailRejected {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchStarted {
    pub stage_id: String,
    pub query: String,
    #[serde(default)]
    pub time_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResultSummary {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchCompleted {
    pub stage_id: String,
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub relevant_count: u32,
    #[serde(default)]
    pub filtered_out: u32,
    #[serde(default)]
    pub results: Vec<SearchResultSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchFailed {
    pub stage_id: String,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScrapeStarted {
    pub stage_id: String,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Scrape outcome carries an explicit `success` boolean; the optional
/// `error` is informational only. This differs from [`ExtractionComplete`]
/// on purpose: the two event producers evolved independently.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScrapeComplete {
    pub stage_id: String,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractionStarted {
    pub stage_id: String,
    pub url: String,
}

/// Extraction outcome is derived from the presence of `error`; there is no
/// explicit success flag on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractionComplete {
    pub stage_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RewriterStarted {
    pub stage_id: String,
    #[serde(default)]
    pub queries_executed_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriterAction {
    Continue,
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RewrittenQuery {
    pub query: String,
    #[serde(default)]
    pub time_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RewriterComplete {
    pub stage_id: String,
    pub action: RewriterAction,
    #[serde(default)]
    pub queries_count: u32,
    #[serde(default)]
    pub queries: Vec<RewrittenQuery>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WritingStarted {
    pub stage_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WritingComplete {
    pub stage_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EarlyStop {
    pub stage_id: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProgressUpdate {
    pub current_step: u32,
    pub total_steps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Complete {
    pub response: String,
}

/// The server sends an empty payload on its workflow-failure path, so
/// `has_data` must default rather than be required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Stopped {
    #[serde(default)]
    pub has_data: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorReported {
    pub message: String,
}

/// One decoded server-pushed event.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    GuardrailStarted(GuardrailStarted),
    GuardrailComplete(GuardrailComplete),
    GuardrailRejected(GuardrailRejected),
    SearchStarted(SearchStarted),
    SearchCompleted(SearchCompleted),
    SearchFailed(SearchFailed),
    ScrapeStarted(ScrapeStarted),
    ScrapeComplete(ScrapeComplete),
    ExtractionStarted(ExtractionStarted),
    ExtractionComplete(ExtractionComplete),
    RewriterStarted(RewriterStarted),
    RewriterComplete(RewriterComplete),
    WritingStarted(WritingStarted),
    WritingComplete(WritingComplete),
    EarlyStop(EarlyStop),
    Progress(ProgressUpdate),
    Complete(Complete),
    ResearchStarted,
    Stopped(Stopped),
    Error(ErrorReported),
}

/// Decodes one raw text frame.
///
/// Returns `Ok(None)` for event kinds outside the recognized vocabulary;
/// returns an error for frames that are not valid JSON or whose payload
/// does not decode for a recognized kind.
pub fn decode_event(raw: &str) -> Result<Option<ServerEvent>, EventParseError> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    let kind = envelope.kind.as_str();
    let event = match kind {
        "guardrail_started" => ServerEvent::GuardrailStarted(payload(kind, envelope.data)?),
        "guardrail_complete" => ServerEvent::GuardrailComplete(payload(kind, envelope.data)?),
        "guardrail_rejected" => ServerEvent::GuardrailRejected(payload(kind, envelope.data)?),
        "search_and_filter_started" => ServerEvent::SearchStarted(payload(kind, envelope.data)?),
        "search_and_filter_completed" => {
            ServerEvent::SearchCompleted(payload(kind, envelope.data)?)
        }
        "search_and_filter_failed" => ServerEvent::SearchFailed(payload(kind, envelope.data)?),
        "scrape_started" => ServerEvent::ScrapeStarted(payload(kind, envelope.data)?),
        "scrape_complete" => ServerEvent::ScrapeComplete(payload(kind, envelope.data)?),
        "extraction_started" => ServerEvent::ExtractionStarted(payload(kind, envelope.data)?),
        "extraction_complete" => ServerEvent::ExtractionComplete(payload(kind, envelope.data)?),
        "rewriter_started" => ServerEvent::RewriterStarted(payload(kind, envelope.data)?),
        "rewriter_complete" => ServerEvent::RewriterComplete(payload(kind, envelope.data)?),
        "writing_started" => ServerEvent::WritingStarted(payload(kind, envelope.data)?),
        "writing_complete" => ServerEvent::WritingComplete(payload(kind, envelope.data)?),
        "early_stop" => ServerEvent::EarlyStop(payload(kind, envelope.data)?),
        "progress" => ServerEvent::Progress(payload(kind, envelope.data)?),
        "complete" => ServerEvent::Complete(payload(kind, envelope.data)?),
        "research_started" => ServerEvent::ResearchStarted,
        "stopped" => ServerEvent::Stopped(payload(kind, envelope.data)?),
        "error" => ServerEvent::Error(payload(kind, envelope.data)?),
        _ => return Ok(None),
    };
    Ok(Some(event))
}

fn payload<T: DeserializeOwned>(kind: &str, data: Value) -> Result<T, EventParseError> {
    serde_json::from_value(data).map_err(|source| EventParseError::Payload {
        kind: kind.to_string(),
        source,
    })
}

/// One command sent from the client to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ClientCommand {
    Start {
        query: String,
        #[serde(rename = "turnstileToken", skip_serializing_if = "Option::is_none")]
        turnstile_token: Option<String>,
    },
    Stop,
}

impl ClientCommand {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("client command serializes")
    }
}
