//! Analysis engine — two-tier resolution for client records.
//!
//! Tier one is a remote chat-completion model (when configured); tier two is
//! the deterministic heuristic in [`heuristic`]. `analyze` never fails
//! outward: every model-path error is logged and answered by the heuristic on
//! the same record, with no retry and no partial merge. The `source` tag on
//! the result is the only externally visible trace of a fallback.

pub mod aggregate;
pub mod heuristic;
pub mod prompts;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::warn;

use crate::config::Config;
use crate::llm_client::{prompts::JSON_ONLY_SYSTEM, strip_json_fences, LlmClient, LlmError};
use crate::models::analysis::{AnalysisSource, ClientAnalysis, Priority};
use crate::models::client::ClientRow;

/// Keyword cap for model-produced analyses (the heuristic path caps at 10).
const MODEL_KEYWORD_LIMIT: usize = 12;

/// Remote text-generation backend. Production wires in `LlmClient`; tests
/// swap in canned or failing implementations.
///
/// Carried in `AnalysisEngine` as `Arc<dyn ModelBackend>`.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl ModelBackend for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        self.chat(system, user).await
    }
}

/// The two-tier analysis pipeline. Cheap to clone; holds no mutable state,
/// so concurrent `analyze` calls are independent.
#[derive(Clone)]
pub struct AnalysisEngine {
    backend: Option<Arc<dyn ModelBackend>>,
}

impl AnalysisEngine {
    /// Wires the engine from startup configuration. With analysis disabled
    /// or no credential configured there is no backend and every call
    /// resolves heuristically — a deterministic skip, not an error.
    pub fn from_config(config: &Config) -> Self {
        if !config.analysis_enabled || config.openai_api_key.trim().is_empty() {
            return Self::heuristic_only();
        }
        let client = LlmClient::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.openai_model.clone(),
        );
        Self::with_backend(Arc::new(client))
    }

    pub fn heuristic_only() -> Self {
        Self { backend: None }
    }

    pub fn with_backend(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn model_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Analyzes a client record. Always produces a result.
    ///
    /// Cancellation is future-drop: the model call is the only suspension
    /// point, and dropping this future aborts the whole operation.
    pub async fn analyze(&self, client: &ClientRow) -> ClientAnalysis {
        if let Some(backend) = &self.backend {
            match model_analysis(backend.as_ref(), client).await {
                Ok(analysis) => return analysis,
                Err(e) => {
                    warn!(
                        client_id = %client.id,
                        error = %e,
                        "model analysis failed, falling back to heuristic"
                    );
                }
            }
        }
        heuristic::analyze(client)
    }
}

/// The model tier: prompt → chat call → fence-stripped defensive parse →
/// normalized `ClientAnalysis`. The reply is untrusted text; every field is
/// sanitized or defaulted before it reaches the domain type. All failure
/// modes are `Err` — the engine maps them to the heuristic tier.
async fn model_analysis(
    backend: &dyn ModelBackend,
    client: &ClientRow,
) -> Result<ClientAnalysis, LlmError> {
    let prompt = prompts::build_analyze_prompt(client);
    let reply = backend.complete(JSON_ONLY_SYSTEM, &prompt).await?;

    let payload = strip_json_fences(&reply);
    if payload.is_empty() {
        return Err(LlmError::EmptyContent);
    }

    let value: Value = serde_json::from_str(payload)?;
    let fields = value.as_object().ok_or(LlmError::UnexpectedShape)?;

    let priority = field_ci(fields, "priority")
        .and_then(Value::as_str)
        .map(Priority::parse_loose)
        .unwrap_or(Priority::Unknown);

    let summary = field_ci(fields, "summary")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let keywords = field_ci(fields, "keywords")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(ClientAnalysis {
        priority,
        summary,
        keywords: sanitize_keywords(keywords, MODEL_KEYWORD_LIMIT),
        generated_at: Utc::now(),
        source: AnalysisSource::Model,
    })
}

/// Case-insensitive field lookup; model replies do not reliably match casing.
fn field_ci<'a>(fields: &'a serde_json::Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Trims entries, drops blanks, deduplicates case-insensitively, caps length.
fn sanitize_keywords(raw: Vec<String>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keywords = Vec::new();
    for keyword in raw {
        let trimmed = keyword.trim();
        if trimmed.is_empty() || !seen.insert(trimmed.to_lowercase()) {
            continue;
        }
        keywords.push(trimmed.to_string());
        if keywords.len() == limit {
            break;
        }
    }
    keywords
}
