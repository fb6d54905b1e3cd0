use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client priority as assigned by analysis. `Unknown` is only ever produced
/// by the model path (an unrecognized priority string); the heuristic path
/// always commits to High, Medium, or Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
    Unknown,
}

impl Priority {
    /// Maps a free-form priority string from an untrusted model reply.
    /// Case-insensitive; anything unrecognized becomes `Unknown`.
    pub fn parse_loose(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Unknown => "Unknown",
        }
    }
}

/// Which code path produced an analysis. Recorded at construction time,
/// never inferred after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Model,
    Heuristic,
}

/// Result of analyzing a client record. A fresh value object per analysis
/// request; stored on the client row as JSONB by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientAnalysis {
    pub priority: Priority,
    pub summary: String,
    /// Deduplicated case-insensitively, no blank entries, at most 12.
    pub keywords: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub source: AnalysisSource,
}
