use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::analysis::ClientAnalysis;

/// A dated free-text note about a contact with the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionNote {
    pub at: DateTime<Utc>,
    pub text: String,
}

/// Metadata for an uploaded CV. The binary lives in the object store under
/// `file_key`; `extracted_text` is best-effort and may be absent when the
/// document could not be parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvDocument {
    pub file_key: String,
    pub file_name: String,
    pub content_type: String,
    pub size: i64,
    pub extracted_text: Option<String>,
}

/// A client record as stored in the `clients` table. The analysis engine
/// receives this as a read-only view and never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub interactions: Json<Vec<InteractionNote>>,
    pub cv: Option<Json<CvDocument>>,
    pub analysis: Option<Json<ClientAnalysis>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientRow {
    /// Extracted CV text, if a CV was uploaded and extraction succeeded.
    pub fn cv_text(&self) -> Option<&str> {
        self.cv.as_ref().and_then(|cv| cv.extracted_text.as_deref())
    }
}
