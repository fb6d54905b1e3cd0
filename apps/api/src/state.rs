use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::analysis::AnalysisEngine;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    /// Two-tier analysis engine; resolves heuristically when the remote
    /// model is not configured.
    pub engine: AnalysisEngine,
    pub config: Config,
}
