//! CV document handling: object storage plus best-effort text extraction.

pub mod extract;
pub mod storage;

use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::client::CvDocument;

/// Stores an uploaded CV in the object store and extracts its text.
///
/// The upload itself must succeed; extraction is best-effort — on failure the
/// metadata is returned with `extracted_text: None` so the record still
/// carries the file.
pub async fn store_cv(
    s3: &S3Client,
    bucket: &str,
    client_id: Uuid,
    file_name: String,
    content_type: String,
    data: Bytes,
) -> Result<CvDocument, AppError> {
    let file_key = format!("cv/{client_id}/{}_{file_name}", Uuid::new_v4());
    let size = data.len() as i64;

    storage::put_object(s3, bucket, &file_key, data.clone(), &content_type)
        .await
        .map_err(|e| AppError::S3(e.to_string()))?;

    let name_for_extraction = file_name.clone();
    let extracted_text =
        match tokio::task::spawn_blocking(move || extract::extract_text(&name_for_extraction, &data))
            .await
        {
            Ok(Ok(text)) => Some(text),
            Ok(Err(e)) => {
                warn!(%client_id, file = %file_name, error = %e, "CV text extraction failed");
                None
            }
            Err(e) => {
                warn!(%client_id, file = %file_name, error = %e, "CV text extraction task aborted");
                None
            }
        };

    Ok(CvDocument {
        file_key,
        file_name,
        content_type,
        size,
        extracted_text,
    })
}

/// Deletes a stored CV object, ignoring failures: a missing or unreachable
/// object must never block deleting the client row itself.
pub async fn delete_cv_best_effort(s3: &S3Client, bucket: &str, file_key: &str) {
    if let Err(e) = storage::delete_object(s3, bucket, file_key).await {
        warn!(key = %file_key, error = %e, "failed to delete stored CV, continuing");
    }
}
