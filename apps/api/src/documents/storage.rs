//! Object-store operations for CV binaries (S3 / MinIO).

use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;

pub async fn put_object(
    s3: &S3Client,
    bucket: &str,
    key: &str,
    data: Bytes,
    content_type: &str,
) -> Result<()> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(data))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;
    Ok(())
}

pub async fn delete_object(s3: &S3Client, bucket: &str, key: &str) -> Result<()> {
    s3.delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("S3 delete failed: {e}"))?;
    Ok(())
}
