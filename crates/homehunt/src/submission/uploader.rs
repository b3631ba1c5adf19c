use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::AssetPayload;

/// Object storage sink for listing images.
///
/// One call per submission attempt. Implementations must not retry internally.
#[async_trait]
pub trait AssetUploader: Send + Sync {
    async fn upload(&self, payload: &AssetPayload) -> Result<AssetReference, UploadError>;
}

/// Public URI of an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetReference(pub String);

impl AssetReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("image payload is empty")]
    EmptyPayload,
    #[error("object store rejected the upload: {0}")]
    Rejected(String),
    #[error("object store unreachable: {0}")]
    Unreachable(String),
}

/// Naming and public addressing for the bucket that serves listing images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicBucket {
    public_url: String,
    bucket: String,
}

impl PublicBucket {
    pub fn new(public_url: &str, bucket: &str) -> Self {
        Self {
            public_url: public_url.trim_end_matches('/').to_string(),
            bucket: bucket.trim_matches('/').to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object keys are derived from the upload instant in unix milliseconds.
    pub fn object_key(uploaded_at: DateTime<Utc>) -> String {
        format!("property-{}", uploaded_at.timestamp_millis())
    }

    pub fn public_reference(&self, path: &str) -> AssetReference {
        AssetReference(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.public_url,
            self.bucket,
            path.trim_start_matches('/')
        ))
    }
}
