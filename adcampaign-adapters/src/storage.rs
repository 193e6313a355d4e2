//! Blob storage for generated images and videos.

use crate::http::{check_response, transport_error};
use adcampaign_core::{AdapterError, AdapterResult};
use adcampaign_telemetry::{Instrument, adapter_call_span};
use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};

const GCS_UPLOAD_URL: &str = "https://storage.googleapis.com/upload/storage/v1";
const GCS_PUBLIC_URL: &str = "https://storage.googleapis.com";

#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Uploads `source` under `destination` and returns a public reference.
    async fn upload(&self, source: &Path, destination: &str) -> AdapterResult<String>;
}

fn content_type(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().essence_str().to_string()
}

/// Google Cloud Storage bucket written through the JSON upload API.
pub struct GcsStorage {
    client: Client,
    bucket: String,
    access_token: String,
    upload_url: String,
    public_url: String,
}

impl GcsStorage {
    pub fn new(bucket: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            bucket: bucket.into(),
            access_token: access_token.into(),
            upload_url: GCS_UPLOAD_URL.to_string(),
            public_url: GCS_PUBLIC_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_endpoints(
        mut self,
        upload_url: impl Into<String>,
        public_url: impl Into<String>,
    ) -> Self {
        self.upload_url = upload_url.into();
        self.public_url = public_url.into();
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl BlobStorage for GcsStorage {
    async fn upload(&self, source: &Path, destination: &str) -> AdapterResult<String> {
        let bytes = tokio::fs::read(source).await?;
        let url = format!("{}/b/{}/o", self.upload_url.trim_end_matches('/'), self.bucket);

        async {
            let response = self
                .client
                .post(url)
                .bearer_auth(&self.access_token)
                .query(&[
                    ("uploadType", "media"),
                    ("name", destination),
                    ("predefinedAcl", "publicRead"),
                ])
                .header(reqwest::header::CONTENT_TYPE, content_type(source))
                .body(bytes)
                .send()
                .await
                .map_err(transport_error)?;
            check_response(response).await?;
            let public_url = self.public_url.trim_end_matches('/');
            Ok::<_, AdapterError>(format!("{public_url}/{}/{destination}", self.bucket))
        }
        .instrument(adapter_call_span("gcs", "upload"))
        .await
    }
}

/// Copies blobs into a local directory. References are plain file paths.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BlobStorage for LocalStorage {
    async fn upload(&self, source: &Path, destination: &str) -> AdapterResult<String> {
        if destination.split('/').any(|segment| segment == "..") {
            return Err(AdapterError::Unavailable(format!("invalid destination '{destination}'")));
        }
        let target = self.root.join(destination);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(source, &target).await?;
        Ok(target.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type(Path::new("ad.png")), "image/png");
        assert_eq!(content_type(Path::new("ad.mp4")), "video/mp4");
        assert_eq!(content_type(Path::new("ad")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_local_storage_copies_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src.png");
        tokio::fs::write(&source, b"img").await.unwrap();

        let storage = LocalStorage::new(dir.path().join("bucket"));
        let reference = storage.upload(&source, "ads/green_guru.png").await.unwrap();

        assert!(reference.ends_with("green_guru.png"));
        assert_eq!(tokio::fs::read(&reference).await.unwrap(), b"img");
    }

    #[tokio::test]
    async fn test_local_storage_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src.png");
        tokio::fs::write(&source, b"img").await.unwrap();

        let storage = LocalStorage::new(dir.path());
        assert!(storage.upload(&source, "../escape.png").await.is_err());
    }
}
