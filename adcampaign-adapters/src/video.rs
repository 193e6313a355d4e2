//! Long-running video generation through Vertex AI Veo.

use crate::http::{VertexConfig, check_response, transport_error};
use adcampaign_core::{AdapterError, AdapterResult};
use adcampaign_telemetry::{Instrument, adapter_call_span};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tokio::io::AsyncWriteExt;

pub const DEFAULT_VIDEO_MODEL: &str = "veo-2.0-generate-001";

#[derive(Debug, Clone, PartialEq)]
pub struct VideoRequest {
    pub prompt: String,
    pub duration_seconds: u32,
    pub aspect_ratio: String,
    /// `gs://` prefix the service writes results under.
    pub storage_uri: Option<String>,
}

impl VideoRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            duration_seconds: 8,
            aspect_ratio: "16:9".to_string(),
            storage_uri: None,
        }
    }

    pub fn with_storage_uri(mut self, storage_uri: impl Into<String>) -> Self {
        self.storage_uri = Some(storage_uri.into());
        self
    }
}

/// Opaque name of a submitted operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle(pub String);

impl OperationHandle {
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// A finished video, either stored by the service or returned in the body.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedVideo {
    /// `gs://` or `https://` location.
    Uri(String),
    Inline { bytes: Vec<u8>, mime_type: String },
}

impl GeneratedVideo {
    pub fn uri(uri: impl Into<String>) -> Self {
        Self::Uri(uri.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperationStatus {
    Pending,
    Done { video: GeneratedVideo },
    Failed { message: String },
}

#[async_trait]
pub trait VideoGenerator: Send + Sync {
    async fn submit(&self, request: &VideoRequest) -> AdapterResult<OperationHandle>;
    async fn poll(&self, handle: &OperationHandle) -> AdapterResult<OperationStatus>;
}

#[derive(Deserialize)]
struct SubmitResponse {
    name: String,
}

#[derive(Deserialize)]
struct OperationResponse {
    #[serde(default)]
    done: bool,
    error: Option<OperationError>,
    response: Option<OperationResult>,
}

#[derive(Deserialize)]
struct OperationError {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct OperationResult {
    #[serde(default)]
    videos: Vec<VideoOutput>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoOutput {
    gcs_uri: Option<String>,
    uri: Option<String>,
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

impl VideoOutput {
    fn into_video(self) -> Result<GeneratedVideo, String> {
        if let Some(uri) = self.gcs_uri.or(self.uri) {
            return Ok(GeneratedVideo::Uri(uri));
        }
        let encoded =
            self.bytes_base64_encoded.ok_or_else(|| "operation finished without a video".to_string())?;
        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| format!("invalid base64 video: {e}"))?;
        Ok(GeneratedVideo::Inline {
            bytes,
            mime_type: self.mime_type.unwrap_or_else(|| "video/mp4".into()),
        })
    }
}

impl OperationResponse {
    fn into_status(self) -> OperationStatus {
        if let Some(error) = self.error {
            return OperationStatus::Failed { message: error.message };
        }
        if !self.done {
            return OperationStatus::Pending;
        }
        let video = self
            .response
            .and_then(|r| r.videos.into_iter().next())
            .ok_or_else(|| "operation finished without a video".to_string())
            .and_then(VideoOutput::into_video);
        match video {
            Ok(video) => OperationStatus::Done { video },
            Err(message) => OperationStatus::Failed { message },
        }
    }
}

pub struct VeoClient {
    client: Client,
    config: VertexConfig,
    model: String,
}

impl VeoClient {
    pub fn new(config: VertexConfig) -> Self {
        Self { client: Client::new(), config, model: DEFAULT_VIDEO_MODEL.to_string() }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl VideoGenerator for VeoClient {
    async fn submit(&self, request: &VideoRequest) -> AdapterResult<OperationHandle> {
        let mut parameters = json!({
            "aspectRatio": request.aspect_ratio,
            "sampleCount": 1,
            "durationSeconds": request.duration_seconds,
            "personGeneration": "allow_adult",
            "enhancePrompt": true,
        });
        if let Some(storage_uri) = &request.storage_uri {
            parameters["storageUri"] = json!(storage_uri);
        }
        let body = json!({"instances": [{"prompt": request.prompt}], "parameters": parameters});

        async {
            let response = self
                .client
                .post(self.config.model_url(&self.model, "predictLongRunning"))
                .bearer_auth(&self.config.access_token)
                .json(&body)
                .send()
                .await
                .map_err(transport_error)?;
            let response = check_response(response).await?;
            let submitted: SubmitResponse = response.json().await.map_err(transport_error)?;
            tracing::debug!(operation = %submitted.name, "video generation submitted");
            Ok::<_, AdapterError>(OperationHandle(submitted.name))
        }
        .instrument(adapter_call_span("veo", "submit"))
        .await
    }

    async fn poll(&self, handle: &OperationHandle) -> AdapterResult<OperationStatus> {
        async {
            let response = self
                .client
                .post(self.config.model_url(&self.model, "fetchPredictOperation"))
                .bearer_auth(&self.config.access_token)
                .json(&json!({"operationName": handle.name()}))
                .send()
                .await
                .map_err(transport_error)?;
            let response = check_response(response).await?;
            let operation: OperationResponse = response.json().await.map_err(transport_error)?;
            Ok::<_, AdapterError>(operation.into_status())
        }
        .instrument(adapter_call_span("veo", "poll"))
        .await
    }
}

/// Streams an `https://` result to `dest`. A partial file is removed on failure.
pub async fn download_video(url: &str, dest: &Path) -> AdapterResult<()> {
    if !url.starts_with("https://") {
        return Err(AdapterError::Unavailable(format!("cannot download '{url}'")));
    }
    let response = Client::new().get(url).send().await.map_err(transport_error)?;
    let response = check_response(response).await?;
    write_chunks(response.bytes_stream().map(|chunk| chunk.map_err(transport_error)), dest).await
}

async fn write_chunks<S, B>(body: S, dest: &Path) -> AdapterResult<()>
where
    S: Stream<Item = AdapterResult<B>>,
    B: AsRef<[u8]>,
{
    let result = async {
        let mut body = std::pin::pin!(body);
        let mut file = tokio::fs::File::create(dest).await?;
        while let Some(chunk) = body.next().await {
            file.write_all(chunk?.as_ref()).await?;
        }
        file.flush().await?;
        Ok::<_, AdapterError>(())
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(dest).await;
    }
    result
}

/// Makes a finished video available locally where possible and returns the
/// reference to record: the local path for inline and `https://` videos,
/// the URI unchanged for anything else.
pub async fn save_video(video: &GeneratedVideo, dest: &Path) -> AdapterResult<String> {
    match video {
        GeneratedVideo::Uri(uri) if uri.starts_with("https://") => {
            download_video(uri, dest).await?;
        }
        GeneratedVideo::Uri(uri) => return Ok(uri.clone()),
        GeneratedVideo::Inline { bytes, .. } => {
            write_chunks(futures::stream::iter([Ok(bytes.as_slice())]), dest).await?;
        }
    }
    Ok(dest.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(value: serde_json::Value) -> OperationStatus {
        serde_json::from_value::<OperationResponse>(value).unwrap().into_status()
    }

    #[test]
    fn test_pending_operation() {
        assert_eq!(status(json!({"name": "op/1"})), OperationStatus::Pending);
    }

    #[test]
    fn test_done_operation_reads_gcs_uri() {
        let s = status(json!({
            "name": "op/1",
            "done": true,
            "response": {"videos": [{"gcsUri": "gs://bucket/ad.mp4", "mimeType": "video/mp4"}]}
        }));
        assert_eq!(s, OperationStatus::Done { video: GeneratedVideo::uri("gs://bucket/ad.mp4") });
    }

    #[test]
    fn test_done_operation_decodes_inline_bytes() {
        let s = status(json!({
            "done": true,
            "response": {"videos": [{"bytesBase64Encoded": "AAAAGGZ0eXBtcDQy", "mimeType": "video/mp4"}]}
        }));
        let (bytes, mime_type) = match s {
            OperationStatus::Done { video: GeneratedVideo::Inline { bytes, mime_type } } => (bytes, mime_type),
            other => panic!("expected inline video, got {other:?}"),
        };
        assert_eq!(&bytes[4..8], b"ftyp");
        assert_eq!(mime_type, "video/mp4");
    }

    #[test]
    fn test_invalid_inline_bytes_is_failure() {
        let s = status(json!({"done": true, "response": {"videos": [{"bytesBase64Encoded": "!!"}]}}));
        assert!(matches!(s, OperationStatus::Failed { message } if message.contains("base64")));
    }

    #[test]
    fn test_error_operation() {
        let s = status(json!({"done": true, "error": {"code": 3, "message": "prompt rejected"}}));
        assert_eq!(s, OperationStatus::Failed { message: "prompt rejected".into() });
    }

    #[test]
    fn test_done_without_video_is_failure() {
        let s = status(json!({"done": true, "response": {"videos": []}}));
        assert!(matches!(s, OperationStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_download_rejects_non_https() {
        let dir = tempfile::tempdir().unwrap();
        let err = download_video("gs://bucket/ad.mp4", &dir.path().join("a.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_save_inline_video_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("ad_video.mp4");
        let video = GeneratedVideo::Inline { bytes: b"mp4-bytes".to_vec(), mime_type: "video/mp4".into() };

        let reference = save_video(&video, &dest).await.unwrap();
        assert_eq!(reference, dest.to_string_lossy());
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"mp4-bytes");
    }

    #[tokio::test]
    async fn test_save_gcs_video_keeps_uri() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("ad_video.mp4");
        let reference = save_video(&GeneratedVideo::uri("gs://ads/a.mp4"), &dest).await.unwrap();
        assert_eq!(reference, "gs://ads/a.mp4");
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_interrupted_stream_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("ad_video.mp4");
        let body = futures::stream::iter([
            Ok(b"first chunk".as_slice()),
            Err(AdapterError::Transport("connection reset".into())),
        ]);

        let err = write_chunks(body, &dest).await.unwrap_err();
        assert!(matches!(err, AdapterError::Transport(_)));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_save_inline_video_into_missing_dir_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing").join("ad_video.mp4");
        let video = GeneratedVideo::Inline { bytes: vec![1, 2, 3], mime_type: "video/mp4".into() };
        assert!(save_video(&video, &dest).await.is_err());
        assert!(!dest.exists());
    }
}
