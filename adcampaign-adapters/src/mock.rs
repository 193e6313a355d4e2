//! Scripted adapters for tests and offline demos.

use crate::image::{GeneratedImage, ImageGenerator};
use crate::render::VideoSynthesizer;
use crate::social::{Post, SearchPage, SocialProfile, SocialSearch};
use crate::storage::BlobStorage;
use crate::text::TextGenerator;
use crate::video::{GeneratedVideo, OperationHandle, OperationStatus, VideoGenerator, VideoRequest};
use adcampaign_core::{AdapterError, AdapterResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

enum Reply {
    Text(String),
    Fail(String),
}

/// Replays queued responses in order, then falls back to the default reply.
pub struct MockTextGenerator {
    name: String,
    replies: Mutex<VecDeque<Reply>>,
    default: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl MockTextGenerator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replies: Mutex::new(VecDeque::new()),
            default: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(self, text: impl Into<String>) -> Self {
        lock(&self.replies).push_back(Reply::Text(text.into()));
        self
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        lock(&self.replies).push_back(Reply::Fail(message.into()));
        self
    }

    pub fn with_default(mut self, text: impl Into<String>) -> Self {
        self.default = Some(text.into());
        self
    }

    /// Every prompt received so far.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> AdapterResult<String> {
        lock(&self.prompts).push(prompt.to_string());
        match lock(&self.replies).pop_front() {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(message)) => Err(AdapterError::Unavailable(message)),
            None => self
                .default
                .clone()
                .ok_or_else(|| AdapterError::Unavailable("no scripted response left".into())),
        }
    }
}

/// Minimal PNG signature used as image payload.
pub const MOCK_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

pub struct MockImageGenerator {
    failure: Option<String>,
    calls: AtomicU32,
}

impl MockImageGenerator {
    pub fn succeeding() -> Self {
        Self { failure: None, calls: AtomicU32::new(0) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self { failure: Some(message.into()), calls: AtomicU32::new(0) }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(&self, _prompt: &str, count: u32) -> AdapterResult<Vec<GeneratedImage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(AdapterError::Unavailable(message.clone()));
        }
        Ok((0..count.max(1))
            .map(|_| GeneratedImage { bytes: MOCK_PNG.to_vec(), mime_type: "image/png".into() })
            .collect())
    }
}

enum VideoScript {
    CompletesAfter { pending: u32, video: GeneratedVideo },
    NeverCompletes,
    FailsWith(String),
    RejectsSubmit(String),
}

pub struct MockVideoGenerator {
    script: VideoScript,
    submits: AtomicU32,
    polls: AtomicU32,
}

impl MockVideoGenerator {
    fn scripted(script: VideoScript) -> Self {
        Self { script, submits: AtomicU32::new(0), polls: AtomicU32::new(0) }
    }

    /// Reports `Pending` for `pending` polls, then `Done` with `uri`.
    pub fn completes_after(pending: u32, uri: impl Into<String>) -> Self {
        Self::scripted(VideoScript::CompletesAfter { pending, video: GeneratedVideo::Uri(uri.into()) })
    }

    /// Like [`completes_after`](Self::completes_after) but returns the video bytes inline.
    pub fn completes_inline_after(pending: u32, bytes: impl Into<Vec<u8>>) -> Self {
        let video = GeneratedVideo::Inline { bytes: bytes.into(), mime_type: "video/mp4".into() };
        Self::scripted(VideoScript::CompletesAfter { pending, video })
    }

    pub fn never_completes() -> Self {
        Self::scripted(VideoScript::NeverCompletes)
    }

    pub fn fails_with(message: impl Into<String>) -> Self {
        Self::scripted(VideoScript::FailsWith(message.into()))
    }

    pub fn rejects_submit(message: impl Into<String>) -> Self {
        Self::scripted(VideoScript::RejectsSubmit(message.into()))
    }

    pub fn submit_count(&self) -> u32 {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn poll_count(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoGenerator for MockVideoGenerator {
    async fn submit(&self, _request: &VideoRequest) -> AdapterResult<OperationHandle> {
        let n = self.submits.fetch_add(1, Ordering::SeqCst);
        if let VideoScript::RejectsSubmit(message) = &self.script {
            return Err(AdapterError::from_status(400, message.clone()));
        }
        Ok(OperationHandle(format!("operations/mock-{n}")))
    }

    async fn poll(&self, _handle: &OperationHandle) -> AdapterResult<OperationStatus> {
        let seen = self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(match &self.script {
            VideoScript::CompletesAfter { pending, video } if seen >= *pending => {
                OperationStatus::Done { video: video.clone() }
            }
            VideoScript::FailsWith(message) => OperationStatus::Failed { message: message.clone() },
            _ => OperationStatus::Pending,
        })
    }
}

/// Serves scripted result pages in order and answers profile lookups from a table.
#[derive(Default)]
pub struct MockSocialSearch {
    pages: Vec<SearchPage>,
    endless_page_size: Option<usize>,
    fail_on_call: Option<usize>,
    profiles: HashMap<String, SocialProfile>,
    failing_lookups: HashSet<String>,
    search_tokens: Mutex<Vec<Option<String>>>,
    lookups: Mutex<Vec<String>>,
}

impl MockSocialSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, posts: &[&str], next_page_token: Option<&str>) -> Self {
        let index = self.pages.len();
        self.pages.push(SearchPage {
            results: posts
                .iter()
                .enumerate()
                .map(|(i, text)| Post::new(format!("{index}-{i}"), *text))
                .collect(),
            next_page_token: next_page_token.map(str::to_string),
        });
        self
    }

    /// Every call returns `page_size` posts and another page token.
    pub fn endless(page_size: usize) -> Self {
        Self { endless_page_size: Some(page_size), ..Self::default() }
    }

    /// The zero-based `call`-th search returns an HTTP 503.
    pub fn with_failure_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn with_profile(mut self, username: &str, followers_count: u64, bio: &str) -> Self {
        self.profiles.insert(
            username.to_ascii_lowercase(),
            SocialProfile {
                username: username.to_string(),
                name: username.to_string(),
                description: bio.to_string(),
                followers_count,
            },
        );
        self
    }

    pub fn with_failing_lookup(mut self, username: &str) -> Self {
        self.failing_lookups.insert(username.to_string());
        self
    }

    pub fn search_count(&self) -> usize {
        lock(&self.search_tokens).len()
    }

    /// Page tokens passed to each search call, in order.
    pub fn search_tokens(&self) -> Vec<Option<String>> {
        lock(&self.search_tokens).clone()
    }

    pub fn lookups(&self) -> Vec<String> {
        lock(&self.lookups).clone()
    }
}

#[async_trait]
impl SocialSearch for MockSocialSearch {
    async fn search(
        &self,
        _query: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> AdapterResult<SearchPage> {
        let call = {
            let mut tokens = lock(&self.search_tokens);
            tokens.push(page_token.map(str::to_string));
            tokens.len() - 1
        };
        if self.fail_on_call == Some(call) {
            return Err(AdapterError::from_status(503, "service unavailable"));
        }

        if let Some(size) = self.endless_page_size {
            let size = size.min(max_results as usize);
            return Ok(SearchPage {
                results: (0..size)
                    .map(|i| Post::new(format!("{call}-{i}"), format!("#eco post {i} @user{i}")))
                    .collect(),
                next_page_token: Some(format!("page-{}", call + 1)),
            });
        }
        Ok(self.pages.get(call).cloned().unwrap_or_default())
    }

    async fn lookup_profile(&self, username: &str) -> AdapterResult<Option<SocialProfile>> {
        lock(&self.lookups).push(username.to_string());
        if self.failing_lookups.contains(username) {
            return Err(AdapterError::RateLimited);
        }
        // Usernames match case-insensitively, as on Twitter.
        Ok(self.profiles.get(&username.to_ascii_lowercase()).cloned())
    }
}

/// Records uploads and hands back deterministic public URLs.
#[derive(Default)]
pub struct MockBlobStorage {
    fail: bool,
    uploads: Mutex<Vec<(PathBuf, String)>>,
}

impl MockBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn uploads(&self) -> Vec<(PathBuf, String)> {
        lock(&self.uploads).clone()
    }
}

#[async_trait]
impl BlobStorage for MockBlobStorage {
    async fn upload(&self, source: &Path, destination: &str) -> AdapterResult<String> {
        if self.fail {
            return Err(AdapterError::from_status(403, "permission denied"));
        }
        lock(&self.uploads).push((source.to_path_buf(), destination.to_string()));
        Ok(format!("https://storage.example.com/{destination}"))
    }
}

/// Writes a placeholder file instead of rendering.
#[derive(Default)]
pub struct MockVideoSynthesizer {
    fail: bool,
    captions: Mutex<Vec<String>>,
}

impl MockVideoSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn captions(&self) -> Vec<String> {
        lock(&self.captions).clone()
    }
}

#[async_trait]
impl VideoSynthesizer for MockVideoSynthesizer {
    async fn render(
        &self,
        caption: &str,
        _background: Option<&Path>,
        output: &Path,
    ) -> AdapterResult<()> {
        lock(&self.captions).push(caption.to_string());
        if self.fail {
            return Err(AdapterError::Unavailable("ffmpeg not installed".into()));
        }
        tokio::fs::write(output, b"mock video").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_text_replays_then_defaults() {
        let mock = MockTextGenerator::new("mock")
            .with_response("first")
            .with_failure("boom")
            .with_default("fallback");

        assert_eq!(mock.generate("a").await.unwrap(), "first");
        assert!(mock.generate("b").await.is_err());
        assert_eq!(mock.generate("c").await.unwrap(), "fallback");
        assert_eq!(mock.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_text_without_default_errors() {
        let mock = MockTextGenerator::new("mock");
        assert!(matches!(mock.generate("x").await, Err(AdapterError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_mock_social_search_serves_pages_in_order() {
        let mock = MockSocialSearch::new()
            .with_page(&["#eco @a"], Some("t1"))
            .with_page(&["@b"], None);

        let first = mock.search("q", 25, None).await.unwrap();
        assert_eq!(first.next_page_token.as_deref(), Some("t1"));
        let second = mock.search("q", 25, Some("t1")).await.unwrap();
        assert_eq!(second.results[0].text, "@b");
        assert!(mock.search("q", 25, None).await.unwrap().results.is_empty());
        assert_eq!(mock.search_tokens(), vec![None, Some("t1".to_string()), None]);
    }

    #[tokio::test]
    async fn test_mock_video_completes_after_pending() {
        let mock = MockVideoGenerator::completes_after(1, "https://cdn/x.mp4");
        let handle = mock.submit(&VideoRequest::new("p")).await.unwrap();
        assert_eq!(mock.poll(&handle).await.unwrap(), OperationStatus::Pending);
        assert!(matches!(mock.poll(&handle).await.unwrap(), OperationStatus::Done { .. }));
    }
}
