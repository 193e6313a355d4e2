use crate::video::{GeneratedVideo, OperationStatus, VideoGenerator, VideoRequest};
use adcampaign_core::{AdapterError, AdapterResult};
use std::time::Duration;
use tokio::time::Instant;

/// Bounds on waiting for a long-running operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { max_attempts: 36, interval: Duration::from_secs(10), timeout: Duration::from_secs(360) }
    }
}

impl PollPolicy {
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Submits a video request and polls it until it finishes, fails, or the
/// policy runs out. Never polls more than `max_attempts` times and never
/// sleeps past `timeout`.
pub async fn generate_video_with_polling(
    generator: &dyn VideoGenerator,
    request: &VideoRequest,
    policy: &PollPolicy,
) -> AdapterResult<GeneratedVideo> {
    let started = Instant::now();
    let handle = generator.submit(request).await?;

    for attempt in 1..=policy.max_attempts {
        match generator.poll(&handle).await? {
            OperationStatus::Done { video } => {
                tracing::info!(attempt, operation = handle.name(), "video generation finished");
                return Ok(video);
            }
            OperationStatus::Failed { message } => return Err(AdapterError::OperationFailed(message)),
            OperationStatus::Pending => {
                tracing::debug!(attempt, operation = handle.name(), "video still rendering");
            }
        }

        if attempt == policy.max_attempts || started.elapsed() + policy.interval > policy.timeout {
            break;
        }
        tokio::time::sleep(policy.interval).await;
    }

    Err(AdapterError::Timeout { elapsed: started.elapsed() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockVideoGenerator;

    #[tokio::test(start_paused = true)]
    async fn test_completes_after_pending_polls() {
        let generator = MockVideoGenerator::completes_after(3, "https://cdn.example/ad.mp4");
        let video = generate_video_with_polling(&generator, &VideoRequest::new("x"), &PollPolicy::default())
            .await
            .unwrap();
        assert_eq!(video, GeneratedVideo::uri("https://cdn.example/ad.mp4"));
        assert_eq!(generator.poll_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_completes_times_out_within_budget() {
        let generator = MockVideoGenerator::never_completes();
        let policy = PollPolicy::default();
        let started = Instant::now();

        let err = generate_video_with_polling(&generator, &VideoRequest::new("x"), &policy)
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(generator.poll_count() <= policy.max_attempts);
        assert!(started.elapsed() <= policy.timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_cap_binds_before_timeout() {
        let generator = MockVideoGenerator::never_completes();
        let policy = PollPolicy::default().with_max_attempts(3).with_interval(Duration::from_secs(1));

        let err = generate_video_with_polling(&generator, &VideoRequest::new("x"), &policy)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(generator.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_failure_is_reported() {
        let generator = MockVideoGenerator::fails_with("quota exhausted");
        let err = generate_video_with_polling(&generator, &VideoRequest::new("x"), &PollPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::OperationFailed(m) if m == "quota exhausted"));
    }
}
