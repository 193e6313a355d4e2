//! # adcampaign-adapters
//!
//! Everything the pipeline stages talk to outside the process.
//!
//! Each concern is a trait with a live implementation and a scripted mock:
//!
//! | Trait | Live | Mock |
//! |-------|------|------|
//! | [`TextGenerator`] | [`GeminiTextModel`] | [`MockTextGenerator`] |
//! | [`ImageGenerator`] | [`ImagenClient`] | [`MockImageGenerator`] |
//! | [`VideoGenerator`] | [`VeoClient`] | [`MockVideoGenerator`] |
//! | [`SocialSearch`] | [`TwitterClient`] | [`MockSocialSearch`] |
//! | [`BlobStorage`] | [`GcsStorage`], [`LocalStorage`] | [`MockBlobStorage`] |
//! | [`VideoSynthesizer`] | [`FfmpegSynthesizer`] | [`MockVideoSynthesizer`] |
//!
//! All adapters report [`AdapterError`](adcampaign_core::AdapterError); callers
//! decide whether a failure is recoverable.

pub mod fixtures;
mod http;
pub mod image;
pub mod mock;
pub mod poll;
pub mod render;
pub mod retry;
pub mod social;
pub mod storage;
pub mod text;
pub mod video;

pub use fixtures::{load_influencers, load_social_metrics};
pub use http::VertexConfig;
pub use image::{GeneratedImage, ImageGenerator, ImagenClient};
pub use mock::{
    MockBlobStorage, MockImageGenerator, MockSocialSearch, MockTextGenerator, MockVideoGenerator,
    MockVideoSynthesizer,
};
pub use poll::{PollPolicy, generate_video_with_polling};
pub use render::{FfmpegSynthesizer, VideoSynthesizer};
pub use retry::{RetryPolicy, with_retry};
pub use social::{Post, SearchPage, SocialProfile, SocialSearch, TwitterClient};
pub use storage::{BlobStorage, GcsStorage, LocalStorage};
pub use text::{GeminiTextModel, TextGenerator};
pub use video::{
    GeneratedVideo, OperationHandle, OperationStatus, VeoClient, VideoGenerator, VideoRequest,
    download_video, save_video,
};
