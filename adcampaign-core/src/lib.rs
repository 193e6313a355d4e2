//! # adcampaign-core
//!
//! Core traits and types for the ad campaign pipeline.
//!
//! ## Overview
//!
//! - [`Stage`] - one unit of the sequential pipeline
//! - [`StageContext`] / [`SessionStore`] - the per-run context every stage receives
//! - [`StageEvent`] - immutable progress records streamed by stages
//! - [`CampaignError`] / [`AdapterError`] - fatal vs. recoverable failures
//! - [`state`] - typed access to the `product_info`, `social_metrics`,
//!   `influencers` and `ads` keys
//!
//! ## Stage contract
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait Stage: Send + Sync {
//!     fn name(&self) -> &str;
//!     fn description(&self) -> &str;
//!     fn required_keys(&self) -> &[&'static str];
//!     async fn execute(&self, ctx: Arc<dyn StageContext>) -> Result<EventStream>;
//! }
//! ```

pub mod context;
pub mod error;
pub mod event;
pub mod parse;
pub mod stage;
pub mod state;
pub mod types;

pub use context::{InMemoryStore, SessionStore, StageContext};
pub use error::{AdapterError, AdapterResult, CampaignError, Result};
pub use event::{EventStream, StageEvent};
pub use parse::{ProductParse, parse_product_info, strip_code_fence};
pub use stage::Stage;
pub use state::StateKey;
pub use types::{AdAsset, Ads, InfluencerProfile, POPULARITY_THRESHOLD, ProductInfo, SocialMetrics};
