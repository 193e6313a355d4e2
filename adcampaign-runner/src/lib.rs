//! # adcampaign-runner
//!
//! Run driver for the campaign pipeline.
//!
//! - [`Runner`] - creates a fresh session per run, drives the pipeline and
//!   appends every event to the session log
//! - [`RunContext`] - the [`StageContext`](adcampaign_core::StageContext) built
//!   from that session
//! - [`CampaignOutcome`] / [`RunStatus`] - what a finished run produced
//!
//! ```rust,ignore
//! let runner = Runner::new(RunnerConfig {
//!     app_name: "adcampaign".to_string(),
//!     pipeline: Arc::new(campaign_pipeline(adapters, data, assets)),
//!     session_service: Arc::new(InMemorySessionService::new()),
//! });
//! let outcome = runner.run_to_completion("demo-user", None, "EcoBottle ...").await?;
//! println!("{}", outcome.output());
//! ```

mod context;
mod runner;

pub use context::RunContext;
pub use runner::{CampaignOutcome, RunHandle, RunStatus, Runner, RunnerConfig, USER_AUTHOR};
