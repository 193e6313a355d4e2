//! # adcampaign-cli
//!
//! Configuration loading and adapter wiring behind the `adcampaign` binary.
//!
//! ```bash
//! # one run, fixture-backed social data
//! adcampaign run --description "EcoBottle: reusable water bottle, insulated"
//!
//! # HTTP server with live Twitter data
//! ADCAMPAIGN_MODE=live adcampaign serve --port 8080
//! ```

pub mod cli;
pub mod config;
pub mod wiring;

pub use cli::{Cli, Commands};
pub use config::{CampaignConfig, DataMode, TelemetryConfig, load_twitter_bearer};
pub use wiring::{build_runner, init_telemetry};
