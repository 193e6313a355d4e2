//! # adcampaign-telemetry
//!
//! Structured logging for the campaign pipeline built on `tracing`.
//!
//! ## Usage
//!
//! ```rust
//! use adcampaign_telemetry::{init_telemetry, info};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_telemetry("adcampaign")?;
//!     info!("pipeline ready");
//!     Ok(())
//! }
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Instrument, Span, debug, error, info, instrument, trace, warn};

pub use init::{LogFormat, init_telemetry, init_telemetry_with_format, init_with_otlp, shutdown_telemetry};
pub use spans::*;
