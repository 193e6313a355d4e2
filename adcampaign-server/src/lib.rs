//! # adcampaign-server
//!
//! axum front door for the campaign pipeline.
//!
//! | route | purpose |
//! |---|---|
//! | `POST /generate_campaign` | run the pipeline for `{"description": ...}` |
//! | `GET /campaigns/{session_id}` | stored state and event log of a past run |
//! | `GET /health` | liveness |

pub mod config;
pub mod rest;

pub use config::{DEFAULT_USER_ID, SecurityConfig, ServerConfig};
pub use rest::{CampaignController, SessionController, create_app, serve};
