pub mod inmemory;
pub mod service;
pub mod session;

pub use inmemory::{DEFAULT_MAX_SESSIONS, InMemorySessionService};
pub use service::{CreateRequest, SessionService};
pub use session::{CampaignRun, Session};
