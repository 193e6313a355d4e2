pub mod campaign;
pub mod session;

pub use campaign::CampaignController;
pub use session::SessionController;
