pub mod api;
pub mod models;

pub use models::{CampaignStatus, Credential, Role};
