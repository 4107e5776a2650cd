use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CampaignStatus, Role};

// -- Token claims --

/// Payload of a session token. Canonical definition lives here in
/// fanfund-types so the codec and the HTTP middleware share one shape.
/// `sub` is the stringified entity id (`"0"` for the admin account).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub subject: i64,
    pub expires_in: i64,
}

// -- Influencers --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Influencer {
    pub id: i64,
    pub name: String,
    pub bio: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateInfluencerRequest {
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateInfluencerRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InfluencerSignupResponse {
    pub influencer: Influencer,
    pub token: String,
}

// -- Donors --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateDonorRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateDonorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DonorSignupResponse {
    pub donor: Donor,
    pub token: String,
}

// -- Campaigns --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: i64,
    pub influencer_id: i64,
    pub influencer_name: String,
    pub title: String,
    pub description: String,
    pub goal_amount: f64,
    pub current_amount: f64,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Single-campaign view: the campaign plus its donation history.
#[derive(Debug, Serialize)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub donations: Vec<Donation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCampaignRequest {
    pub influencer_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub goal_amount: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateCampaignRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal_amount: Option<f64>,
    pub status: Option<CampaignStatus>,
}

// -- Donations --

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: i64,
    pub donor_id: i64,
    pub donor_name: String,
    pub campaign_id: i64,
    pub campaign_title: String,
    pub amount: f64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateDonationRequest {
    pub donor_id: i64,
    pub campaign_id: i64,
    pub amount: f64,
    pub message: Option<String>,
}

// -- Statistics --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOverview {
    pub total_influencers: i64,
    pub total_campaigns: i64,
    pub total_donors: i64,
    pub total_donations: i64,
    pub total_donation_amount: f64,
    pub average_donation_amount: f64,
}

#[derive(Debug, Serialize)]
pub struct CampaignStatusCounts {
    pub active: i64,
    pub completed: i64,
    pub cancelled: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub overview: StatsOverview,
    pub campaigns: CampaignStatusCounts,
    pub recent_donations: Vec<Donation>,
    pub top_campaigns: Vec<Campaign>,
}
