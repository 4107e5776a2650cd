/// Database row types mapping directly to SQLite rows.
/// Distinct from the fanfund-types API models so the DB layer stays
/// independent of the wire format. Credential columns never appear here;
/// they are reachable only through the dedicated credential queries.

pub struct InfluencerRow {
    pub id: i64,
    pub name: String,
    pub bio: String,
    pub avatar_url: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct DonorRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct CampaignRow {
    pub id: i64,
    pub influencer_id: i64,
    pub influencer_name: String,
    pub title: String,
    pub description: String,
    pub goal_amount: f64,
    pub current_amount: f64,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug)]
pub struct DonationRow {
    pub id: i64,
    pub donor_id: i64,
    pub donor_name: String,
    pub campaign_id: i64,
    pub campaign_title: String,
    pub campaign_influencer_id: i64,
    pub amount: f64,
    pub message: String,
    pub created_at: String,
}
