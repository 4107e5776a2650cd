use axum::{Json, extract::State, response::IntoResponse};

use fanfund_types::api::{CampaignStatusCounts, StatsOverview, StatsResponse};

use crate::auth::AppState;
use crate::campaigns::campaign_from_row;
use crate::donations::donation_from_row;
use crate::error::ApiError;
use crate::run_blocking;

const RECENT_DONATIONS: u32 = 10;
const TOP_CAMPAIGNS: u32 = 5;

/// Admin dashboard numbers: one response, four aggregate queries.
pub async fn overview(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let response = run_blocking(move || {
        let totals = db.db.stats_totals()?;
        let status = db.db.campaign_status_counts()?;
        let recent = db.db.recent_donations(RECENT_DONATIONS)?;
        let top = db.db.top_campaigns(TOP_CAMPAIGNS)?;

        Ok(StatsResponse {
            overview: StatsOverview {
                total_influencers: totals.influencers,
                total_campaigns: totals.campaigns,
                total_donors: totals.donors,
                total_donations: totals.donations,
                total_donation_amount: totals.donation_sum,
                average_donation_amount: totals.donation_avg,
            },
            campaigns: CampaignStatusCounts {
                active: status.active,
                completed: status.completed,
                cancelled: status.cancelled,
            },
            recent_donations: recent.into_iter().map(donation_from_row).collect(),
            top_campaigns: top.into_iter().map(campaign_from_row).collect(),
        })
    })
    .await?;

    Ok(Json(response))
}
