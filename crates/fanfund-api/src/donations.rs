use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;

use fanfund_db::ledger::NewDonation;
use fanfund_db::models::DonationRow;
use fanfund_db::queries::DonationFilter;
use fanfund_types::api::{CreateDonationRequest, Donation};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::Identity;
use crate::policy::{self, Action, DonationVisibility, Ownership, Resource};
use crate::run_blocking;
use crate::time::parse_db_time;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationListQuery {
    pub campaign_id: Option<i64>,
    pub donor_id: Option<i64>,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<CreateDonationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    policy::evaluate(
        Some(&identity),
        Resource::Donation,
        Action::Create,
        Ownership::donor(req.donor_id),
    )?;
    if !req.amount.is_finite() || req.amount <= 0.0 {
        return Err(ApiError::BadRequest(
            "Donation amount must be a positive number",
        ));
    }

    let db = state.clone();
    let donation = run_blocking(move || {
        let row = db.db.record_donation(&NewDonation {
            donor_id: req.donor_id,
            campaign_id: req.campaign_id,
            amount: req.amount,
            message: req.message.as_deref().unwrap_or(""),
        })?;
        Ok(donation_from_row(row))
    })
    .await?;

    Ok((StatusCode::CREATED, Json(donation)))
}

/// Listing is visibility-scoped rather than guarded: every
/// authenticated caller gets a list, but only of rows their role may
/// see.
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<DonationListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = match policy::donation_visibility(&identity) {
        DonationVisibility::All => DonationFilter {
            campaign_id: query.campaign_id,
            donor_id: query.donor_id,
            campaign_owner: None,
        },
        DonationVisibility::OwnDonations(donor) => {
            // A donor asking for someone else's donations sees nothing.
            if query.donor_id.is_some_and(|requested| requested != donor) {
                return Ok(Json(Vec::<Donation>::new()));
            }
            DonationFilter {
                campaign_id: query.campaign_id,
                donor_id: Some(donor),
                campaign_owner: None,
            }
        }
        DonationVisibility::OwnCampaigns(influencer) => DonationFilter {
            campaign_id: query.campaign_id,
            donor_id: query.donor_id,
            campaign_owner: Some(influencer),
        },
    };

    let db = state.clone();
    let donations = run_blocking(move || {
        let rows = db.db.list_donations(&filter)?;
        Ok(rows.into_iter().map(donation_from_row).collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(donations))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let row = run_blocking(move || {
        db.db
            .get_donation(id)?
            .ok_or(ApiError::NotFound("Donation not found"))
    })
    .await?;

    policy::evaluate(
        Some(&identity),
        Resource::Donation,
        Action::View,
        Ownership::donation(row.donor_id, row.campaign_influencer_id),
    )?;

    Ok(Json(donation_from_row(row)))
}

/// Admin-only reversal: the row disappears and the campaign total drops
/// by the donated amount.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    policy::evaluate(
        Some(&identity),
        Resource::Donation,
        Action::Delete,
        Ownership::none(),
    )?;

    let db = state.clone();
    run_blocking(move || Ok(db.db.reverse_donation(id)?)).await?;

    info!("Donation {} reversed", id);
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn donation_from_row(row: DonationRow) -> Donation {
    Donation {
        id: row.id,
        donor_id: row.donor_id,
        donor_name: row.donor_name,
        campaign_id: row.campaign_id,
        campaign_title: row.campaign_title,
        amount: row.amount,
        message: row.message,
        created_at: parse_db_time(&row.created_at),
    }
}
