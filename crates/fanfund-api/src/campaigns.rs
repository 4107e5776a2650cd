use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{info, warn};

use fanfund_db::models::CampaignRow;
use fanfund_db::queries::DonationFilter;
use fanfund_types::CampaignStatus;
use fanfund_types::api::{Campaign, CampaignDetail, CreateCampaignRequest, UpdateCampaignRequest};

use crate::auth::AppState;
use crate::donations::donation_from_row;
use crate::error::ApiError;
use crate::middleware::{self, MaybeIdentity};
use crate::policy::{self, Action, Ownership, Resource};
use crate::run_blocking;
use crate::time::parse_db_time;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignListQuery {
    pub influencer_id: Option<i64>,
    pub status: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CampaignListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(
            CampaignStatus::parse(raw).ok_or(ApiError::BadRequest("Invalid campaign status"))?,
        ),
        None => None,
    };

    let db = state.clone();
    let campaigns = run_blocking(move || {
        let rows = db
            .db
            .list_campaigns(query.influencer_id, status.map(|s| s.as_str()))?;
        Ok(rows.into_iter().map(campaign_from_row).collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(campaigns))
}

/// Campaign plus its full donation history.
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let detail = run_blocking(move || {
        let row = db
            .db
            .get_campaign(id)?
            .ok_or(ApiError::NotFound("Campaign not found"))?;
        let donations = db.db.list_donations(&DonationFilter {
            campaign_id: Some(id),
            ..Default::default()
        })?;
        Ok(CampaignDetail {
            campaign: campaign_from_row(row),
            donations: donations.into_iter().map(donation_from_row).collect(),
        })
    })
    .await?;

    Ok(Json(detail))
}

pub async fn create(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    policy::evaluate(
        identity.as_ref(),
        Resource::Campaign,
        Action::Create,
        Ownership::influencer(req.influencer_id),
    )?;
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required"));
    }
    if !req.goal_amount.is_finite() || req.goal_amount <= 0.0 {
        return Err(ApiError::BadRequest("Goal amount must be a positive number"));
    }

    let db = state.clone();
    let campaign = run_blocking(move || {
        if db.db.get_influencer(req.influencer_id)?.is_none() {
            return Err(ApiError::NotFound("Influencer not found"));
        }

        let id = db.db.create_campaign(
            req.influencer_id,
            &req.title,
            req.description.as_deref().unwrap_or(""),
            req.goal_amount,
        )?;
        let row = db
            .db
            .get_campaign(id)?
            .ok_or_else(|| anyhow::anyhow!("campaign {} vanished after insert", id))?;
        Ok(campaign_from_row(row))
    })
    .await?;

    info!(
        "Campaign {} created for influencer {}",
        campaign.id, campaign.influencer_id
    );
    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    MaybeIdentity(identity): MaybeIdentity,
    Json(req): Json<UpdateCampaignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let caller = middleware::authenticated(identity.as_ref())?;

    let db = state.clone();
    let owner = run_blocking(move || {
        Ok(db.db.get_campaign(id)?.map(|row| row.influencer_id))
    })
    .await?
    .ok_or(ApiError::NotFound("Campaign not found"))?;

    policy::evaluate(
        Some(&caller),
        Resource::Campaign,
        Action::Update,
        Ownership::influencer(owner),
    )?;
    if let Some(goal) = req.goal_amount {
        if !goal.is_finite() || goal <= 0.0 {
            return Err(ApiError::BadRequest("Goal amount must be a positive number"));
        }
    }

    let db = state.clone();
    let campaign = run_blocking(move || {
        let found = db.db.update_campaign(
            id,
            req.title.as_deref(),
            req.description.as_deref(),
            req.goal_amount,
            req.status.map(|s| s.as_str()),
        )?;
        if !found {
            return Err(ApiError::NotFound("Campaign not found"));
        }
        let row = db
            .db
            .get_campaign(id)?
            .ok_or(ApiError::NotFound("Campaign not found"))?;
        Ok(campaign_from_row(row))
    })
    .await?;

    Ok(Json(campaign))
}

/// Deleting a campaign drops its donations with it.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    MaybeIdentity(identity): MaybeIdentity,
) -> Result<impl IntoResponse, ApiError> {
    let caller = middleware::authenticated(identity.as_ref())?;

    let db = state.clone();
    let owner = run_blocking(move || {
        Ok(db.db.get_campaign(id)?.map(|row| row.influencer_id))
    })
    .await?
    .ok_or(ApiError::NotFound("Campaign not found"))?;

    policy::evaluate(
        Some(&caller),
        Resource::Campaign,
        Action::Delete,
        Ownership::influencer(owner),
    )?;

    let db = state.clone();
    run_blocking(move || {
        if !db.db.delete_campaign(id)? {
            return Err(ApiError::NotFound("Campaign not found"));
        }
        Ok(())
    })
    .await?;

    info!("Campaign {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn campaign_from_row(row: CampaignRow) -> Campaign {
    Campaign {
        id: row.id,
        influencer_id: row.influencer_id,
        influencer_name: row.influencer_name,
        title: row.title,
        description: row.description,
        goal_amount: row.goal_amount,
        current_amount: row.current_amount,
        status: CampaignStatus::parse(&row.status).unwrap_or_else(|| {
            warn!("Unknown status '{}' on campaign {}", row.status, row.id);
            CampaignStatus::default()
        }),
        created_at: parse_db_time(&row.created_at),
        updated_at: parse_db_time(&row.updated_at),
    }
}
