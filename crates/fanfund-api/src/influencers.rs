use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use fanfund_auth::password;
use fanfund_db::models::InfluencerRow;
use fanfund_types::Role;
use fanfund_types::api::{
    CreateInfluencerRequest, Influencer, InfluencerSignupResponse, UpdateInfluencerRequest,
};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::Identity;
use crate::policy::{self, Action, Ownership, Resource};
use crate::run_blocking;
use crate::time::parse_db_time;

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let influencers = run_blocking(move || {
        let rows = db.db.list_influencers()?;
        Ok(rows.into_iter().map(influencer_from_row).collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(influencers))
}

/// Public signup. Account creation doubles as a login: the response
/// carries a session token for the new account.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<CreateInfluencerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required"));
    }
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required"));
    }

    let db = state.clone();
    let influencer = run_blocking(move || {
        let credential = password::hash_password(&req.password).map_err(anyhow::Error::from)?;
        let id = db.db.create_influencer(
            &req.name,
            req.bio.as_deref().unwrap_or(""),
            req.avatar_url.as_deref().unwrap_or(""),
            &credential,
        )?;
        let row = db
            .db
            .get_influencer(id)?
            .ok_or_else(|| anyhow::anyhow!("influencer {} vanished after insert", id))?;
        Ok(influencer_from_row(row))
    })
    .await?;

    info!("Influencer {} signed up", influencer.id);
    let token = state
        .tokens
        .sign(influencer.id, Role::Influencer, state.token_ttl_seconds, None);

    Ok((
        StatusCode::CREATED,
        Json(InfluencerSignupResponse { influencer, token }),
    ))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    policy::evaluate(
        Some(&identity),
        Resource::Influencer,
        Action::View,
        Ownership::influencer(id),
    )?;

    let db = state.clone();
    let influencer = run_blocking(move || {
        let row = db
            .db
            .get_influencer(id)?
            .ok_or(ApiError::NotFound("Influencer not found"))?;
        Ok(influencer_from_row(row))
    })
    .await?;

    Ok(Json(influencer))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<UpdateInfluencerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    policy::evaluate(
        Some(&identity),
        Resource::Influencer,
        Action::Update,
        Ownership::influencer(id),
    )?;
    if matches!(req.password.as_deref(), Some("")) {
        return Err(ApiError::BadRequest("Password cannot be empty"));
    }

    let db = state.clone();
    let influencer = run_blocking(move || {
        let found = db.db.update_influencer(
            id,
            req.name.as_deref(),
            req.bio.as_deref(),
            req.avatar_url.as_deref(),
        )?;
        if !found {
            return Err(ApiError::NotFound("Influencer not found"));
        }

        // A new password mints a whole new credential, fresh salt included.
        if let Some(pw) = &req.password {
            let credential = password::hash_password(pw).map_err(anyhow::Error::from)?;
            db.db.update_influencer_credential(id, &credential)?;
        }

        let row = db
            .db
            .get_influencer(id)?
            .ok_or(ApiError::NotFound("Influencer not found"))?;
        Ok(influencer_from_row(row))
    })
    .await?;

    Ok(Json(influencer))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    policy::evaluate(
        Some(&identity),
        Resource::Influencer,
        Action::Delete,
        Ownership::influencer(id),
    )?;

    let db = state.clone();
    run_blocking(move || {
        if !db.db.delete_influencer(id)? {
            return Err(ApiError::NotFound("Influencer not found"));
        }
        Ok(())
    })
    .await?;

    info!("Influencer {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn influencer_from_row(row: InfluencerRow) -> Influencer {
    Influencer {
        id: row.id,
        name: row.name,
        bio: row.bio,
        avatar_url: row.avatar_url,
        created_at: parse_db_time(&row.created_at),
        updated_at: parse_db_time(&row.updated_at),
    }
}
