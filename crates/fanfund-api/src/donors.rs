use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use fanfund_auth::password;
use fanfund_db::models::DonorRow;
use fanfund_db::queries::DeleteOutcome;
use fanfund_types::Role;
use fanfund_types::api::{CreateDonorRequest, Donor, DonorSignupResponse, UpdateDonorRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::Identity;
use crate::policy::{self, Action, Ownership, Resource};
use crate::run_blocking;
use crate::time::parse_db_time;

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let donors = run_blocking(move || {
        let rows = db.db.list_donors()?;
        Ok(rows.into_iter().map(donor_from_row).collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(donors))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<CreateDonorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required"));
    }
    if req.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Email is required"));
    }
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required"));
    }

    let db = state.clone();
    let donor = run_blocking(move || {
        if db.db.get_donor_by_email(&req.email)?.is_some() {
            return Err(ApiError::Conflict("Email already registered"));
        }

        let credential = password::hash_password(&req.password).map_err(anyhow::Error::from)?;
        let id = db.db.create_donor(&req.name, &req.email, &credential)?;
        let row = db
            .db
            .get_donor(id)?
            .ok_or_else(|| anyhow::anyhow!("donor {} vanished after insert", id))?;
        Ok(donor_from_row(row))
    })
    .await?;

    info!("Donor {} signed up", donor.id);
    let token = state
        .tokens
        .sign(donor.id, Role::Donor, state.token_ttl_seconds, None);

    Ok((StatusCode::CREATED, Json(DonorSignupResponse { donor, token })))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    policy::evaluate(
        Some(&identity),
        Resource::Donor,
        Action::View,
        Ownership::donor(id),
    )?;

    let db = state.clone();
    let donor = run_blocking(move || {
        let row = db
            .db
            .get_donor(id)?
            .ok_or(ApiError::NotFound("Donor not found"))?;
        Ok(donor_from_row(row))
    })
    .await?;

    Ok(Json(donor))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<UpdateDonorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    policy::evaluate(
        Some(&identity),
        Resource::Donor,
        Action::Update,
        Ownership::donor(id),
    )?;
    if matches!(req.password.as_deref(), Some("")) {
        return Err(ApiError::BadRequest("Password cannot be empty"));
    }

    let db = state.clone();
    let donor = run_blocking(move || {
        if let Some(email) = &req.email {
            if let Some(existing) = db.db.get_donor_by_email(email)? {
                if existing.id != id {
                    return Err(ApiError::Conflict("Email already registered"));
                }
            }
        }

        let found = db
            .db
            .update_donor(id, req.name.as_deref(), req.email.as_deref())?;
        if !found {
            return Err(ApiError::NotFound("Donor not found"));
        }

        if let Some(pw) = &req.password {
            let credential = password::hash_password(pw).map_err(anyhow::Error::from)?;
            db.db.update_donor_credential(id, &credential)?;
        }

        let row = db
            .db
            .get_donor(id)?
            .ok_or(ApiError::NotFound("Donor not found"))?;
        Ok(donor_from_row(row))
    })
    .await?;

    Ok(Json(donor))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    policy::evaluate(
        Some(&identity),
        Resource::Donor,
        Action::Delete,
        Ownership::donor(id),
    )?;

    let db = state.clone();
    run_blocking(move || match db.db.delete_donor(id)? {
        DeleteOutcome::Deleted => Ok(()),
        DeleteOutcome::Missing => Err(ApiError::NotFound("Donor not found")),
        DeleteOutcome::Blocked => Err(ApiError::Conflict("Donor has existing donations")),
    })
    .await?;

    info!("Donor {} deleted", id);
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn donor_from_row(row: DonorRow) -> Donor {
    Donor {
        id: row.id,
        name: row.name,
        email: row.email,
        created_at: parse_db_time(&row.created_at),
        updated_at: parse_db_time(&row.updated_at),
    }
}
