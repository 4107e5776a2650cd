use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::info;

use fanfund_auth::constant_time_eq;
use fanfund_auth::password;
use fanfund_auth::token::TokenCodec;
use fanfund_db::Database;
use fanfund_types::Role;
use fanfund_types::api::{LoginRequest, LoginResponse};

use crate::error::ApiError;
use crate::run_blocking;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenCodec,
    pub admin_password: String,
    pub token_ttl_seconds: i64,
}

/// Subject id carried by admin tokens. The admin is not a database row.
pub const ADMIN_SUBJECT: i64 = 0;

pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required"));
    }

    if !constant_time_eq(req.password.as_bytes(), state.admin_password.as_bytes()) {
        return Err(ApiError::InvalidCredentials);
    }

    Ok(Json(issue(&state, Role::Admin, ADMIN_SUBJECT)))
}

/// Unknown id, missing credential, and wrong password all collapse into
/// the same 401 so the endpoint cannot be used to enumerate accounts.
pub async fn influencer_login(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required"));
    }

    let db = state.clone();
    let verified = run_blocking(move || {
        let credential = db.db.get_influencer_credential(id)?;
        Ok(credential.is_some_and(|c| password::verify_password(&req.password, &c)))
    })
    .await?;

    if !verified {
        return Err(ApiError::InvalidCredentials);
    }

    Ok(Json(issue(&state, Role::Influencer, id)))
}

pub async fn donor_login(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.password.is_empty() {
        return Err(ApiError::BadRequest("Password is required"));
    }

    let db = state.clone();
    let verified = run_blocking(move || {
        let credential = db.db.get_donor_credential(id)?;
        Ok(credential.is_some_and(|c| password::verify_password(&req.password, &c)))
    })
    .await?;

    if !verified {
        return Err(ApiError::InvalidCredentials);
    }

    Ok(Json(issue(&state, Role::Donor, id)))
}

pub(crate) fn issue(state: &AppStateInner, role: Role, subject: i64) -> LoginResponse {
    let token = state
        .tokens
        .sign(subject, role, state.token_ttl_seconds, None);
    info!("Issued {} token for subject {}", role.as_str(), subject);
    LoginResponse {
        token,
        role,
        subject,
        expires_in: state.token_ttl_seconds,
    }
}
