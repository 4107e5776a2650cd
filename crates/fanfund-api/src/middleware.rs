use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

use fanfund_types::Role;

use crate::auth::{AppState, AppStateInner};
use crate::error::ApiError;
use crate::policy::Denial;

/// The authenticated caller, as attached to request extensions.
/// `subject` is 0 for the admin, otherwise the influencer/donor row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub role: Role,
    pub subject: i64,
}

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Pulls the token out of an `Authorization: Bearer <token>` header
/// value. The scheme is matched case-insensitively.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Resolves the Authorization header into an [`Identity`] request
/// extension. Never rejects: absent or bad tokens leave the request
/// anonymous for the guards below to judge.
pub async fn attach_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(identity) = resolve_identity(&state, req.headers()) {
        req.extensions_mut().insert(identity);
    }
    next.run(req).await
}

fn resolve_identity(state: &AppStateInner, headers: &HeaderMap) -> Option<Identity> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = bearer_token(header)?;
    let claims = state.tokens.verify(token, None).ok()?;
    let subject = claims.sub.parse::<i64>().ok()?;
    Some(Identity {
        role: claims.role,
        subject,
    })
}

/// Rejects with 401 unless [`attach_identity`] put an identity on the
/// request.
pub async fn require_auth(req: Request, next: Next) -> Response {
    if let Err(denial) = authenticated(req.extensions().get::<Identity>()) {
        return ApiError::from(denial).into_response();
    }
    next.run(req).await
}

/// Rejects with 401 when anonymous and 403 when the caller's role is
/// not in the allowed set.
pub async fn require_role(
    State(allowed): State<&'static [Role]>,
    req: Request,
    next: Next,
) -> Response {
    if let Err(denial) = role_allowed(req.extensions().get::<Identity>(), allowed) {
        return ApiError::from(denial).into_response();
    }
    next.run(req).await
}

/// Guard decision behind [`require_auth`], kept as a pure function.
pub fn authenticated(identity: Option<&Identity>) -> Result<Identity, Denial> {
    identity.copied().ok_or(Denial::Unauthenticated)
}

/// Guard decision behind [`require_role`]. Anonymous callers are
/// unauthenticated, not forbidden.
pub fn role_allowed(identity: Option<&Identity>, allowed: &[Role]) -> Result<Identity, Denial> {
    let identity = authenticated(identity)?;
    if allowed.contains(&identity.role) {
        Ok(identity)
    } else {
        Err(Denial::Forbidden)
    }
}

/// Optional identity for handlers on public routes whose behavior
/// changes when the caller is logged in.
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(parts.extensions.get::<Identity>().copied()))
    }
}
