//! Learner token authentication.
//!
//! Every `/api` route except registration runs behind [`auth_middleware`],
//! which turns an `Authorization: Bearer <token>` header into an
//! [`AuthenticatedLearner`] request extension.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::AppState;

const BEARER: &str = "Bearer ";

#[derive(Clone, Debug)]
pub struct AuthenticatedLearner {
    pub learner_id: Uuid,
    pub token: String,
}

/// Pull the learner token out of the request headers.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::NotAuthenticated("no learner token supplied".to_string()))?;

    value
        .to_str()
        .ok()
        .and_then(|raw| raw.strip_prefix(BEARER))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::NotAuthenticated("expected a bearer learner token".to_string()))
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let token = bearer_token(request.headers())?.to_string();

    let Some(learner) = state.db.get_learner_by_token(&token).await? else {
        return Err(ApiError::NotAuthenticated(
            "learner token not recognized".to_string(),
        ));
    };
    state.db.update_last_seen(learner.id).await?;

    request.extensions_mut().insert(AuthenticatedLearner {
        learner_id: learner.id,
        token,
    });
    Ok(next.run(request).await)
}
