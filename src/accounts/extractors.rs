use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::repo::Account;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolves the `Authorization` header to the account owning the presented
/// bearer token. Protected handlers take this ahead of any body extractor,
/// so nothing is read or written before the caller is known.
pub struct AuthAccount(pub Account);

/// The `Bearer ` prefix is optional; a bare token is accepted as-is.
fn bearer_token(header: Option<&str>) -> Option<&str> {
    header.map(|h| h.strip_prefix("Bearer ").unwrap_or(h))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token =
            bearer_token(header).ok_or_else(|| ApiError::Unauthorized("missing token".into()))?;

        let account = Account::find_by_token(&state.db, token)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("invalid token".into()))?;

        Ok(AuthAccount(account))
    }
}
