use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use super::credentials::{compute_hash, generate_token, SALT_BYTES, TOKEN_BYTES};
use super::dto::{AuthResponse, LoginRequest, SignupRequest};
use super::repo::Account;

/// One wording for unknown email and wrong password, so responses do not
/// reveal which accounts exist.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/signup", post(signup))
        .route("/user/login", post(login))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    if payload.email.is_empty() || payload.username.is_empty() || payload.password.is_empty() {
        warn!("signup with missing fields");
        return Err(ApiError::Validation("Missing fields".into()));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    if Account::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let salt = generate_token(SALT_BYTES);
    let hash = compute_hash(&payload.password, &salt);
    let token = generate_token(TOKEN_BYTES);

    let account = Account::create(
        &state.db,
        &payload.email,
        &payload.username,
        payload.newsletter,
        &salt,
        &hash,
        &token,
    )
    .await?;

    info!(account_id = %account.id, "account created");
    Ok((StatusCode::CREATED, Json(AuthResponse::from_account(&account))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if payload.email.is_empty() || payload.password.is_empty() {
        warn!("login with missing fields");
        return Err(ApiError::Validation("Missing fields".into()));
    }

    let account = match Account::find_by_email(&state.db, &payload.email).await? {
        Some(a) => a,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
    };

    if compute_hash(&payload.password, &account.password_salt) != account.password_hash {
        warn!(account_id = %account.id, "login invalid password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    // the stored token is reused; login never rotates credentials
    info!(account_id = %account.id, "login");
    Ok(Json(AuthResponse::from_account(&account)))
}
