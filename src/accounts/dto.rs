use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::Account;

/// Request body for signup. Fields default to empty so a missing field is
/// reported by the handler's own validation, not a body-parse rejection.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub newsletter: bool,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Returned after signup and login. The token is the account's stable
/// bearer credential, never rotated by login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub id: Uuid,
    #[serde(rename = "authToken")]
    pub auth_token: String,
    pub account: AuthResponseAccount,
}

#[derive(Debug, Serialize)]
pub struct AuthResponseAccount {
    pub username: String,
}

impl AuthResponse {
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.id,
            auth_token: account.auth_token.clone(),
            account: AuthResponseAccount {
                username: account.username.clone(),
            },
        }
    }
}

/// Owner projection embedded in offer responses. Display fields only.
#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub username: String,
    pub avatar: Option<serde_json::Value>,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            avatar: account.avatar.clone(),
        }
    }
}
