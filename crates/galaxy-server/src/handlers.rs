use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use galaxy_auth::Principal;
use galaxy_id::{GalaxyId, TWITTER_EPOCH};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::{error::ApiError, middleware::CurrentUser, state::AppState};

#[derive(Debug, Serialize)]
pub struct IdResponse {
    #[serde(with = "galaxy_id::as_string")]
    pub id: GalaxyId,
}

#[derive(Debug, Serialize)]
pub struct DecodedId {
    #[serde(with = "galaxy_id::as_string")]
    pub id: GalaxyId,
    pub unix_millis: u64,
    pub datacenter_id: u64,
    pub worker_id: u64,
    pub sequence: u64,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisteredAccount {
    pub account_id: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub account_id: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub account_id: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<&Principal> for SessionResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            account_id: principal.account_id.clone(),
            issued_at: principal.issued_at,
            expires_at: principal.expires_at,
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_id(State(state): State<Arc<AppState>>) -> Result<Json<IdResponse>, ApiError> {
    let id = state.next_id().await?;
    Ok(Json(IdResponse { id }))
}

pub async fn decode_id(Path(raw): Path<String>) -> Result<Json<DecodedId>, ApiError> {
    let id: GalaxyId = raw.parse()?;
    Ok(Json(DecodedId {
        id,
        unix_millis: id.unix_millis(TWITTER_EPOCH),
        datacenter_id: id.datacenter_id(),
        worker_id: id.worker_id(),
        sequence: id.sequence(),
    }))
}

/// Creates an account keyed by a freshly minted ID.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<RegisteredAccount>), ApiError> {
    let username = credentials.username.trim().to_owned();
    if username.is_empty() || credentials.password.is_empty() {
        return Err(ApiError::InvalidRequest(
            "username and password are required",
        ));
    }

    let account_id = state.next_id().await?.to_string();
    let accounts = state.accounts.clone();
    let account = tokio::task::spawn_blocking(move || {
        accounts.register(account_id, &username, &credentials.password)
    })
    .await??;

    Ok((
        StatusCode::CREATED,
        Json(RegisteredAccount {
            account_id: account.account_id,
            username: account.username,
        }),
    ))
}

/// Exchanges a username and password for a session token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    let accounts = state.accounts.clone();
    let account = tokio::task::spawn_blocking(move || {
        accounts.verify(credentials.username.trim(), &credentials.password)
    })
    .await??;

    let revocation = state.authorizer.revocation();
    let token = revocation.issue(&account.account_id)?;
    tracing::info!(account_id = %account.account_id, "session issued");

    Ok(Json(LoginResponse {
        token,
        account_id: account.account_id,
        expires_in: revocation.codec().lifetime_secs(),
    }))
}

pub async fn session(Extension(principal): Extension<Principal>) -> Json<SessionResponse> {
    Json(SessionResponse::from(&principal))
}

/// Works with or without credentials.
pub async fn whoami(Extension(CurrentUser(principal)): Extension<CurrentUser>) -> Json<Value> {
    match principal {
        Some(principal) => Json(json!({
            "authenticated": true,
            "account_id": principal.account_id,
        })),
        None => Json(json!({ "authenticated": false })),
    }
}

/// Revokes the token this request was authorized with.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<StatusCode, ApiError> {
    state
        .authorizer
        .revocation()
        .add_to_blacklist(&principal.token)
        .await?;
    tracing::info!(account_id = %principal.account_id, "session logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// Revokes every token issued to the caller's account so far.
pub async fn logout_all(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Result<StatusCode, ApiError> {
    state
        .authorizer
        .revocation()
        .invalidate_all_for_subject(&principal.account_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
