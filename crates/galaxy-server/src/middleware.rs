//! Bearer-token authorization for routes.
//!
//! [`require_auth`] rejects the request unless the token passes every
//! revocation check and stores the [`Principal`] in request extensions.
//! [`optional_auth`] never rejects; it stores a [`CurrentUser`] that is empty
//! for anonymous callers or when any check fails.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use galaxy_auth::Principal;
use std::sync::Arc;

use crate::{error::ApiError, state::AppState};

/// The caller as seen by [`optional_auth`].
#[derive(Clone, Debug, Default)]
pub struct CurrentUser(pub Option<Principal>);

fn authorization_header(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = authorization_header(&request);
    let principal = state
        .authorizer
        .authorize_header(header.as_deref())
        .await?;
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

pub async fn optional_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = authorization_header(&request);
    let principal = state
        .authorizer
        .authorize_optional(header.as_deref())
        .await;
    request.extensions_mut().insert(CurrentUser(principal));
    next.run(request).await
}
