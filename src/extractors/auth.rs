use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::future::Future;
use std::sync::Arc;

use crate::{auth, engine::Customer, AppError, AppState};

const SESSION_COOKIE: &str = "__session";

/// Extracts the JWT from the Authorization header (mobile) or the __session cookie (web)
async fn extract_token_from_request(parts: &mut Parts) -> Option<String> {
    if let Ok(TypedHeader(Authorization(bearer))) = parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
        return Some(bearer.token().to_string());
    }

    let cookie_str = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_str
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

impl AuthenticatedUser {
    pub fn as_customer(&self) -> Customer {
        Customer {
            id: self.user_id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

fn authenticate(token: &str, state: &AppState) -> Result<AuthenticatedUser, AppError> {
    let claims = auth::validate_jwt(token, &state.config.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        AppError::Unauthorized(e)
    })?;

    Ok(AuthenticatedUser {
        user_id: claims.sub,
        name: claims.name.unwrap_or_default(),
        email: claims.email.unwrap_or_default(),
    })
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let state = state.clone();

        async move {
            let token = extract_token_from_request(parts).await.ok_or_else(|| {
                AppError::Unauthorized(
                    "Missing authentication: no __session cookie or Authorization header".to_string(),
                )
            })?;

            authenticate(&token, &state)
        }
    }
}

/// Identity when present. A request without any token yields `None` so the
/// booking flow can answer "please sign in" itself; a bad token is still 401.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl FromRequestParts<Arc<AppState>> for MaybeUser {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let state = state.clone();

        async move {
            match extract_token_from_request(parts).await {
                Some(token) => authenticate(&token, &state).map(|user| MaybeUser(Some(user))),
                None => Ok(MaybeUser(None)),
            }
        }
    }
}
