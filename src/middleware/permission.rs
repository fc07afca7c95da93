use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use serde::Serialize;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Role,
    utils::verify_token,
    AppState,
};

pub const AUTH_COOKIE: &str = "auth_token";

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const ADMIN_OR_MANAGER: &[Role] = &[Role::Admin, Role::Manager];

/// Identity resolved from the request's access token.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn require(&self, allowed: &[Role]) -> AppResult<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            log::warn!("{} ({}) denied, needs one of {:?}", self.email, self.role, allowed);
            Err(AppError::Forbidden)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = match bearer_token(parts) {
            Some(token) => token,
            None => cookie_token(parts, state).await.ok_or(AppError::Unauthorized)?,
        };

        let claims =
            verify_token(&state.config.jwt_secret, &token).map_err(|_| AppError::Unauthorized)?;
        let id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;

        Ok(Self {
            id,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Rejects with 403 unless the caller is an Admin.
pub struct AdminOnly(pub CurrentUser);

/// Rejects with 403 unless the caller is an Admin or a Manager.
pub struct AdminOrManager(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        user.require(ADMIN_ONLY)?;
        Ok(Self(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminOrManager {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        user.require(ADMIN_OR_MANAGER)?;
        Ok(Self(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

async fn cookie_token(parts: &mut Parts, state: &AppState) -> Option<String> {
    let cookies = Cookies::from_request_parts(parts, state).await.ok()?;
    let token = cookies.get(AUTH_COOKIE)?.value().to_string();
    Some(token)
}
