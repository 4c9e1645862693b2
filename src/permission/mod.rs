use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::Key;

use crate::{
    auth::{Profile, Role},
    state::DbPool,
};

/// Routing-level guard for admin-only pages. The access contract checks
/// roles again itself; this guard only decides which pages resolve.
pub struct IsAdmin(pub Profile);

#[async_trait]
impl<S> FromRequestParts<S> for IsAdmin
where
    S: Send + Sync,
    DbPool: FromRef<S>,
    Key: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let profile = Profile::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        match Role::parse(&profile.role) {
            Some(Role::Admin) => Ok(IsAdmin(profile)),
            _ => Err(StatusCode::FORBIDDEN.into_response()),
        }
    }
}

pub struct IsTrainee(pub Profile);

#[async_trait]
impl<S> FromRequestParts<S> for IsTrainee
where
    S: Send + Sync,
    DbPool: FromRef<S>,
    Key: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let profile = Profile::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        match Role::parse(&profile.role) {
            Some(Role::Trainee) => Ok(IsTrainee(profile)),
            _ => Err(StatusCode::FORBIDDEN.into_response()),
        }
    }
}
