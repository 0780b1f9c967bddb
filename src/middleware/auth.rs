use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use ranklane_auth::verify_token;
use ranklane_core::AppError;
use ranklane_models::{Actor, OrganizationId, Role, UserId};

use crate::logging::record_actor;
use crate::state::AppState;

/// Extractor that validates the bearer token and yields the caller as an [`Actor`].
///
/// Any failure here is a 401; authorization decisions belong to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Actor);

impl AuthUser {
    pub fn actor(&self) -> &Actor {
        &self.0
    }

    pub fn user_id(&self) -> UserId {
        self.0.user_id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn organization_id(&self) -> OrganizationId {
        self.0.organization_id
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    if rejection.is_missing() {
                        AppError::unauthorized("Missing authorization header".to_string())
                    } else {
                        AppError::unauthorized("Invalid authorization header format".to_string())
                    }
                })?;

        let claims = verify_token(bearer.token(), &state.jwt_config)?;
        let actor = claims.actor()?;
        record_actor(&actor);

        Ok(AuthUser(actor))
    }
}
