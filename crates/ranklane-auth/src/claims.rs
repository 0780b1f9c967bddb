//! Access token claims.

use ranklane_core::AppError;
use ranklane_models::{Actor, OrganizationId, Role, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims carried by a verified access token.
///
/// - `sub`: stable user id assigned by the identity provider
/// - `role`: role claim, one of `admin`, `supervisor`, `teacher`, `student`
/// - `org_id`: organization the user belongs to
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub org_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    /// The verified actor these claims describe.
    pub fn actor(&self) -> Result<Actor, AppError> {
        let user_id: UserId = self
            .sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid user ID in token".to_string()))?;
        let organization_id: OrganizationId = self
            .org_id
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid organization ID in token".to_string()))?;
        let role: Role = self
            .role
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid role claim in token".to_string()))?;

        Ok(Actor::new(user_id, role, organization_id))
    }
}
