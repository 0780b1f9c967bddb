//! JWT utilities.
//!
//! Access tokens are minted by the identity provider. [`verify_token`] checks
//! the signature, expiry, and (when configured) the issuer. [`create_access_token`]
//! exists for tests and the `issue-token` CLI command.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use ranklane_config::JwtConfig;
use ranklane_core::AppError;
use ranklane_models::Actor;

use crate::claims::Claims;

/// Creates an access token for `actor`.
///
/// # Errors
///
/// Returns an internal error if token encoding fails.
pub fn create_access_token(
    actor: &Actor,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = (now + jwt_config.access_token_expiry) as usize;

    let claims = Claims {
        sub: actor.user_id.to_string(),
        email: email.to_string(),
        role: actor.role.to_string(),
        org_id: actor.organization_id.to_string(),
        iss: jwt_config.issuer.clone(),
        exp,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies an access token and returns the embedded claims.
///
/// # Errors
///
/// Returns an unauthorized error if the signature is invalid, the token has
/// expired, the issuer does not match, or the token is malformed.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    if let Some(issuer) = &jwt_config.issuer {
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
    }

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranklane_models::{OrganizationId, Role, UserId};

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig::with_secret("test_secret_key_for_testing_purposes_only")
    }

    fn test_actor(role: Role) -> Actor {
        Actor::new(UserId::new(), role, OrganizationId::new())
    }

    #[test]
    fn test_create_and_verify_access_token() {
        let config = get_test_jwt_config();
        let actor = test_actor(Role::Supervisor);

        let token = create_access_token(&actor, "sup@example.com", &config).unwrap();
        assert!(!token.is_empty());

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.email, "sup@example.com");
        assert_eq!(claims.role, "supervisor");
        assert_eq!(claims.actor().unwrap(), actor);
    }

    #[test]
    fn test_token_expiry_is_set_correctly() {
        let config = get_test_jwt_config();
        let token = create_access_token(&test_actor(Role::Student), "s@example.com", &config)
            .unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.exp - claims.iat, config.access_token_expiry as usize);
    }

    #[test]
    fn test_verify_token_with_wrong_secret() {
        let config = get_test_jwt_config();
        let token = create_access_token(&test_actor(Role::Admin), "a@example.com", &config)
            .unwrap();

        let wrong = JwtConfig::with_secret("a_different_secret");
        let err = verify_token(&token, &wrong).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }

    #[test]
    fn test_verify_invalid_token() {
        let config = get_test_jwt_config();
        assert!(verify_token("not.a.token", &config).is_err());
        assert!(verify_token("", &config).is_err());
    }

    #[test]
    fn test_verify_expired_token() {
        let mut config = get_test_jwt_config();
        config.access_token_expiry = -3600;
        let token = create_access_token(&test_actor(Role::Teacher), "t@example.com", &config)
            .unwrap();

        assert!(verify_token(&token, &get_test_jwt_config()).is_err());
    }

    #[test]
    fn test_issuer_is_enforced_when_configured() {
        let mut issuing = get_test_jwt_config();
        issuing.issuer = Some("https://idp.example.com".to_string());
        let token = create_access_token(&test_actor(Role::Teacher), "t@example.com", &issuing)
            .unwrap();

        assert!(verify_token(&token, &issuing).is_ok());

        let mut other = get_test_jwt_config();
        other.issuer = Some("https://elsewhere.example.com".to_string());
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn test_token_without_issuer_rejected_when_issuer_required() {
        let token = create_access_token(
            &test_actor(Role::Teacher),
            "t@example.com",
            &get_test_jwt_config(),
        )
        .unwrap();

        let mut strict = get_test_jwt_config();
        strict.issuer = Some("https://idp.example.com".to_string());
        assert!(verify_token(&token, &strict).is_err());
    }
}
