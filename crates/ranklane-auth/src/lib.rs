//! # Ranklane Auth
//!
//! Turns a bearer token issued by the identity provider into an
//! [`Actor`](ranklane_models::Actor).
//!
//! - [`claims`]: the claim set the identity provider puts in access tokens
//! - [`jwt`]: token verification, plus minting for tests and the dev CLI
//!
//! Token issuance in production belongs to the identity provider; the engine
//! itself never sees a token, only the verified actor.
//!
//! # Example
//!
//! ```ignore
//! use ranklane_auth::verify_token;
//! use ranklane_config::JwtConfig;
//!
//! let claims = verify_token(&token, &JwtConfig::from_env())?;
//! let actor = claims.actor()?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
