//! Middleware and extractors for request processing.
//!
//! - [`auth`]: bearer-token extraction into a verified [`Actor`](ranklane_models::Actor)
//! - [`role`]: coarse role gates applied before a handler runs
//!
//! # Authentication Flow
//!
//! 1. Client sends `Authorization: Bearer <token>` issued by the identity provider
//! 2. `AuthUser` verifies the token and turns its claims into an `Actor`
//! 3. Role gates (if any) reject callers below the route's minimum role
//! 4. The handler calls the permission engine, which makes the real decision
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//!
//! async fn get_permissions(
//!     State(state): State<AppState>,
//!     auth_user: AuthUser,
//! ) -> Result<Json<PermissionSet>, AppError> {
//!     let permissions = state
//!         .run(move |engine| engine.permissions(auth_user.actor()))
//!         .await?;
//!     Ok(Json(permissions))
//! }
//! ```

pub mod auth;
pub mod role;
