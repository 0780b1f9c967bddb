//! # Ranklane API
//!
//! An axum server in front of the Ranklane permission engine. Every request
//! carries a bearer token from the identity provider; the token is turned
//! into an [`Actor`](ranklane_models::Actor) and handed to the
//! [`PermissionFacade`](ranklane_engine::PermissionFacade), which owns every
//! authorization decision.
//!
//! ## Role Lattice
//!
//! ```text
//! Admin (organization root)
//!     ↓ creates supervisors, teachers and students
//! Supervisor
//!     ↓ creates teachers and students in its branch
//! Teacher ── owns classes, creates no accounts
//!     ↓ manages through class membership
//! Student ── enrolled by a supervisor or admin
//! ```
//!
//! A user may manage exactly the users below them in the delegation tree.
//! Admins manage their whole organization. Nobody manages themselves.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # Bearer-token extractor and role gates
//! ├── modules/          # Feature modules (controller + router)
//! │   ├── users/        # Delegation tree, status, reparenting, rebuild
//! │   ├── classes/      # Classes, enrollment, teacher/student lookups
//! │   ├── documents/    # Access levels and visibility checks
//! │   └── permissions/  # Role table and management checks
//! ├── docs.rs           # OpenAPI document
//! ├── logging.rs        # Request logging and subscriber setup
//! ├── metrics.rs        # Prometheus recorder and HTTP metrics
//! ├── router.rs         # Route tree
//! ├── state.rs          # Shared application state
//! └── validator.rs      # JSON extractors with validation
//! ```
//!
//! The domain lives in the workspace crates:
//!
//! - `ranklane-models`: ids, roles, records and DTOs
//! - `ranklane-engine`: hierarchy, class ledger, document resolver, partitions
//! - `ranklane-auth`: claims and token verification
//! - `ranklane-config`: environment configuration
//! - `ranklane-core`: [`AppError`](ranklane_core::AppError)
//!
//! ## Errors
//!
//! | Status | Meaning |
//! |--------|---------|
//! | 400 | Malformed body, invalid role, failed validation |
//! | 401 | Missing or invalid bearer token |
//! | 403 | `Permission denied`, whatever the internal reason |
//! | 409 | Enrollment request made no change |
//! | 422 | Structural rule violated (role order, cycle, wrong role) |
//! | 500 | Storage failure |
//!
//! ## API Documentation
//!
//! - Swagger UI: `/swagger-ui`
//! - Scalar: `/scalar`
//! - OpenAPI JSON: `/api-docs/openapi.json`

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;
