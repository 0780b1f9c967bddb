//! # Ranklane Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: verified-identity token configuration
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`store`]: partition store backend selection
//! - [`server`]: listen address
//!
//! # Example
//!
//! ```ignore
//! use ranklane_config::{JwtConfig, CorsConfig, StoreConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let store_config = StoreConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod server;
pub mod store;

pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
pub use store::{StoreBackend, StoreConfig};
